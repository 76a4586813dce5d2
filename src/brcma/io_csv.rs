// Primitives for reading and writing CSV matrices.

use crate::brcma::{io_common::simplify_file_name, *};

/// Reads a CSV matrix. Reading the file is the only suspension point.
///
/// The three ways this can fail are kept apart: the file cannot be read
/// (`ReadingInput`), it is not text (`DecodingText`), or its structure is
/// wrong (`ParsingMatrix`, with the reason).
pub async fn read_csv_matrix(path: &str, format: &TabularFormat) -> BrcmaResult<MatrixModel> {
    let bytes = tokio::fs::read(path)
        .await
        .context(ReadingInputSnafu { path })?;
    debug!("read_csv_matrix: {} bytes from {:?}", bytes.len(), path);
    let text = String::from_utf8(bytes).context(DecodingTextSnafu { path })?;
    let model = parse_text(&text, format).context(ParsingMatrixSnafu { path })?;
    info!(
        "read_csv_matrix: {}: {} requirements, {} criteria",
        simplify_file_name(path),
        model.n(),
        model.m()
    );
    Ok(model)
}

pub async fn write_csv_matrix(
    path: &str,
    model: &MatrixModel,
    format: &TabularFormat,
) -> BrcmaResult<()> {
    let text = export_text(model, format).context(ExportingMatrixSnafu { path })?;
    tokio::fs::write(path, text)
        .await
        .context(WritingOutputSnafu { path })
}
