use std::io::Cursor;

use calamine::{DataType, Range, Reader, Xlsx};

use crate::brcma::*;

/// Reads a matrix from a workbook.
///
/// The cells are turned into text and go through the same parser as the CSV
/// files, so both formats follow the same rules.
pub async fn read_excel_matrix(
    path: &str,
    worksheet: Option<&str>,
    format: &TabularFormat,
) -> BrcmaResult<MatrixModel> {
    let bytes = tokio::fs::read(path)
        .await
        .context(ReadingInputSnafu { path })?;
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).context(OpeningExcelSnafu { path })?;

    debug!(
        "read_excel_matrix: path: {:?} worksheet: {:?}",
        path, worksheet
    );
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };

    let rows = range_rows(&wrange);
    debug!("read_excel_matrix: {} rows", rows.len());
    parse_rows(&rows, format).context(ParsingMatrixSnafu { path })
}

// The range starts at the first non-empty cell, the parser expects it to
// start at the first column.
fn range_rows(wrange: &Range<DataType>) -> Vec<Vec<String>> {
    let offset = wrange.start().map(|(_, col)| col as usize).unwrap_or(0);
    wrange
        .rows()
        .map(|row| {
            std::iter::repeat(String::new())
                .take(offset)
                .chain(row.iter().map(cell_text))
                .collect()
        })
        .collect()
}

fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Float(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::Empty => String::new(),
        _ => {
            warn!("cell_text: unsupported cell {:?}, read as empty", cell);
            String::new()
        }
    }
}
