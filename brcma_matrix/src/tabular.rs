// Reading and writing the matrix as delimited text.
//
// The layout is positional:
//
//   ,c1,c2,WRC
//   r1,0.9,0.8,1
//   WEC,1,1,
//
// Nothing except the two marker tokens tags the rows and columns, so the
// structure is inferred from positions only.

use std::error::Error;
use std::fmt::Display;

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use log::{debug, info, warn};

use crate::builder::clamp_similarity;
use crate::config::*;

/// The tokens and separator of a tabular format.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TabularFormat {
    /// A single ASCII byte.
    pub delimiter: u8,
    /// Ends the list of criteria in the header row (compared case-insensitively).
    pub requirement_weight_marker: String,
    /// First cell of the row of criterion weights (compared case-insensitively).
    pub criterion_weight_marker: String,
}

impl Default for TabularFormat {
    fn default() -> Self {
        TabularFormat {
            delimiter: b',',
            requirement_weight_marker: "WRC".to_string(),
            criterion_weight_marker: "WEC".to_string(),
        }
    }
}

/// Structural problems that prevent building a matrix.
///
/// Problems with individual cells are never reported: unreadable similarity values
/// become 0 and unreadable weights become 1.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ParseError {
    /// Fewer than 3 lines (header, one requirement, weights).
    InsufficientRows,
    /// The header does not name any criterion.
    NoCriteria,
    /// No usable row between the header and the criterion weights.
    NoRequirements,
}

impl Error for ParseError {}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InsufficientRows => write!(
                f,
                "at least 3 rows are required (header, 1 requirement, criterion weights)"
            ),
            ParseError::NoCriteria => write!(f, "no criteria found in the header row"),
            ParseError::NoRequirements => write!(f, "no requirements found"),
        }
    }
}

/// Parses delimited text into a matrix with the default thresholds.
///
/// Cells may be quoted, so that labels can contain the delimiter. Blank lines
/// are ignored.
pub fn parse_text(text: &str, format: &TabularFormat) -> Result<MatrixModel, ParseError> {
    let rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(format.delimiter)
        .from_reader(text.trim().as_bytes());
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, record) in rdr.into_records().enumerate() {
        match record {
            Ok(r) => rows.push(r.iter().map(|c| c.to_string()).collect()),
            Err(e) => warn!("parse_text: skipping unreadable record {}: {}", idx, e),
        }
    }
    parse_rows(&rows, format)
}

/// Parses rows that have already been split into cells.
///
/// Cells are trimmed before being interpreted.
pub fn parse_rows<S: AsRef<str>>(
    rows: &[Vec<S>],
    format: &TabularFormat,
) -> Result<MatrixModel, ParseError> {
    let lines: Vec<Vec<&str>> = rows
        .iter()
        .map(|row| row.iter().map(|c| c.as_ref().trim()).collect())
        .collect();

    if lines.len() < 3 {
        return Err(ParseError::InsufficientRows);
    }

    let criteria = read_criteria(&lines[0], format);
    debug!("parse_rows: criteria: {:?}", criteria);
    if criteria.is_empty() {
        return Err(ParseError::NoCriteria);
    }
    let m = criteria.len();

    let footer_idx = lines.iter().position(|line| {
        line.first()
            .map(|c| eq_marker(c, &format.criterion_weight_marker))
            .unwrap_or(false)
    });
    debug!("parse_rows: footer line: {:?}", footer_idx);

    let body: &[Vec<&str>] = match footer_idx {
        Some(idx) if idx > 1 => &lines[1..idx],
        Some(_) => &[],
        None => &lines[1..],
    };
    if body.is_empty() {
        return Err(ParseError::NoRequirements);
    }

    let mut requirements: Vec<String> = Vec::new();
    let mut requirement_weights: Vec<f64> = Vec::new();
    let mut similarity: Vec<Vec<f64>> = Vec::new();
    for (idx, row) in body.iter().enumerate() {
        let label = match row.as_slice() {
            [label, _, ..] if !label.is_empty() => label,
            _ => {
                debug!("parse_rows: skipping line {}: {:?}", idx + 1, row);
                continue;
            }
        };
        requirements.push(label.to_string());
        similarity.push(
            (1..=m)
                .map(|j| clamp_similarity(read_cell(row, j).unwrap_or(0.0)))
                .collect(),
        );
        requirement_weights.push(read_cell(row, m + 1).unwrap_or(1.0));
    }
    if requirements.is_empty() {
        return Err(ParseError::NoRequirements);
    }

    let criterion_weights: Vec<f64> = match footer_idx {
        Some(idx) => (1..=m)
            .map(|j| read_cell(&lines[idx], j).unwrap_or(1.0))
            .collect(),
        None => vec![1.0; m],
    };

    info!(
        "parse_rows: read {} requirements x {} criteria",
        requirements.len(),
        m
    );
    Ok(MatrixModel {
        requirements,
        criteria,
        requirement_weights,
        criterion_weights,
        similarity,
        thresholds: Thresholds::DEFAULT,
    })
}

/// Writes the matrix in the import layout, always with the weight column and
/// the weight row.
///
/// Cells containing the delimiter or quotes are quoted. Infinite weights are
/// written as `Infinity` and `-Infinity`.
pub fn export_text(model: &MatrixModel, format: &TabularFormat) -> Result<String, csv::Error> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(format.delimiter)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let mut header: Vec<String> = vec!["".to_string()];
    header.extend(model.criteria.iter().cloned());
    header.push(format.requirement_weight_marker.clone());
    wtr.write_record(&header)?;

    for (i, label) in model.requirements.iter().enumerate() {
        let mut row: Vec<String> = vec![label.clone()];
        row.extend(model.similarity[i].iter().map(|v| format_number(*v)));
        row.push(format_number(model.requirement_weights[i]));
        wtr.write_record(&row)?;
    }

    let mut footer: Vec<String> = vec![format.criterion_weight_marker.clone()];
    footer.extend(model.criterion_weights.iter().map(|v| format_number(*v)));
    footer.push("".to_string());
    wtr.write_record(&footer)?;

    let bytes = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.strip_suffix('\n').unwrap_or(&text).to_string())
}

fn format_number(v: f64) -> String {
    if v == f64::INFINITY {
        "Infinity".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        v.to_string()
    }
}

// The criteria are the header cells from index 1 up to the first empty cell or
// weight marker. Without such a cell, the last header cell is the weight column.
fn read_criteria(header: &[&str], format: &TabularFormat) -> Vec<String> {
    let stop = header
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, c)| c.is_empty() || eq_marker(c, &format.requirement_weight_marker))
        .map(|(idx, _)| idx)
        .unwrap_or_else(|| header.len().saturating_sub(1));
    if stop <= 1 {
        return Vec::new();
    }
    header[1..stop].iter().map(|c| c.to_string()).collect()
}

fn eq_marker(cell: &str, marker: &str) -> bool {
    cell.to_uppercase() == marker.to_uppercase()
}

fn read_cell(row: &[&str], idx: usize) -> Option<f64> {
    row.get(idx).and_then(|c| read_number(c))
}

/// Reads the longest numeric prefix of a cell: `"0.5"`, `"+1e-2"`, `"0.7 approx"`.
///
/// Returns None when there is no numeric prefix. `Infinity` and `inf` (any case,
/// optional sign) are accepted; NaN never is.
pub fn read_number(cell: &str) -> Option<f64> {
    let s = cell.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let rest = s[end..].to_ascii_lowercase();
    let infinite = rest.starts_with("infinity")
        || (rest.starts_with("inf")
            && !rest
                .as_bytes()
                .get(3)
                .map(|b| b.is_ascii_alphabetic())
                .unwrap_or(false));
    if infinite {
        return if s.starts_with('-') {
            Some(f64::NEG_INFINITY)
        } else {
            Some(f64::INFINITY)
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        // A lone "." only counts when digits surround it.
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok().filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn parse(text: &str) -> Result<MatrixModel, ParseError> {
        parse_text(text, &TabularFormat::default())
    }

    #[test]
    fn minimal_file() {
        init();
        let model = parse(",c1,c2,WRC\nr1,0.9,0.8,1\nWEC,1,1,").unwrap();
        assert_eq!(model.requirements(), &["r1".to_string()]);
        assert_eq!(model.criteria(), &["c1".to_string(), "c2".to_string()]);
        assert_eq!(model.similarity(), &[vec![0.9, 0.8]]);
        assert_eq!(model.requirement_weights(), &[1.0]);
        assert_eq!(model.criterion_weights(), &[1.0, 1.0]);
        assert_eq!(model.thresholds(), Thresholds::DEFAULT);
    }

    #[test]
    fn too_few_lines() {
        assert_eq!(parse(",c1,WRC\nr1,0.5,1"), Err(ParseError::InsufficientRows));
        assert_eq!(parse(""), Err(ParseError::InsufficientRows));
        // Outer blank lines do not count.
        assert_eq!(
            parse("\n\n,c1,WRC\nr1,0.5,1\n\n"),
            Err(ParseError::InsufficientRows)
        );
    }

    #[test]
    fn header_without_criteria() {
        assert_eq!(parse(",WRC\nr1,1\nWEC,"), Err(ParseError::NoCriteria));
        assert_eq!(parse(",,c1,WRC\nr1,0,1\nWEC,1,"), Err(ParseError::NoCriteria));
        assert_eq!(parse("x\nr1,1\nr2,1"), Err(ParseError::NoCriteria));
    }

    #[test]
    fn marker_is_case_insensitive() {
        let model = parse(",a,b,wrc,extra\nr1,0.1,0.2,3\nwec,2,4,").unwrap();
        assert_eq!(model.criteria(), &["a".to_string(), "b".to_string()]);
        assert_eq!(model.requirement_weights(), &[3.0]);
        assert_eq!(model.criterion_weights(), &[2.0, 4.0]);
    }

    #[test]
    fn header_without_marker_drops_last_cell() {
        let model = parse(",c1,c2,c3\nr1,0.1,0.2,5\nr2,0.3,0.4").unwrap();
        assert_eq!(model.criteria(), &["c1".to_string(), "c2".to_string()]);
        assert_eq!(model.requirement_weights(), &[5.0, 1.0]);
    }

    #[test]
    fn no_footer_defaults_criterion_weights() {
        let model = parse(",c1,c2,WRC\nr1,0.9,0.8,2\nr2,0.1,0.2,3").unwrap();
        assert_eq!(model.n(), 2);
        assert_eq!(model.criterion_weights(), &[1.0, 1.0]);
        assert_eq!(model.requirement_weights(), &[2.0, 3.0]);
    }

    #[test]
    fn footer_found_anywhere() {
        // The first WEC line ends the requirements, even when more lines follow.
        let model = parse(",c1,WRC\nr1,0.5,1\nWEC,7,\nr2,0.4,1\nWEC,9,").unwrap();
        assert_eq!(model.requirements(), &["r1".to_string()]);
        assert_eq!(model.criterion_weights(), &[7.0]);
    }

    #[test]
    fn footer_right_after_header() {
        assert_eq!(
            parse(",c1,WRC\nWEC,1,\nr1,0.5,1"),
            Err(ParseError::NoRequirements)
        );
    }

    #[test]
    fn skipped_rows() {
        init();
        let text = ",c1,WRC\n\nr1,0.5,1\n,0.2,1\nlonely\nr2,0.7\nWEC,1,";
        let model = parse(text).unwrap();
        assert_eq!(model.requirements(), &["r1".to_string(), "r2".to_string()]);
        assert_eq!(model.similarity(), &[vec![0.5], vec![0.7]]);
        assert_eq!(model.requirement_weights(), &[1.0, 1.0]);
    }

    #[test]
    fn every_row_skipped() {
        assert_eq!(
            parse(",c1,WRC\n,0.5,1\nsolo\nWEC,1,"),
            Err(ParseError::NoRequirements)
        );
    }

    #[test]
    fn cell_substitution() {
        let text = ",c1,c2,c3,WRC\nr1,high,1.7,-0.2,heavy\nr2,0.3,,0.5 approx,-2\nWEC,x,,0.5,";
        let model = parse(text).unwrap();
        assert_eq!(model.similarity(), &[vec![0.0, 1.0, 0.0], vec![0.3, 0.0, 0.5]]);
        assert_eq!(model.requirement_weights(), &[1.0, -2.0]);
        assert_eq!(model.criterion_weights(), &[1.0, 1.0, 0.5]);
    }

    #[test]
    fn short_footer() {
        let model = parse(",c1,c2,WRC\nr1,0.1,0.2,1\nWEC,3").unwrap();
        assert_eq!(model.criterion_weights(), &[3.0, 1.0]);
    }

    #[test]
    fn windows_line_endings() {
        let model = parse(",c1,WRC\r\nr1,0.25,2\r\nWEC,4,\r\n").unwrap();
        assert_eq!(model.similarity(), &[vec![0.25]]);
        assert_eq!(model.requirement_weights(), &[2.0]);
        assert_eq!(model.criterion_weights(), &[4.0]);
    }

    #[test]
    fn duplicate_labels_are_kept() {
        let model = parse(",c,c,WRC\nr,0.1,0.2,1\nr,0.3,0.4,1\nWEC,1,1,").unwrap();
        assert_eq!(model.requirements(), &["r".to_string(), "r".to_string()]);
        assert_eq!(model.criteria(), &["c".to_string(), "c".to_string()]);
    }

    #[test]
    fn custom_format() {
        let format = TabularFormat {
            delimiter: b';',
            requirement_weight_marker: "weight".to_string(),
            criterion_weight_marker: "colweight".to_string(),
        };
        let model = parse_text(";a;b;Weight\nr1;0.5;0.6;2\nColWeight;3;4;", &format).unwrap();
        assert_eq!(model.criteria(), &["a".to_string(), "b".to_string()]);
        assert_eq!(model.criterion_weights(), &[3.0, 4.0]);
        assert_eq!(
            export_text(&model, &format).unwrap(),
            ";a;b;weight\nr1;0.5;0.6;2\ncolweight;3;4;"
        );
    }

    #[test]
    fn rows_entry_point_trims_cells() {
        let rows = vec![
            vec!["", " c1 ", "WRC"],
            vec![" r1", "0.5 ", " 2"],
            vec!["WEC ", "3", ""],
        ];
        let model = parse_rows(&rows, &TabularFormat::default()).unwrap();
        assert_eq!(model.criteria(), &["c1".to_string()]);
        assert_eq!(model.requirements(), &["r1".to_string()]);
        assert_eq!(model.criterion_weights(), &[3.0]);
    }

    #[test]
    fn export_layout() {
        let text = export_text(&MatrixModel::seed(), &TabularFormat::default()).unwrap();
        assert_eq!(
            text,
            ",c1,c2,c3,WRC\nr1,0.9,0.8,0.6,1\nr2,0.2,0.4,0.3,1\nr3,0,0,0,1\nWEC,1,1,1,"
        );
    }

    #[test]
    fn export_then_parse() {
        init();
        let model = MatrixModel::seed()
            .add_requirement()
            .add_criterion()
            .rename_requirement(1, "latency budget")
            .set_similarity(3, 3, 0.123456789)
            .set_similarity(0, 1, 1.0 / 3.0)
            .set_weight(WeightKind::Requirement, 2, -0.25)
            .set_weight(WeightKind::Criterion, 3, 2.5);
        let format = TabularFormat::default();
        let back = parse_text(&export_text(&model, &format).unwrap(), &format).unwrap();
        assert_eq!(back.requirements(), model.requirements());
        assert_eq!(back.criteria(), model.criteria());
        assert_eq!(back.similarity(), model.similarity());
        for (a, b) in back
            .requirement_weights()
            .iter()
            .zip(model.requirement_weights())
        {
            assert!((a - b).abs() < 1e-12);
        }
        for (a, b) in back.criterion_weights().iter().zip(model.criterion_weights()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn quoted_labels_survive_export() {
        let model = MatrixModel::seed()
            .rename_requirement(0, "cost, time")
            .rename_requirement(1, "\"quoted")
            .rename_requirement(2, "trailing\"")
            .rename_criterion(1, "speed, \"peak\"");
        let format = TabularFormat::default();
        let text = export_text(&model, &format).unwrap();
        let back = parse_text(&text, &format).unwrap();
        assert_eq!(back.requirements(), model.requirements());
        assert_eq!(back.criteria(), model.criteria());
        assert_eq!(back.similarity(), model.similarity());
        assert_eq!(back.requirement_weights(), model.requirement_weights());
        assert_eq!(back.criterion_weights(), model.criterion_weights());
    }

    #[test]
    fn quoted_cells_on_import() {
        let model = parse(",\"a,b\",c,WRC\n\"r,1\",0.5,0.25,2\nWEC,1,3,").unwrap();
        assert_eq!(model.criteria(), &["a,b".to_string(), "c".to_string()]);
        assert_eq!(model.requirements(), &["r,1".to_string()]);
        assert_eq!(model.similarity(), &[vec![0.5, 0.25]]);
        assert_eq!(model.requirement_weights(), &[2.0]);
        assert_eq!(model.criterion_weights(), &[1.0, 3.0]);
    }

    #[test]
    fn infinite_weights_survive_export() {
        let model = MatrixModel::seed()
            .set_weight(WeightKind::Criterion, 0, f64::INFINITY)
            .set_weight(WeightKind::Requirement, 1, f64::NEG_INFINITY);
        let format = TabularFormat::default();
        let text = export_text(&model, &format).unwrap();
        assert!(text.ends_with("\nWEC,Infinity,1,1,"));
        let back = parse_text(&text, &format).unwrap();
        assert_eq!(back.criterion_weights(), &[f64::INFINITY, 1.0, 1.0]);
        assert_eq!(back.requirement_weights(), &[1.0, f64::NEG_INFINITY, 1.0]);
    }

    #[test]
    fn numbers() {
        assert_eq!(read_number("0.5"), Some(0.5));
        assert_eq!(read_number("  -2"), Some(-2.0));
        assert_eq!(read_number("+.5"), Some(0.5));
        assert_eq!(read_number("3."), Some(3.0));
        assert_eq!(read_number("1e3"), Some(1000.0));
        assert_eq!(read_number("2e"), Some(2.0));
        assert_eq!(read_number("0.7 approx"), Some(0.7));
        assert_eq!(read_number("Infinity"), Some(f64::INFINITY));
        assert_eq!(read_number("inf"), Some(f64::INFINITY));
        assert_eq!(read_number("-INF"), Some(f64::NEG_INFINITY));
        assert_eq!(read_number("infinity and more"), Some(f64::INFINITY));
        assert_eq!(read_number("info"), None);
        assert_eq!(read_number("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(read_number(""), None);
        assert_eq!(read_number("."), None);
        assert_eq!(read_number("-"), None);
        assert_eq!(read_number("NaN"), None);
        assert_eq!(read_number("abc"), None);
    }
}
