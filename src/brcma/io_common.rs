use std::path::Path;

use crate::brcma::*;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Xlsx,
}

/// Decides how to read a file: from the explicit type if provided, from the
/// extension otherwise. Anything else is rejected before the file is opened.
pub fn input_type(path: &str, explicit: Option<&str>) -> BrcmaResult<InputType> {
    let name = match explicit {
        Some(t) => t.trim().to_lowercase(),
        None => Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default(),
    };
    debug!("input_type: {:?} -> {:?}", path, name);
    match name.as_str() {
        "csv" => Ok(InputType::Csv),
        "xlsx" => Ok(InputType::Xlsx),
        _ => UnsupportedFileSnafu { path }.fail(),
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(path)
        .to_string()
}
