use crate::brcma::*;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVICE_URL: &str = "https://brcma.dependly.app";
pub const SERVICE_URL_ENV: &str = "BRCMA_SERVICE_URL";

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabularSettings {
    pub delimiter: Option<String>,
    #[serde(rename = "requirementWeightMarker")]
    pub requirement_weight_marker: Option<String>,
    #[serde(rename = "criterionWeightMarker")]
    pub criterion_weight_marker: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdSettings {
    #[serde(rename = "strongReq")]
    pub strong_req: Option<f64>,
    #[serde(rename = "weakReq")]
    pub weak_req: Option<f64>,
    #[serde(rename = "missingReq")]
    pub missing_req: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrcmaSettings {
    #[serde(rename = "serviceUrl")]
    pub service_url: Option<String>,
    /// Path prefix of the service routes, for deployments behind a proxy.
    #[serde(rename = "basePath")]
    pub base_path: Option<String>,
    pub tabular: Option<TabularSettings>,
    pub thresholds: Option<ThresholdSettings>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl BrcmaSettings {
    pub fn tabular_format(&self) -> BrcmaResult<TabularFormat> {
        let mut format = TabularFormat::default();
        let ts = match &self.tabular {
            Some(ts) => ts,
            None => return Ok(format),
        };
        if let Some(d) = &ts.delimiter {
            match d.as_bytes() {
                [b] if b.is_ascii() && *b != b'\n' && *b != b'"' => format.delimiter = *b,
                _ => whatever!("The delimiter must be a single ASCII character, got {:?}", d),
            }
        }
        if let Some(marker) = &ts.requirement_weight_marker {
            if marker.trim().is_empty() {
                whatever!("requirementWeightMarker cannot be empty")
            }
            format.requirement_weight_marker = marker.trim().to_string();
        }
        if let Some(marker) = &ts.criterion_weight_marker {
            if marker.trim().is_empty() {
                whatever!("criterionWeightMarker cannot be empty")
            }
            format.criterion_weight_marker = marker.trim().to_string();
        }
        Ok(format)
    }

    /// The base URL of the service: the flag, then the environment, then the settings file.
    pub fn service_url(&self, flag: Option<&str>) -> String {
        let env_url = std::env::var(SERVICE_URL_ENV).ok();
        resolve_service_url(flag, env_url.as_deref(), self.service_url.as_deref())
    }

    pub fn threshold_overrides(&self) -> Vec<(ThresholdName, Option<f64>)> {
        let t = self.thresholds.clone().unwrap_or_default();
        vec![
            (ThresholdName::StrongReq, t.strong_req),
            (ThresholdName::WeakReq, t.weak_req),
            (ThresholdName::MissingReq, t.missing_req),
        ]
    }
}

fn resolve_service_url(flag: Option<&str>, env: Option<&str>, settings: Option<&str>) -> String {
    flag.into_iter()
        .chain(env)
        .chain(settings)
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SERVICE_URL)
        .to_string()
}

pub fn read_settings(path: &str) -> BrcmaResult<BrcmaSettings> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let settings: BrcmaSettings =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    info!("read settings from {:?}", path);
    Ok(settings)
}

/// Reads a summary written by an earlier run.
pub fn read_summary(path: &str) -> BrcmaResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
