// The client of the remote analysis service, and the wire records it exchanges.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::brcma::*;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The request body of `POST /brcma/run`.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct MatrixRecord<'a> {
    #[serde(rename = "R")]
    pub requirements: &'a [String],
    #[serde(rename = "C")]
    pub criteria: &'a [String],
    #[serde(rename = "WRC")]
    pub requirement_weights: &'a [f64],
    #[serde(rename = "WEC")]
    pub criterion_weights: &'a [f64],
    #[serde(rename = "S")]
    pub similarity: &'a [Vec<f64>],
    pub thr_sr: f64,
    pub thr_wr: f64,
    pub thr_mr: f64,
}

impl<'a> MatrixRecord<'a> {
    pub fn new(model: &'a MatrixModel) -> MatrixRecord<'a> {
        let t = model.thresholds();
        MatrixRecord {
            requirements: model.requirements(),
            criteria: model.criteria(),
            requirement_weights: model.requirement_weights(),
            criterion_weights: model.criterion_weights(),
            similarity: model.similarity(),
            thr_sr: t.strong_req,
            thr_wr: t.weak_req,
            thr_mr: t.missing_req,
        }
    }
}

#[derive(PartialEq, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DesignOptionRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<i64>>,
    pub criteria: Option<Vec<i64>>,
}

/// The response body of `POST /brcma/run`.
///
/// Every field may be missing: the defaults are applied once here, so that
/// nothing downstream deals with absent values.
#[derive(PartialEq, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResultRecord {
    #[serde(rename = "RS")]
    pub rs: Option<Vec<f64>>,
    #[serde(rename = "CC")]
    pub cc: Option<Vec<f64>>,
    #[serde(rename = "RS_norm")]
    pub rs_norm: Option<Vec<f64>>,
    #[serde(rename = "CC_norm")]
    pub cc_norm: Option<Vec<f64>>,
    #[serde(rename = "SR")]
    pub strong: Option<Vec<i64>>,
    #[serde(rename = "WR")]
    pub weak: Option<Vec<i64>>,
    #[serde(rename = "RR")]
    pub revisit: Option<Vec<i64>>,
    #[serde(rename = "MR")]
    pub missing: Option<Vec<i64>>,
    pub design_options: Option<Vec<DesignOptionRecord>>,
}

impl From<DesignOptionRecord> for DesignOption {
    fn from(r: DesignOptionRecord) -> Self {
        DesignOption {
            name: r.name.unwrap_or_default(),
            description: r.description.unwrap_or_default(),
            requirements: r.requirements.unwrap_or_default(),
            criteria: r.criteria.unwrap_or_default(),
        }
    }
}

impl From<ResultRecord> for AnalysisResult {
    fn from(r: ResultRecord) -> Self {
        AnalysisResult {
            rs: r.rs.unwrap_or_default(),
            rs_norm: r.rs_norm.unwrap_or_default(),
            cc: r.cc.unwrap_or_default(),
            cc_norm: r.cc_norm.unwrap_or_default(),
            strong: r.strong.unwrap_or_default(),
            weak: r.weak.unwrap_or_default(),
            revisit: r.revisit.unwrap_or_default(),
            missing: r.missing.unwrap_or_default(),
            design_options: r
                .design_options
                .unwrap_or_default()
                .into_iter()
                .map(DesignOption::from)
                .collect(),
        }
    }
}

pub fn parse_result(text: &str) -> BrcmaResult<AnalysisResult> {
    let record: ResultRecord = serde_json::from_str(text).context(MalformedResponseSnafu {})?;
    Ok(record.into())
}

/// Reads an analysis result saved from an earlier call to the service.
pub async fn read_result_file(path: &str) -> BrcmaResult<AnalysisResult> {
    let text = tokio::fs::read_to_string(path)
        .await
        .context(OpeningJsonSnafu { path })?;
    info!("read_result_file: read result from {:?}", path);
    parse_result(&text)
}

fn failure_message(status: u16, body: &str) -> String {
    if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        body.to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct HealthRecord {
    status: Option<String>,
}

pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: String,
    base_path: String,
}

impl AnalysisClient {
    pub fn new(base_url: &str, base_path: Option<&str>) -> BrcmaResult<AnalysisClient> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context(NetworkSnafu {})?;
        let base_path = match base_path.map(|p| p.trim().trim_matches('/')) {
            Some(p) if !p.is_empty() => format!("/{}", p),
            _ => String::new(),
        };
        Ok(AnalysisClient {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            base_path,
        })
    }

    pub fn endpoint(&self, route: &str) -> String {
        format!("{}{}{}", self.base_url, self.base_path, route)
    }

    pub async fn health(&self) -> BrcmaResult<()> {
        let url = self.endpoint("/health");
        debug!("health: GET {}", url);
        let response = self.client.get(&url).send().await.context(NetworkSnafu {})?;
        let status = response.status();
        let body = response.text().await.context(NetworkSnafu {})?;
        if !status.is_success() {
            return ServiceSnafu {
                message: failure_message(status.as_u16(), &body),
            }
            .fail();
        }
        let record: HealthRecord =
            serde_json::from_str(&body).context(MalformedResponseSnafu {})?;
        match record.status.as_deref() {
            Some("ok") => Ok(()),
            other => ServiceSnafu {
                message: format!("The service reported the status {:?}", other),
            }
            .fail(),
        }
    }

    /// Submits the matrix and its thresholds, and returns the decoded result.
    pub async fn run(&self, model: &MatrixModel) -> BrcmaResult<AnalysisResult> {
        let url = self.endpoint("/brcma/run");
        info!(
            "run: POST {} ({} requirements, {} criteria)",
            url,
            model.n(),
            model.m()
        );
        let response = self
            .client
            .post(&url)
            .json(&MatrixRecord::new(model))
            .send()
            .await
            .context(NetworkSnafu {})?;
        let status = response.status();
        let body = response.text().await.context(NetworkSnafu {})?;
        if !status.is_success() {
            warn!("run: the service answered {}", status);
            return ServiceSnafu {
                message: failure_message(status.as_u16(), &body),
            }
            .fail();
        }
        debug!("run: response: {}", body);
        parse_result(&body)
    }
}
