use log::{debug, info, warn};

use brcma_matrix::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::brcma::config_reader::*;
use crate::brcma::io_common::InputType;
use crate::brcma::report::*;
use crate::brcma::service::AnalysisClient;
use crate::brcma::session::Session;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
pub mod report;
pub mod service;
pub mod session;

#[derive(Debug, Snafu)]
pub enum BrcmaError {
    #[snafu(display("Unsupported input file {path}: only .csv and .xlsx files can be imported"))]
    UnsupportedFile { path: String },
    #[snafu(display("Failed to read {path}"))]
    ReadingInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Failed to parse the matrix in {path}: {source}"))]
    ParsingMatrix {
        source: brcma_matrix::ParseError,
        path: String,
    },
    #[snafu(display("The content of {path} is not UTF-8 text"))]
    DecodingText {
        source: std::string::FromUtf8Error,
        path: String,
    },
    #[snafu(display("Failed to export the matrix to {path}"))]
    ExportingMatrix { source: csv::Error, path: String },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("The workbook {path} has no worksheet named {name}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Error opening {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Could not reach the analysis service: {source}"))]
    Network { source: reqwest::Error },
    #[snafu(display("{message}"))]
    Service { message: String },
    #[snafu(display("Malformed response from the analysis service: {source}"))]
    MalformedResponse { source: serde_json::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error + Send + Sync>, Some)))]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

pub type BrcmaResult<T> = Result<T, BrcmaError>;

/// Reads a matrix file, checking its type before reading anything.
pub async fn read_matrix(
    path: &str,
    input_type: Option<&str>,
    worksheet: Option<&str>,
    format: &TabularFormat,
) -> BrcmaResult<MatrixModel> {
    let it = io_common::input_type(path, input_type)?;
    info!("Attempting to read matrix file {:?} as {:?}", path, it);
    match it {
        InputType::Csv => io_csv::read_csv_matrix(path, format).await,
        InputType::Xlsx => io_excel::read_excel_matrix(path, worksheet, format).await,
    }
}

pub async fn write_matrix(path: &str, model: &MatrixModel, format: &TabularFormat) -> BrcmaResult<()> {
    io_csv::write_csv_matrix(path, model, format).await
}

fn write_summary(out: &str, summary: &JSValue) -> BrcmaResult<()> {
    let pretty = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
    if out == "stdout" || out.is_empty() {
        println!("{}", pretty);
        Ok(())
    } else {
        info!("Writing summary to {:?}", out);
        fs::write(out, pretty).context(WritingOutputSnafu { path: out })
    }
}

fn check_reference(reference_path: &str, summary: &JSValue) -> BrcmaResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("reference summary: {:?}", summary_ref);
    let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    let pretty = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
    if pretty_ref != pretty {
        warn!("Found differences with the reference summary");
        print_diff(pretty_ref.as_str(), pretty.as_str(), "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    info!("The summary matches the reference {:?}", reference_path);
    Ok(())
}

fn apply_thresholds(session: &mut Session, thresholds: &[(ThresholdName, Option<f64>)]) {
    for (name, value) in thresholds {
        if let Some(v) = value {
            debug!("apply_thresholds: {:?} = {}", name, v);
            session.edit(|m| m.set_threshold(*name, *v));
        }
    }
}

/// Runs the whole flow: settings, matrix, analysis, report.
pub async fn run_brcma(args: &Args) -> BrcmaResult<()> {
    let settings = match &args.config {
        Some(p) => read_settings(p)?,
        None => BrcmaSettings::default(),
    };
    debug!("settings: {:?}", settings);
    let format = settings.tabular_format()?;
    let service_url = settings.service_url(args.service_url.as_deref());

    if args.check_service {
        let client = AnalysisClient::new(&service_url, settings.base_path.as_deref())?;
        client.health().await?;
        println!("The analysis service at {} is available.", service_url);
        return Ok(());
    }

    let mut session = Session::new(MatrixModel::seed());
    if let Some(input) = &args.input {
        let worksheet = args
            .excel_worksheet_name
            .as_deref()
            .or(settings.excel_worksheet_name.as_deref());
        let outcome = read_matrix(input, args.input_type.as_deref(), worksheet, &format).await;
        session.apply_import(outcome)?;
    } else {
        info!("No input provided, using the demonstration matrix");
    }

    apply_thresholds(&mut session, &settings.threshold_overrides());
    apply_thresholds(
        &mut session,
        &[
            (ThresholdName::StrongReq, args.threshold_strong),
            (ThresholdName::WeakReq, args.threshold_weak),
            (ThresholdName::MissingReq, args.threshold_missing),
        ],
    );

    let model = session.model();
    if let Some(export_path) = &args.export {
        write_matrix(export_path, &model, &format).await?;
        info!("Exported the matrix to {:?}", export_path);
    }

    if args.offline && args.result.is_none() {
        println!("{}", render_matrix_text(&model));
        return Ok(());
    }

    let pending = session.begin_analysis();
    let outcome = if let Some(result_path) = &args.result {
        service::read_result_file(result_path).await
    } else {
        let client = AnalysisClient::new(&service_url, settings.base_path.as_deref())?;
        client.run(&pending.model).await
    };
    session.finish_analysis(pending.id, outcome)?;
    debug!(
        "run_brcma: stale: {} last error: {:?}",
        session.is_stale(),
        session.error()
    );

    let view = match session.view() {
        Some(v) => v,
        None => whatever!("No analysis result available"),
    };
    let model = session.model();
    println!("{}", render_text(&model, &view, session.is_stale()));

    let summary = build_summary_js(&model, &view);
    if let Some(out) = &args.out {
        write_summary(out, &summary)?;
    }
    if let Some(reference) = &args.reference {
        check_reference(reference, &summary)?;
    }
    Ok(())
}
