use clap::Parser;

/// Builds a requirement x criterion similarity matrix, submits it for analysis and
/// reports the classified results.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON settings file: service URL, tabular markers and delimiter,
    /// default thresholds. See the documentation of brcma_matrix::manual.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) The matrix to load (.csv or .xlsx). Without it, the
    /// demonstration matrix is used.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. By default it is deduced from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, the name of the worksheet to use (default: the first one).
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (URL) The base URL of the analysis service. Overrides BRCMA_SERVICE_URL and the
    /// settings file.
    #[clap(long, value_parser)]
    pub service_url: Option<String>,

    /// (file path, optional) A JSON analysis result saved earlier. When provided, it is used
    /// instead of calling the analysis service.
    #[clap(long, value_parser)]
    pub result: Option<String>,

    /// Do not call the analysis service: only load, edit and export the matrix.
    #[clap(long, takes_value = false)]
    pub offline: bool,

    /// Only check that the analysis service answers, then exit.
    #[clap(long, takes_value = false)]
    pub check_service: bool,

    /// Overrides the strong requirement threshold (thr_sr).
    #[clap(long, value_parser, allow_hyphen_values = true)]
    pub threshold_strong: Option<f64>,

    /// Overrides the weak requirement threshold (thr_wr).
    #[clap(long, value_parser, allow_hyphen_values = true)]
    pub threshold_weak: Option<f64>,

    /// Overrides the missing criterion threshold (thr_mr).
    #[clap(long, value_parser, allow_hyphen_values = true)]
    pub threshold_missing: Option<f64>,

    /// (file path) If specified, the matrix is written to this location in CSV format.
    #[clap(long, value_parser)]
    pub export: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the analysis will be written
    /// in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing a summary in JSON format. If provided, brcma will
    /// check that the produced summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
