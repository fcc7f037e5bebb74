//! The end-to-end report run: fetch, analyze, chart, lay out.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};

use crate::analysis::{analyze, Summary};
use crate::charts::{render_report_charts, ChartPaths};
use crate::error::ReportError;
use crate::fetch::{DonationClient, DonationSource, DEFAULT_API_URL, DEFAULT_TIMEOUT};
use crate::format::currency;
use crate::period::ReportPeriod;
use crate::report::write_report;

/// Directory chart images are written to unless configured otherwise.
pub const DEFAULT_IMAGES_DIR: &str = "report_images";

/// Settings for one report run.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    pub token: String,
    pub api_url: String,
    pub period: ReportPeriod,
    pub images_dir: PathBuf,
    pub output_dir: PathBuf,
    pub timeout: Duration,
    pub summary_json: Option<PathBuf>,
}

impl ReportConfig {
    /// Configuration with the default API, directories and timeout.
    pub fn new(token: impl Into<String>, period: ReportPeriod) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_owned(),
            period,
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
            output_dir: PathBuf::from("."),
            timeout: DEFAULT_TIMEOUT,
            summary_json: None,
        }
    }
}

/// Output locations of a finished run.
#[derive(Clone, Debug)]
pub struct ReportOutcome {
    pub record_count: usize,
    pub summary: Summary,
    pub charts: ChartPaths,
    pub report_path: PathBuf,
}

/// Where a run writes its files.
#[derive(Clone, Copy, Debug)]
pub struct OutputPaths<'a> {
    pub images_dir: &'a Path,
    pub output_dir: &'a Path,
    pub summary_json: Option<&'a Path>,
}

fn log_summary(summary: &Summary, period: &ReportPeriod) {
    if summary.is_empty() {
        warn!("No donations found for {}", period.label());
    }
    info!("Analysis complete:");
    info!("  Total Supporters: {}", summary.total_supporters);
    info!("  Unique Supporters: {}", summary.unique_supporters);
    info!("  Total Revenue: {}", currency(summary.total_revenue));
    info!("  Average Donation: {}", currency(summary.average_donation));
}

fn write_summary_json(summary: &Summary, path: &Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::io(parent, source))?;
    }
    let file = File::create(path).map_err(|source| ReportError::io(path, source))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary).map_err(ReportError::Summary)?;
    info!("Summary written to {}", path.display());
    Ok(())
}

/// Produces the report for `period` from donations supplied by `source`.
pub fn generate_report<S: DonationSource + ?Sized>(
    source: &S,
    period: &ReportPeriod,
    outputs: OutputPaths<'_>,
) -> Result<ReportOutcome, ReportError> {
    let records = source.fetch(period)?;
    info!("Retrieved {} donations", records.len());

    let summary = analyze(&records);
    log_summary(&summary, period);

    if let Some(path) = outputs.summary_json {
        write_summary_json(&summary, path)?;
    }

    let charts = render_report_charts(&summary, period, outputs.images_dir)?;
    let report_path = write_report(&summary, period, &charts, outputs.output_dir)?;

    Ok(ReportOutcome {
        record_count: records.len(),
        summary,
        charts,
        report_path,
    })
}

/// Runs the whole report against the configured donations API.
pub fn run(config: &ReportConfig) -> Result<ReportOutcome, ReportError> {
    info!("Generating donation report for {}...", config.period.label());
    let client = DonationClient::new(&config.token, &config.api_url, config.timeout)?;
    generate_report(
        &client,
        &config.period,
        OutputPaths {
            images_dir: &config.images_dir,
            output_dir: &config.output_dir,
            summary_json: config.summary_json.as_deref(),
        },
    )
}
