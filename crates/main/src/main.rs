use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use donation_report::fetch::DEFAULT_API_URL;
use donation_report::fonts::{self, FontSource, DEFAULT_FONT_FAMILY_NAME};
use donation_report::pipeline::{self, ReportConfig, DEFAULT_IMAGES_DIR};
use donation_report::{ErrorClass, ReportError, ReportPeriod};
use log::LevelFilter;

/// Generates the monthly donation report PDF for one calendar month.
///
/// Fonts must be present under `assets/fonts` next to the executable or the
/// crate, or provided via the `DONATION_REPORT_FONTS_DIR` environment variable.
#[derive(Debug, Parser)]
#[command(author, version, about = "Monthly donation report generator")]
struct Cli {
    /// Bearer token for the donations API.
    #[arg(long, env = "DONATION_API_TOKEN", hide_env_values = true)]
    token: String,

    /// Report year.
    #[arg(long)]
    year: i32,

    /// Report month (1-12).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: u32,

    /// Base URL of the donations API.
    #[arg(long, env = "DONATION_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Directory the chart images are written to.
    #[arg(long, default_value = DEFAULT_IMAGES_DIR)]
    images_dir: PathBuf,

    /// Directory the PDF is written to.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Also write the analysis summary as JSON to this path.
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Directory holding the font family used for the PDF and the charts.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,

    /// Font family file prefix inside `--fonts-dir`, e.g. `Roboto` for `Roboto-Regular.ttf`.
    #[arg(long, requires = "fonts_dir")]
    font_family: Option<String>,

    /// Log debug details.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn font_source(&self) -> Option<FontSource> {
        let family = self
            .font_family
            .as_deref()
            .unwrap_or(DEFAULT_FONT_FAMILY_NAME);
        self.fonts_dir
            .clone()
            .map(|directory| FontSource::new(directory, family))
    }

    fn into_config(self) -> Result<ReportConfig, ReportError> {
        let period = ReportPeriod::new(self.year, self.month)?;
        Ok(ReportConfig {
            token: self.token,
            api_url: self.api_url,
            period,
            images_dir: self.images_dir,
            output_dir: self.output_dir,
            timeout: Duration::from_secs(self.timeout_secs),
            summary_json: self.summary_json,
        })
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    if let Some(source) = cli.font_source() {
        fonts::set_font_source(source);
    }

    let result = cli
        .into_config()
        .and_then(|config| pipeline::run(&config).map(|_| ()));

    if let Err(err) = result {
        let prefix = match err.class() {
            ErrorClass::Api => "API Error",
            ErrorClass::Usage | ErrorClass::Unexpected => "Error",
        };
        eprintln!("{}: {}", prefix, err);
        print_error_sources(&err);
        std::process::exit(1);
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("donation-report").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        assert!(parse(&["--token", "t", "--year", "2023", "--month", "13"]).is_err());
        assert!(parse(&["--token", "t", "--year", "2023", "--month", "0"]).is_err());
    }

    #[test]
    fn defaults_are_applied() {
        let cli = parse(&["--token", "t", "--year", "2023", "--month", "1"]).unwrap();
        assert_eq!(cli.images_dir, PathBuf::from("report_images"));
        assert_eq!(cli.output_dir, PathBuf::from("."));
        assert_eq!(cli.timeout_secs, 30);
        assert!(cli.summary_json.is_none());
        assert!(cli.font_source().is_none());

        let config = cli.into_config().unwrap();
        assert_eq!(config.period.to_string(), "2023-01");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn fonts_dir_pins_a_family() {
        let cli = parse(&[
            "--token", "t", "--year", "2023", "--month", "1", "--fonts-dir", "fonts",
            "--font-family", "DejaVuSans",
        ])
        .unwrap();
        assert_eq!(
            cli.font_source(),
            Some(FontSource::new("fonts", "DejaVuSans"))
        );

        let default_family =
            parse(&["--token", "t", "--year", "2023", "--month", "1", "--fonts-dir", "fonts"])
                .unwrap();
        assert_eq!(default_family.font_source().unwrap().family, "Roboto");

        assert!(parse(&[
            "--token", "t", "--year", "2023", "--month", "1", "--font-family", "DejaVuSans",
        ])
        .is_err());
    }

    #[test]
    fn years_outside_four_digits_are_usage_errors() {
        for year in ["0", "10000"] {
            let cli = parse(&["--token", "t", "--year", year, "--month", "1"]).unwrap();
            let err = cli.into_config().unwrap_err();
            assert_eq!(err.class(), ErrorClass::Usage);
        }
    }
}
