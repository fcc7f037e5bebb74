//! Error types shared across the report pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::builder::PdfBuildError;
use crate::charts::ChartError;

/// Coarse classification used by the command line front end to pick a diagnostic prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad arguments, detected before any network access.
    Usage,
    /// The donations API could not be reached or answered with a failure.
    Api,
    /// Anything that went wrong while analyzing or rendering.
    Unexpected,
}

/// Errors produced while fetching, analyzing, charting or rendering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Month must be between 1 and 12 (got {0})")]
    InvalidMonth(u32),

    #[error("Invalid date {year}-{month}")]
    InvalidDate { year: i32, month: u32 },

    #[error("Request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Donations API returned status {status}: {body}")]
    Response { status: u16, body: String },

    #[error("Donations API returned a body that is not a list of donations")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to render chart {}", path.display())]
    Chart {
        path: PathBuf,
        #[source]
        source: ChartError,
    },

    #[error("Failed to load fonts")]
    Font(#[source] genpdf::error::Error),

    #[error("Failed to render PDF document")]
    Pdf(#[source] PdfBuildError),

    #[error("Failed to write summary JSON")]
    Summary(#[source] serde_json::Error),

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReportError {
    /// Returns the class of the error for reporting purposes.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidMonth(_) | Self::InvalidDate { .. } => ErrorClass::Usage,
            Self::Transport { .. } | Self::Response { .. } | Self::Decode(_) => ErrorClass::Api,
            Self::Chart { .. } | Self::Font(_) | Self::Pdf(_) | Self::Summary(_) | Self::Io { .. } => {
                ErrorClass::Unexpected
            }
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<PdfBuildError> for ReportError {
    fn from(err: PdfBuildError) -> Self {
        match err {
            PdfBuildError::FontLoad(source) => Self::Font(source),
            other => Self::Pdf(other),
        }
    }
}
