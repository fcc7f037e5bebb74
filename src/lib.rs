//! Monthly donation reports.
//!
//! A run fetches one calendar month of donations from the platform API ([`fetch`]), reduces them
//! to a [`Summary`] ([`analysis`]), draws two bar charts ([`charts`]) and lays everything out as a
//! PDF with `genpdf` ([`report`], [`builder`]). [`pipeline::run`] ties the stages together.

pub mod analysis;
pub mod builder;
pub mod charts;
pub mod elements;
pub mod error;
pub mod fetch;
pub mod fonts;
pub mod format;
pub mod model;
pub mod period;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod richtext;

pub use analysis::{analyze, Summary, SupporterAggregate};
pub use error::{ErrorClass, ReportError};
pub use fetch::{DonationClient, DonationSource};
pub use period::ReportPeriod;
pub use pipeline::{generate_report, run, OutputPaths, ReportConfig, ReportOutcome};
pub use record::{DonationRecord, SupporterId};
