//! Retrieval of donation records from the donations API.

use std::fmt;
use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::ReportError;
use crate::period::ReportPeriod;
use crate::record::DonationRecord;

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "https://api.donationplatform.com";

/// Upper bound for a single request, including reading the body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const DATE_FORMAT: &str = "%Y-%m-%d";
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Anything that can produce the donations of a calendar month.
pub trait DonationSource {
    fn fetch(&self, period: &ReportPeriod) -> Result<Vec<DonationRecord>, ReportError>;
}

/// Blocking HTTP client for `GET {base_url}/donations`.
pub struct DonationClient {
    http: Client,
    base_url: String,
    token: String,
}

impl DonationClient {
    /// Creates a client authenticating with `token` against `base_url`.
    pub fn new(
        token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ReportError> {
        let base_url = base_url.into();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ReportError::Transport {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }

    /// Full URL of the donations endpoint.
    pub fn donations_url(&self) -> String {
        format!("{}/donations", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for DonationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DonationClient")
            .field("base_url", &self.base_url)
            .field("token", &"****")
            .finish()
    }
}

impl DonationSource for DonationClient {
    fn fetch(&self, period: &ReportPeriod) -> Result<Vec<DonationRecord>, ReportError> {
        let url = self.donations_url();
        let start_date = period.start_date().format(DATE_FORMAT).to_string();
        let end_date = period.end_date().format(DATE_FORMAT).to_string();

        info!(
            "Fetching donations for {} ({} to {})...",
            period, start_date, end_date
        );
        debug!("GET {}", url);

        let transport = |source| ReportError::Transport {
            url: url.clone(),
            source,
        };

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/json")
            .query(&[("start_date", &start_date), ("end_date", &end_date)])
            .send()
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ReportError::Response {
                status: status.as_u16(),
                body: truncate(body.trim(), MAX_ERROR_BODY_CHARS),
            });
        }

        let body = response.bytes().map_err(transport)?;
        let records: Vec<DonationRecord> =
            serde_json::from_slice(&body).map_err(ReportError::Decode)?;
        debug!("Decoded {} donation records", records.len());
        Ok(records)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_owned(),
    }
}
