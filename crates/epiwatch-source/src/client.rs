//! Blocking HTTP client for the coronavirus dashboard API.

use crate::error::{Result, SourceError};
use crate::{parse, AreaFilter, FieldStructure, SeriesSource};
use epiwatch_common::types::SeriesRow;
use reqwest::StatusCode;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://api.coronavirus.data.gov.uk/v1/data";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// [`SeriesSource`] backed by the public dashboard API.
///
/// The run is a synchronous batch, so the blocking `reqwest` client is
/// used; the timeout lives here, not in the core.
pub struct DashboardClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl DashboardClient {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Client against a non-default endpoint (used by tests against a
    /// local server).
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

impl SeriesSource for DashboardClient {
    fn fetch_series(
        &self,
        filter: &AreaFilter,
        structure: &FieldStructure,
    ) -> Result<Vec<SeriesRow>> {
        tracing::debug!(filter = %filter.to_query(), "Fetching series");

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("filters", filter.to_query()),
                ("structure", structure.to_structure_json()),
                ("format", "csv".to_string()),
            ])
            .send()?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let body = response.text()?;
        let rows = parse::parse_csv(&body, structure)?;
        tracing::debug!(rows = rows.len(), "Series fetched");
        Ok(rows)
    }
}
