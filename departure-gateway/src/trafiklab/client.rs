//! Trafiklab realtime HTTP client.
//!
//! One request per call, no retries. Failures are classified into
//! [`TrafiklabError`] variants so callers can tell a bad key from an
//! unknown site from a dead network.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use super::error::{TrafiklabError, excerpt};
use super::types::DeparturesResponse;

/// Default base URL for the departures endpoint.
const DEFAULT_BASE_URL: &str = "https://realtime-api.trafiklab.se/v1/departures";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Characters of an error body kept for diagnostics.
const ERROR_EXCERPT_CHARS: usize = 200;

/// Characters of an unparseable body kept for diagnostics.
const JSON_EXCERPT_CHARS: usize = 500;

/// Configuration for the Trafiklab client.
#[derive(Clone)]
pub struct TrafiklabConfig {
    /// API key, sent as the `key` query parameter
    pub api_key: String,
    /// Base URL for the departures endpoint
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TrafiklabConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl fmt::Debug for TrafiklabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrafiklabConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Trafiklab realtime API client.
#[derive(Clone)]
pub struct TrafiklabClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TrafiklabClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TrafiklabConfig) -> Result<Self, TrafiklabError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TrafiklabError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// Whether an API key was supplied.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Fetch the departure board for a site.
    ///
    /// Only HTTP 200 with a JSON body counts as success.
    pub async fn get_departures(&self, site_id: &str) -> Result<DeparturesResponse, TrafiklabError> {
        let url = format!("{}/{}", self.base_url, site_id);
        debug!(%url, "requesting departures");

        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .inspect_err(|e| warn!(site_id, timeout = e.is_timeout(), "Trafiklab request failed"))?;

        let status = response.status();
        debug!(site_id, status = status.as_u16(), "Trafiklab responded");

        if status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            warn!(body = %excerpt(&body, ERROR_EXCERPT_CHARS), "unauthorized, check the API key");
            return Err(TrafiklabError::Unauthorized);
        }

        if status == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            return Err(TrafiklabError::BadRequest {
                message: excerpt(&body, ERROR_EXCERPT_CHARS),
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(TrafiklabError::NotFound {
                site_id: site_id.to_string(),
            });
        }

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(TrafiklabError::Api {
                status: status.as_u16(),
                excerpt: excerpt(&body, ERROR_EXCERPT_CHARS),
            });
        }

        let body = response.text().await?;

        let board: DeparturesResponse =
            serde_json::from_str(&body).map_err(|e| TrafiklabError::Json {
                message: e.to_string(),
                body: Some(excerpt(&body, JSON_EXCERPT_CHARS)),
            })?;

        info!(
            site_id,
            departures = board.departures.as_ref().map_or(0, Vec::len),
            "fetched departures"
        );

        Ok(board)
    }
}

impl fmt::Debug for TrafiklabClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrafiklabClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.has_api_key())
            .finish()
    }
}
