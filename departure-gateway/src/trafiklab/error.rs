//! Trafiklab client error types.

/// Errors from fetching departures upstream.
#[derive(Debug, thiserror::Error)]
pub enum TrafiklabError {
    /// Missing or rejected API key (HTTP 401)
    #[error("unauthorized: check TRAFIKLAB_API_KEY")]
    Unauthorized,

    /// Malformed site id or parameters (HTTP 400)
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// Unknown site id (HTTP 404)
    #[error("site {site_id} not found")]
    NotFound { site_id: String },

    /// No response within the client timeout
    #[error("request to Trafiklab timed out")]
    Timeout,

    /// Any other non-200 status
    #[error("API error {status}: {excerpt}")]
    Api { status: u16, excerpt: String },

    /// Connection, TLS or protocol failure
    #[error("HTTP error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Body was not the expected JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Client could not be set up
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for TrafiklabError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TrafiklabError::Timeout
        } else {
            // The request URL carries the API key.
            TrafiklabError::Transport(err.without_url())
        }
    }
}

/// First `max_chars` characters of a response body.
pub(crate) fn excerpt(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}
