//! Process configuration.
//!
//! Read once at startup from environment variables (optionally seeded from a
//! `.env` file by `main`). Unset variables fall back to defaults; values that
//! are set but malformed are errors.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{DEFAULT_DAY_TTL, DEFAULT_NIGHT_TTL, TtlPolicy};
use crate::trafiklab::TrafiklabConfig;

const DEFAULT_API_URL: &str = "https://realtime-api.trafiklab.se/v1/departures";

/// Helenelund.
const DEFAULT_SITE_ID: &str = "740000701";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RATE_LIMIT_MAX_CALLS: usize = 30;
const DEFAULT_RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A numeric setting was zero, negative or not a number
    #[error("{name} must be a positive integer, got {value:?}")]
    NotPositive { name: &'static str, value: String },

    /// The listen address could not be parsed
    #[error("{name} must be a socket address like 0.0.0.0:5000, got {value:?}")]
    InvalidAddress { name: &'static str, value: String },
}

/// Gateway configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Trafiklab API key; empty means every upstream call will be rejected
    pub api_key: String,

    /// Base URL of the departures endpoint
    pub api_url: String,

    /// Site served when a request names none
    pub default_site_id: String,

    /// Cache TTL between 00:00 and 07:00
    pub night_ttl: Duration,

    /// Cache TTL for the rest of the day
    pub day_ttl: Duration,

    /// Upstream request timeout in seconds
    pub upstream_timeout_secs: u64,

    /// Departure requests admitted per window
    pub rate_limit_max_calls: usize,

    /// Length of the rate limit window
    pub rate_limit_period: Duration,

    /// Listen address
    pub bind_addr: SocketAddr,

    /// Serve boards from this directory instead of calling Trafiklab
    pub mock_data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value
    /// or `None` when unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let positive = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(name) {
                None => Ok(default),
                Some(value) => match value.trim().parse::<u64>() {
                    Ok(n) if n > 0 => Ok(n),
                    _ => Err(ConfigError::NotPositive { name, value }),
                },
            }
        };

        let bind_addr = match lookup("BIND_ADDR") {
            None => defaults.bind_addr,
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidAddress {
                    name: "BIND_ADDR",
                    value,
                })?,
        };

        let max_calls = positive("RATE_LIMIT_MAX_CALLS", defaults.rate_limit_max_calls as u64)?;
        let rate_limit_max_calls =
            usize::try_from(max_calls).map_err(|_| ConfigError::NotPositive {
                name: "RATE_LIMIT_MAX_CALLS",
                value: max_calls.to_string(),
            })?;

        Ok(Self {
            api_key: lookup("TRAFIKLAB_API_KEY").unwrap_or_default(),
            api_url: lookup("TRAFIKLAB_API_URL").unwrap_or(defaults.api_url),
            default_site_id: lookup("DEFAULT_SITE_ID").unwrap_or(defaults.default_site_id),
            night_ttl: Duration::from_secs(positive(
                "CACHE_TTL_NIGHT",
                defaults.night_ttl.as_secs(),
            )?),
            day_ttl: Duration::from_secs(positive("CACHE_TTL_DAY", defaults.day_ttl.as_secs())?),
            upstream_timeout_secs: positive(
                "UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout_secs,
            )?,
            rate_limit_max_calls,
            rate_limit_period: Duration::from_secs(positive(
                "RATE_LIMIT_PERIOD_SECS",
                defaults.rate_limit_period.as_secs(),
            )?),
            bind_addr,
            mock_data_dir: lookup("MOCK_DATA_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    /// Cache policy for these TTLs.
    pub fn ttl_policy(&self) -> TtlPolicy {
        TtlPolicy::new(self.night_ttl, self.day_ttl)
    }

    /// Upstream client settings.
    pub fn trafiklab_config(&self) -> TrafiklabConfig {
        TrafiklabConfig::new(self.api_key.clone())
            .with_base_url(self.api_url.clone())
            .with_timeout(self.upstream_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            default_site_id: DEFAULT_SITE_ID.to_string(),
            night_ttl: DEFAULT_NIGHT_TTL,
            day_ttl: DEFAULT_DAY_TTL,
            upstream_timeout_secs: DEFAULT_TIMEOUT_SECS,
            rate_limit_max_calls: DEFAULT_RATE_LIMIT_MAX_CALLS,
            rate_limit_period: Duration::from_secs(DEFAULT_RATE_LIMIT_PERIOD_SECS),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            mock_data_dir: None,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("api_url", &self.api_url)
            .field("default_site_id", &self.default_site_id)
            .field("night_ttl", &self.night_ttl)
            .field("day_ttl", &self.day_ttl)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("rate_limit_max_calls", &self.rate_limit_max_calls)
            .field("rate_limit_period", &self.rate_limit_period)
            .field("bind_addr", &self.bind_addr)
            .field("mock_data_dir", &self.mock_data_dir)
            .finish()
    }
}
