//! Data transfer objects for web requests and responses.

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::cache::{CacheStatus, NIGHT_END_HOUR, NIGHT_START_HOUR, TtlPolicy};
use crate::domain::{Direction, DisplayDeparture, NetworkTime};

/// Query for `GET /departures`.
#[derive(Debug, Deserialize)]
pub struct DeparturesQuery {
    /// Site to show; the configured default when absent
    pub site_id: Option<String>,
}

/// A departure board for the display client.
#[derive(Debug, Serialize)]
pub struct DepartureBoardResponse {
    /// Site id from the request
    pub site_id: String,

    /// Name of the first stop point in the upstream board
    pub station_name: String,

    /// Set on the filtered views
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,

    /// When this response was built, network time
    pub updated_at: String,

    /// Number of entries in `departures`
    pub total_departures: usize,

    pub departures: Vec<DisplayDeparture>,
}

/// Response for `GET /cache/status`.
#[derive(Debug, Serialize)]
pub struct CacheStatusResponse {
    pub current_time: String,
    pub current_hour: u32,
    pub period: &'static str,
    pub ttl_configuration: TtlConfiguration,
    pub active_ttl_seconds: u64,
    pub active_ttl_minutes: f64,
    pub cache: CacheInfo,
}

/// Configured TTLs and the hours they apply to.
#[derive(Debug, Serialize)]
pub struct TtlConfiguration {
    pub night_hours: String,
    pub night_ttl_seconds: u64,
    pub night_ttl_minutes: f64,
    pub day_hours: String,
    pub day_ttl_seconds: u64,
    pub day_ttl_minutes: f64,
}

/// State of the cache slot.
#[derive(Debug, Serialize)]
pub struct CacheInfo {
    pub cached: bool,
    /// When the held board was fetched, network time
    pub fetched_at: Option<String>,
    pub age_seconds: Option<f64>,
    pub valid: bool,
    pub expires_in_seconds: Option<f64>,
}

/// Service description served at `/`.
#[derive(Debug, Serialize)]
pub struct ServiceInfoResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub default_site_id: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error summary
    pub error: String,

    /// Extra detail, when there is any worth showing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// Conversion implementations

impl CacheStatusResponse {
    /// Build from a cache snapshot taken at `now`.
    pub fn new(now: &NetworkTime, policy: &TtlPolicy, status: &CacheStatus) -> Self {
        let night_ttl = policy.night_ttl().as_secs();
        let day_ttl = policy.day_ttl().as_secs();
        let active_ttl = status.ttl.as_secs();

        Self {
            current_time: now.to_rfc3339(),
            current_hour: now.hour(),
            period: status.period.as_str(),
            ttl_configuration: TtlConfiguration {
                night_hours: format!("{NIGHT_START_HOUR:02}:00-{NIGHT_END_HOUR:02}:00"),
                night_ttl_seconds: night_ttl,
                night_ttl_minutes: night_ttl as f64 / 60.0,
                day_hours: format!("{NIGHT_END_HOUR:02}:00-23:59"),
                day_ttl_seconds: day_ttl,
                day_ttl_minutes: day_ttl as f64 / 60.0,
            },
            active_ttl_seconds: active_ttl,
            active_ttl_minutes: active_ttl as f64 / 60.0,
            cache: CacheInfo {
                cached: status.cached,
                fetched_at: status.fetched_at.map(|t| t.to_rfc3339()),
                age_seconds: status.age.map(|age| round_tenths(seconds(age))),
                valid: status.valid,
                expires_in_seconds: status.expires_in.map(|left| round_tenths(seconds(left))),
            },
        }
    }
}

fn seconds(delta: chrono::TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

fn round_tenths(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
