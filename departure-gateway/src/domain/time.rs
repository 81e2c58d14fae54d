//! Civil time handling for Trafiklab timestamps.
//!
//! Trafiklab sends departure times as ISO 8601 date-times without a UTC
//! offset (e.g. `"2025-10-17T18:28:00"`). They are civil times in the
//! Stockholm network's zone, so every instant in this crate is carried as a
//! `DateTime<Tz>` pinned to [`NETWORK_TZ`], never the host's local zone.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

/// Home timezone of the transit network.
pub const NETWORK_TZ: Tz = chrono_tz::Europe::Stockholm;

/// Offset of Swedish standard time (CET) from UTC, in hours.
const STANDARD_OFFSET_HOURS: i64 = 1;

/// Accepted layouts for offset-less timestamps.
const CIVIL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A bare date reads as midnight.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// An instant expressed in the network's timezone.
pub type NetworkTime = DateTime<Tz>;

/// The current instant in the network's timezone.
pub fn network_now() -> NetworkTime {
    Utc::now().with_timezone(&NETWORK_TZ)
}

/// Error returned when a timestamp string cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp {input:?}: {reason}")]
pub struct TimeError {
    input: String,
    reason: &'static str,
}

impl TimeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Parse an upstream timestamp into a network-zone instant.
///
/// Timestamps with an explicit offset are honoured as given. Offset-less
/// timestamps are read as civil times in [`NETWORK_TZ`]; see [`localize`].
///
/// # Examples
///
/// ```
/// use departure_gateway::domain::parse_civil;
///
/// let t = parse_civil("2025-10-17T18:28:00").unwrap();
/// assert_eq!(t.to_rfc3339(), "2025-10-17T18:28:00+02:00");
///
/// assert!(parse_civil("").is_err());
/// assert!(parse_civil("18:28").is_err());
/// ```
pub fn parse_civil(s: &str) -> Result<NetworkTime, TimeError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(TimeError::new(s, "empty timestamp"));
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(with_offset.with_timezone(&NETWORK_TZ));
    }

    CIVIL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(localize)
        .ok_or_else(|| TimeError::new(s, "expected ISO 8601 date-time"))
}

/// Attach the network timezone to a civil date-time.
///
/// In the autumn fold the later (standard time) reading wins. Times that
/// fall in the spring gap do not exist on the wall clock and are read with
/// the standard-time offset instead.
pub fn localize(naive: NaiveDateTime) -> NetworkTime {
    match NETWORK_TZ.from_local_datetime(&naive) {
        LocalResult::Single(t) => t,
        LocalResult::Ambiguous(_, standard) => standard,
        LocalResult::None => {
            NETWORK_TZ.from_utc_datetime(&(naive - TimeDelta::hours(STANDARD_OFFSET_HOURS)))
        }
    }
}
