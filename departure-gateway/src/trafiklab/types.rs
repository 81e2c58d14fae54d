//! Trafiklab realtime API response DTOs.
//!
//! These types map directly to the `v1/departures` JSON. Every field is an
//! `Option` because the provider omits fields rather than sending defaults,
//! and unknown fields are ignored.

use serde::Deserialize;

/// Response from `GET /v1/departures/{site_id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeparturesResponse {
    /// Upcoming departures, in provider order.
    pub departures: Option<Vec<RawDeparture>>,

    /// Stop points belonging to the requested site.
    pub stops: Option<Vec<StopPoint>>,
}

/// A single departure as sent by the provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawDeparture {
    /// Timetabled departure, civil time without offset.
    pub scheduled: Option<String>,

    /// Predicted departure, civil time without offset.
    pub realtime: Option<String>,

    /// Difference between realtime and scheduled, in seconds.
    pub delay: Option<i64>,

    pub canceled: Option<bool>,

    /// Whether `realtime` comes from live tracking.
    pub is_realtime: Option<bool>,

    pub route: Option<Route>,
}

/// Route information attached to a departure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Route {
    /// Line or trip label, e.g. "41".
    pub designation: Option<String>,

    /// Upper-case mode such as "TRAIN" or "BUS".
    pub transport_mode: Option<String>,

    /// Free-text destination.
    pub direction: Option<String>,
}

/// A stop point (platform group) at the site.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StopPoint {
    pub name: Option<String>,
}
