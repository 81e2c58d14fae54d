//! Trafiklab realtime departures client.
//!
//! This module provides an HTTP client for the Trafiklab realtime API
//! (`v1/departures`), which serves live departure boards for SL and other
//! Swedish operators.
//!
//! Key characteristics of the API:
//! - The API key travels as a `key` query parameter, not a header
//! - Times are civil date-times in Swedish local time with no offset
//! - Calls count against a quota, so responses are cached upstream of this
//!   module (see [`crate::cache`])

mod client;
mod convert;
mod error;
mod mock;
mod source;
mod types;

pub use client::{TrafiklabClient, TrafiklabConfig};
pub use convert::{MAX_DEPARTURES, convert_departure, convert_departures, station_name};
pub use error::TrafiklabError;
pub use mock::MockTrafiklabClient;
pub use source::{DepartureSource, Upstream};
pub use types::{DeparturesResponse, RawDeparture, Route, StopPoint};
