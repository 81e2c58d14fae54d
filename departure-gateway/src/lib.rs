//! Departure gateway.
//!
//! Fetches a station's departure board from the Trafiklab realtime API,
//! caches it with a TTL that depends on the time of day, and serves a
//! trimmed, display-ready version over HTTP.

pub mod cache;
pub mod config;
pub mod domain;
pub mod trafiklab;
pub mod web;
