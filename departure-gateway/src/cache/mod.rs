//! Caching layer for Trafiklab responses.
//!
//! Trafiklab keys are quota-limited, so the last fetched board is kept in a
//! single process-wide slot. How long it stays fresh depends on the time of
//! day (see [`TtlPolicy`]): boards fetched at night live longer because
//! trains run less often.

mod client;
mod policy;
mod store;

pub use client::CachedDepartures;
pub use policy::{
    DEFAULT_DAY_TTL, DEFAULT_NIGHT_TTL, NIGHT_END_HOUR, NIGHT_START_HOUR, Period, TtlPolicy,
};
pub use store::{CacheStatus, DepartureCache};
