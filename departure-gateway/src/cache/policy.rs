//! Time-of-day cache lifetime.
//!
//! Trains run less often at night, so cached boards live longer between
//! midnight and 07:00 network time.

use std::time::Duration;

use chrono::Timelike;
use serde::Serialize;

use crate::domain::NetworkTime;

/// First hour of the night window (inclusive).
pub const NIGHT_START_HOUR: u32 = 0;

/// First hour after the night window.
pub const NIGHT_END_HOUR: u32 = 7;

/// Default night TTL: 10 minutes.
pub const DEFAULT_NIGHT_TTL: Duration = Duration::from_secs(600);

/// Default day TTL: 2 minutes.
pub const DEFAULT_DAY_TTL: Duration = Duration::from_secs(120);

/// Part of the day a TTL applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Night,
    Day,
}

impl Period {
    /// Period containing the given hour of the day (0-23).
    pub fn of_hour(hour: u32) -> Self {
        if (NIGHT_START_HOUR..NIGHT_END_HOUR).contains(&hour) {
            Period::Night
        } else {
            Period::Day
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Night => "night",
            Period::Day => "day",
        }
    }
}

/// Chooses the cache TTL from the network wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    night_ttl: Duration,
    day_ttl: Duration,
}

impl TtlPolicy {
    /// Create a policy with the given night and day TTLs.
    pub fn new(night_ttl: Duration, day_ttl: Duration) -> Self {
        Self { night_ttl, day_ttl }
    }

    /// Period that `now` falls in.
    ///
    /// `now` is already in the network zone, so the hour is network-local
    /// regardless of the host's zone.
    pub fn period(&self, now: &NetworkTime) -> Period {
        Period::of_hour(now.hour())
    }

    /// TTL in force at `now`.
    pub fn current_ttl(&self, now: &NetworkTime) -> Duration {
        self.ttl_for(self.period(now))
    }

    /// TTL configured for a period.
    pub fn ttl_for(&self, period: Period) -> Duration {
        match period {
            Period::Night => self.night_ttl,
            Period::Day => self.day_ttl,
        }
    }

    pub fn night_ttl(&self) -> Duration {
        self.night_ttl
    }

    pub fn day_ttl(&self) -> Duration {
        self.day_ttl
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_NIGHT_TTL, DEFAULT_DAY_TTL)
    }
}
