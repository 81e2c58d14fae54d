//! Display records for the departure board client.

use std::fmt;

use chrono::{NaiveTime, TimeDelta};
use serde::{Serialize, Serializer};

use super::time::NetworkTime;

/// Departures this many minutes away or more are shown as a clock time.
const CLOCK_THRESHOLD_MINS: i64 = 60;

/// What the board shows in its time column.
///
/// Serializes to its display string:
///
/// ```
/// use departure_gateway::domain::DisplayTime;
///
/// assert_eq!(DisplayTime::Now.to_string(), "Nu");
/// assert_eq!(DisplayTime::InMinutes(7).to_string(), "7 min");
/// assert_eq!(DisplayTime::Unknown.to_string(), "?");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTime {
    /// Departing now or already gone.
    Now,
    /// Minutes until departure, 1 to 59.
    InMinutes(u8),
    /// An hour or more away; shown as wall-clock `HH:MM`.
    At(NaiveTime),
    /// No usable timestamp.
    Unknown,
}

impl DisplayTime {
    /// Classify a departure relative to `now`.
    ///
    /// Minutes are floored, so a departure 59m59s away is `"59 min"` and
    /// one exactly 60 minutes away switches to a clock time.
    pub fn until(departure: &NetworkTime, now: &NetworkTime) -> Self {
        let delta: TimeDelta = departure.signed_duration_since(*now);
        let minutes = delta.num_milliseconds().div_euclid(60_000);

        if minutes <= 0 {
            DisplayTime::Now
        } else if minutes < CLOCK_THRESHOLD_MINS {
            // Bounded by the threshold above.
            DisplayTime::InMinutes(minutes as u8)
        } else {
            DisplayTime::At(departure.time())
        }
    }
}

impl fmt::Display for DisplayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayTime::Now => write!(f, "Nu"),
            DisplayTime::InMinutes(n) => write!(f, "{n} min"),
            DisplayTime::At(time) => write!(f, "{}", time.format("%H:%M")),
            DisplayTime::Unknown => write!(f, "?"),
        }
    }
}

impl Serialize for DisplayTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A departure shaped for the display client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayDeparture {
    /// Title-cased transport mode, e.g. "Train".
    #[serde(rename = "type")]
    pub mode: String,

    /// Line designation, e.g. "41".
    pub line: String,

    /// Destination as given by the provider.
    pub destination: String,

    /// Relative or clock time for the board.
    pub display_time: DisplayTime,

    /// Scheduled time, passed through unparsed.
    pub scheduled: String,

    /// Realtime estimate, passed through unparsed.
    pub realtime: String,

    /// Delay in seconds.
    pub delay: i64,

    pub canceled: bool,

    pub is_realtime: bool,
}

/// Capitalize the first letter of every word and lowercase the rest.
///
/// A word starts at any letter not preceded by another letter, so
/// `"METRO_RAIL"` becomes `"Metro_Rail"`.
///
/// ```
/// use departure_gateway::domain::title_case;
///
/// assert_eq!(title_case("TRAIN"), "Train");
/// assert_eq!(title_case("light rail"), "Light Rail");
/// ```
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}
