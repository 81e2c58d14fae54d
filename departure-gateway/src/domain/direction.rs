//! Direction of travel, guessed from destination names.
//!
//! Classification is a substring match against fixed keyword tables for
//! the Stockholm commuter network. A destination can match both tables or
//! neither.

use serde::Serialize;

use super::departure::DisplayDeparture;

/// Destinations north of the city.
const NORTHBOUND_KEYWORDS: &[&str] = &[
    "märsta",
    "uppsala",
    "upplands väsby",
    "väsby",
    "kungsängen",
    "bålsta",
    "arlanda",
    "knivsta",
];

/// Destinations in or south of the city.
const SOUTHBOUND_KEYWORDS: &[&str] = &[
    "stockholm",
    "södertälje",
    "tumba",
    "city",
    "centralen",
    "t-centralen",
    "huddinge",
    "flemingsberg",
    "älvsjö",
];

/// A filtered view of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Northbound,
    Southbound,
}

impl Direction {
    /// Keywords that place a destination in this direction.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Direction::Northbound => NORTHBOUND_KEYWORDS,
            Direction::Southbound => SOUTHBOUND_KEYWORDS,
        }
    }

    /// Whether `destination` contains any of this direction's keywords,
    /// ignoring case.
    pub fn matches(self, destination: &str) -> bool {
        let destination = destination.to_lowercase();
        self.keywords().iter().any(|k| destination.contains(k))
    }

    /// Keep only departures heading this way, preserving order.
    pub fn filter(self, departures: Vec<DisplayDeparture>) -> Vec<DisplayDeparture> {
        departures
            .into_iter()
            .filter(|d| self.matches(&d.destination))
            .collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Northbound => "northbound",
            Direction::Southbound => "southbound",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DisplayTime;

    fn departure(destination: &str) -> DisplayDeparture {
        DisplayDeparture {
            mode: "Train".into(),
            line: "41".into(),
            destination: destination.into(),
            display_time: DisplayTime::Unknown,
            scheduled: String::new(),
            realtime: String::new(),
            delay: 0,
            canceled: false,
            is_realtime: false,
        }
    }

    #[test]
    fn uppsala_is_northbound_only() {
        assert!(Direction::Northbound.matches("Uppsala C"));
        assert!(!Direction::Southbound.matches("Uppsala C"));
    }

    #[test]
    fn stockholm_city_is_southbound_only() {
        assert!(Direction::Southbound.matches("Stockholm City"));
        assert!(!Direction::Northbound.matches("Stockholm City"));
    }

    #[test]
    fn unknown_place_matches_neither() {
        assert!(!Direction::Northbound.matches("Nowhereville"));
        assert!(!Direction::Southbound.matches("Nowhereville"));
    }

    #[test]
    fn matching_ignores_case_of_non_ascii_letters() {
        assert!(Direction::Northbound.matches("MÄRSTA"));
        assert!(Direction::Southbound.matches("ÄLVSJÖ"));
    }

    #[test]
    fn substring_match_can_hit_both_tables() {
        let destination = "Arlanda via Stockholm";
        assert!(Direction::Northbound.matches(destination));
        assert!(Direction::Southbound.matches(destination));
    }

    #[test]
    fn filter_preserves_order() {
        let deps = vec![
            departure("Märsta"),
            departure("Södertälje centrum"),
            departure("Uppsala C"),
            departure("Nowhereville"),
            departure("Kungsängen"),
        ];

        let north: Vec<_> = Direction::Northbound
            .filter(deps.clone())
            .into_iter()
            .map(|d| d.destination)
            .collect();
        assert_eq!(north, ["Märsta", "Uppsala C", "Kungsängen"]);

        let south: Vec<_> = Direction::Southbound
            .filter(deps)
            .into_iter()
            .map(|d| d.destination)
            .collect();
        assert_eq!(south, ["Södertälje centrum"]);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Direction::Northbound).unwrap(),
            "\"northbound\""
        );
        assert_eq!(Direction::Southbound.as_str(), "southbound");
    }
}
