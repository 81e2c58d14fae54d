//! Domain types for the departure board.
//!
//! Everything here is independent of the upstream wire format: network
//! time, the display record sent to the board, and direction filtering.

mod departure;
mod direction;
mod time;

pub use departure::{DisplayDeparture, DisplayTime, title_case};
pub use direction::Direction;
pub use time::{NETWORK_TZ, NetworkTime, TimeError, localize, network_now, parse_civil};
