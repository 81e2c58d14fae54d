//! Web layer for the departure gateway.
//!
//! Serves departure boards shaped for small display clients, plus cache
//! inspection and health endpoints.

mod dto;
mod rate_limit;
mod routes;
mod state;

pub use dto::*;
pub use rate_limit::{DepartureLimits, RateLimiter};
pub use routes::{AppError, create_router};
pub use state::AppState;
