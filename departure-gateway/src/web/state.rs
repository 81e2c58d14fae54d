//! Application state for the web layer.

use std::sync::Arc;

use super::rate_limit::DepartureLimits;
use crate::cache::CachedDepartures;
use crate::config::AppConfig;
use crate::trafiklab::Upstream;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cached upstream departures
    pub departures: Arc<CachedDepartures<Upstream>>,

    /// Rate limit windows for the departures routes
    pub limits: DepartureLimits,

    /// Process configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(upstream: Upstream, config: AppConfig) -> Self {
        let departures = CachedDepartures::new(upstream, config.ttl_policy());
        let limits = DepartureLimits::new(config.rate_limit_max_calls, config.rate_limit_period);

        Self {
            departures: Arc::new(departures),
            limits,
            config: Arc::new(config),
        }
    }
}
