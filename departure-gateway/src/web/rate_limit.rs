//! Sliding-window rate limiting for the departures routes.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::routes::AppError;

/// Admits at most `max_calls` requests in any `period`.
///
/// Limiters are per view, not per client.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, period: Duration) -> Self {
        Self {
            max_calls,
            period,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Record a call now if the window has room.
    pub fn check(&self) -> bool {
        self.check_at(Instant::now())
    }

    /// Record a call at `now` if the window has room.
    ///
    /// Calls at least `period` old have left the window.
    pub fn check_at(&self, now: Instant) -> bool {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);

        while calls
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= self.period)
        {
            calls.pop_front();
        }

        if calls.len() >= self.max_calls {
            return false;
        }

        calls.push_back(now);
        true
    }
}

/// One window for each departures view.
///
/// The north- and southbound views each share a window between their
/// default-site and explicit-site routes.
#[derive(Debug, Clone)]
pub struct DepartureLimits {
    /// `/departures`
    pub all: Arc<RateLimiter>,
    /// `/departures/{site_id}`
    pub site: Arc<RateLimiter>,
    pub northbound: Arc<RateLimiter>,
    pub southbound: Arc<RateLimiter>,
}

impl DepartureLimits {
    /// Four independent windows with the same settings.
    pub fn new(max_calls: usize, period: Duration) -> Self {
        let limiter = || Arc::new(RateLimiter::new(max_calls, period));
        Self {
            all: limiter(),
            site: limiter(),
            northbound: limiter(),
            southbound: limiter(),
        }
    }
}

/// Middleware rejecting requests over the limit with 429.
pub async fn limit_requests(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if !limiter.check() {
        warn!(path = %request.uri().path(), "rate limit exceeded");
        return AppError::RateLimited {
            max_calls: limiter.max_calls(),
            period_secs: limiter.period().as_secs(),
        }
        .into_response();
    }

    next.run(request).await
}
