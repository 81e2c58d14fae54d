//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::{Direction, network_now};
use crate::trafiklab::{TrafiklabError, convert_departures, station_name};

use super::dto::*;
use super::rate_limit::{RateLimiter, limit_requests};
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let limits = state.limits.clone();

    let all = Router::new().route("/departures", get(default_departures));
    let site = Router::new().route("/departures/:site_id", get(site_departures));
    let northbound = Router::new()
        .route("/departures/northbound", get(default_northbound))
        .route("/departures/:site_id/northbound", get(site_northbound));
    let southbound = Router::new()
        .route("/departures/southbound", get(default_southbound))
        .route("/departures/:site_id/southbound", get(site_southbound));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/cache/status", get(cache_status))
        .route("/cache/clear", post(clear_cache))
        .merge(rate_limited(all, &limits.all))
        .merge(rate_limited(site, &limits.site))
        .merge(rate_limited(northbound, &limits.northbound))
        .merge(rate_limited(southbound, &limits.southbound))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Put `routes` behind `limiter`.
fn rate_limited(routes: Router<AppState>, limiter: &Arc<RateLimiter>) -> Router<AppState> {
    routes.route_layer(middleware::from_fn_with_state(limiter.clone(), limit_requests))
}

/// Service description.
async fn index(State(state): State<AppState>) -> Json<ServiceInfoResponse> {
    let endpoint = |method, path, description| EndpointInfo {
        method,
        path,
        description,
    };

    Json(ServiceInfoResponse {
        service: "Train Departure API",
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
        default_site_id: state.config.default_site_id.clone(),
        endpoints: vec![
            endpoint("GET", "/", "Service information (this page)"),
            endpoint("GET", "/health", "Health check for container orchestration"),
            endpoint("GET", "/departures", "All departures from the default station"),
            endpoint("GET", "/departures?site_id=<id>", "All departures for a station"),
            endpoint("GET", "/departures/<site_id>", "All departures for a station"),
            endpoint("GET", "/departures/northbound", "Northbound departures from the default station"),
            endpoint("GET", "/departures/southbound", "Southbound departures from the default station"),
            endpoint("GET", "/departures/<site_id>/northbound", "Northbound departures for a station"),
            endpoint("GET", "/departures/<site_id>/southbound", "Southbound departures for a station"),
            endpoint("GET", "/cache/status", "Cache state and TTL configuration"),
            endpoint("POST", "/cache/clear", "Clear cached data"),
        ],
    })
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

async fn default_departures(
    State(state): State<AppState>,
    Query(query): Query<DeparturesQuery>,
) -> Result<Json<DepartureBoardResponse>, AppError> {
    let site_id = query
        .site_id
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| state.config.default_site_id.clone());
    departure_board(&state, site_id, None).await
}

async fn default_northbound(
    State(state): State<AppState>,
) -> Result<Json<DepartureBoardResponse>, AppError> {
    let site_id = state.config.default_site_id.clone();
    departure_board(&state, site_id, Some(Direction::Northbound)).await
}

async fn default_southbound(
    State(state): State<AppState>,
) -> Result<Json<DepartureBoardResponse>, AppError> {
    let site_id = state.config.default_site_id.clone();
    departure_board(&state, site_id, Some(Direction::Southbound)).await
}

async fn site_departures(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Result<Json<DepartureBoardResponse>, AppError> {
    departure_board(&state, site_id, None).await
}

async fn site_northbound(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Result<Json<DepartureBoardResponse>, AppError> {
    departure_board(&state, site_id, Some(Direction::Northbound)).await
}

async fn site_southbound(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Result<Json<DepartureBoardResponse>, AppError> {
    departure_board(&state, site_id, Some(Direction::Southbound)).await
}

/// Fetch (or reuse) the board for `site_id` and shape it for the client.
///
/// `site_id` in the response is the requested id even when the cached
/// board was fetched for another site.
async fn departure_board(
    state: &AppState,
    site_id: String,
    direction: Option<Direction>,
) -> Result<Json<DepartureBoardResponse>, AppError> {
    let board = state.departures.get_departures(&site_id).await?;

    let now = network_now();
    let mut departures = convert_departures(&board, &now);
    if let Some(direction) = direction {
        departures = direction.filter(departures);
    }

    Ok(Json(DepartureBoardResponse {
        station_name: station_name(&board).to_string(),
        site_id,
        direction,
        updated_at: now.to_rfc3339(),
        total_departures: departures.len(),
        departures,
    }))
}

/// Cache state and TTL configuration.
async fn cache_status(State(state): State<AppState>) -> Json<CacheStatusResponse> {
    let now = network_now();
    let status = state.departures.cache_status(&now).await;
    let policy = state.departures.cache().policy();
    Json(CacheStatusResponse::new(&now, policy, &status))
}

/// Empty the cache so the next request goes upstream.
async fn clear_cache(State(state): State<AppState>) -> Json<MessageResponse> {
    state.departures.clear_cache().await;
    Json(MessageResponse {
        message: "Cache cleared",
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Upstream fetch failed; reported to clients as a plain 500
    Upstream(TrafiklabError),
    RateLimited { max_calls: usize, period_secs: u64 },
}

impl From<TrafiklabError> for AppError {
    fn from(e: TrafiklabError) -> Self {
        AppError::Upstream(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Upstream(e) => {
                error!(error = %e, "departures request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Failed to fetch data".to_string(),
                        message: None,
                    },
                )
            }
            AppError::RateLimited {
                max_calls,
                period_secs,
            } => {
                warn!(max_calls, period_secs, "rejecting request over rate limit");
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    ErrorResponse {
                        error: "Rate limit exceeded".to_string(),
                        message: Some(format!(
                            "Maximum {max_calls} requests per {period_secs} seconds"
                        )),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
