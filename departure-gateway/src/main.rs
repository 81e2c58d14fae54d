use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use departure_gateway::config::AppConfig;
use departure_gateway::trafiklab::{
    MockTrafiklabClient, TrafiklabClient, TrafiklabError, Upstream,
};
use departure_gateway::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let upstream = match build_upstream(&config) {
        Ok(upstream) => upstream,
        Err(e) => {
            error!("failed to create upstream client: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        default_site_id = %config.default_site_id,
        night_ttl_secs = config.night_ttl.as_secs(),
        day_ttl_secs = config.day_ttl.as_secs(),
        rate_limit = config.rate_limit_max_calls,
        rate_limit_period_secs = config.rate_limit_period.as_secs(),
        "starting departure gateway"
    );

    let addr = config.bind_addr;
    let app = create_router(AppState::new(upstream, config));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, "failed to bind: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!("listening on http://{addr}");
    info!("  GET  /health                          - Health check");
    info!("  GET  /departures                      - All departures, default station");
    info!("  GET  /departures/<site_id>            - All departures for a station");
    info!("  GET  /departures/[<site_id>/]northbound");
    info!("  GET  /departures/[<site_id>/]southbound");
    info!("  GET  /cache/status                    - Cache state");
    info!("  POST /cache/clear                     - Clear cache");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {e}");
        return ExitCode::FAILURE;
    }

    info!("shut down");
    ExitCode::SUCCESS
}

/// Mock data when `MOCK_DATA_DIR` is set, the live API otherwise.
fn build_upstream(config: &AppConfig) -> Result<Upstream, TrafiklabError> {
    if let Some(dir) = &config.mock_data_dir {
        let mock = MockTrafiklabClient::new(dir)?;
        info!(dir = %dir.display(), sites = ?mock.available_sites(), "serving mock departures");
        return Ok(Upstream::Mock(mock));
    }

    if config.api_key.is_empty() {
        warn!("TRAFIKLAB_API_KEY not set. API calls will fail.");
    }
    let client = TrafiklabClient::new(config.trafiklab_config())?;
    Ok(Upstream::Live(client))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
