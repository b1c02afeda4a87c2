use crate::components::{build_provider, RegexIntentParser};
use crate::config::Config;
use crate::error::{other_error, Error};
use crate::shutdown;
use crate::web::{router, AppState};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| other_error(&format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and validate the service configuration
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Bind the HTTP server and serve until a shutdown signal arrives
pub async fn start_server(config: Config) -> miette::Result<()> {
    let provider = build_provider(&config)?;
    let state = AppState::new(&config, provider, Arc::new(RegexIntentParser::new()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| {
            Error::Config(format!(
                "Failed to bind {}:{}: {}",
                config.host, config.port, e
            ))
        })?;
    info!("Listening on {}", listener.local_addr().map_err(Error::from)?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .map_err(Error::from)?;

    info!("Server stopped");
    Ok(())
}
