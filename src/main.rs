use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use json_error_mapper::api::handlers::AppStateInner;
use json_error_mapper::api::routes::create_router;
use json_error_mapper::config::Config;
use json_error_mapper::{metrics, Exception, JsonExceptionMapper};

/// Sub-code reported for authorization challenges
const SUB_CODE_CHALLENGE: i32 = 1;
/// Sub-code reported for errors without an embedded status
const SUB_CODE_UNHANDLED: i32 = 2;

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,json_error_mapper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JSON Error Mapper v{}", env!("CARGO_PKG_VERSION"));

    metrics::registry::init_metrics();
    info!("Metrics registry initialized");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        debug_mode = config.errors.debug_mode,
        "Configuration loaded successfully"
    );

    let mapper = JsonExceptionMapper::from_config(&config.errors).with_customizer(
        |exception, error| match exception {
            Exception::NotAuthorized { .. } => error.sub_code = SUB_CODE_CHALLENGE,
            Exception::Unhandled(_) => error.sub_code = SUB_CODE_UNHANDLED,
            Exception::Http { .. } => {}
        },
    );

    let state = Arc::new(AppStateInner {
        exception_filter: Arc::new(mapper),
        instance_id: config.server.instance_id.clone(),
    });

    let app = create_router(state);

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind server")?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");

    Ok(())
}
