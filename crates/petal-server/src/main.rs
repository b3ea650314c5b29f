//! Petal Server
//!
//! Serves iris classifications from an ONNX model over HTTP.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use petal_classifier::load_backend;
use petal_server::{create_router, AppState, Cli, ServerConfig};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting Petal server");

    // Load configuration
    let config = ServerConfig::load(&cli)?;
    info!("Configuration loaded successfully");
    info!("Model: {}", config.model.path.display());
    info!("Classes: {}", config.model.classes.join(", "));

    // Initialize metrics
    let metrics_handle = if config.telemetry.metrics_enabled {
        Some(init_metrics()?)
    } else {
        None
    };

    let state = AppState::from_config(&config, metrics_handle)?;
    let model = state.model().clone();
    let model_config = config.model.clone();
    let load_model = async move {
        if model
            .initialize(move || load_backend(&model_config))
            .await
            .is_err()
        {
            warn!("Continuing without a model; /iris will answer 503");
        }
    };

    let app = create_router(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server is running on port {}", addr.port());

    if cli.wait_for_model {
        load_model.await;
    } else {
        tokio::spawn(load_model);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            warn!("Shutdown signal received, stopping server...");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("petal=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("petal=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "petal_requests_total",
        "Total number of /iris requests by response status"
    );
    metrics::describe_histogram!(
        "petal_inference_latency_us",
        metrics::Unit::Microseconds,
        "Model inference latency in microseconds"
    );
    metrics::describe_gauge!("petal_model_ready", "1 when the model is loaded, 0 otherwise");
    metrics::gauge!("petal_model_ready").set(0.0);

    info!("Metrics exporter initialized");
    Ok(handle)
}
