//! BrightBudget ops server — webhook-driven deployment dispatcher.
//!
//! A standalone binary that replaces a heavyweight CI setup for the
//! BrightBudget backend: it listens for GitHub push webhooks and runs the
//! deployment script for qualifying pushes, with signature validation,
//! serialized execution, a hard timeout, and post-deployment health
//! verification.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use brightbudget_ops_server::audit::AuditLog;
use brightbudget_ops_server::services::executor::DeploymentExecutor;
use brightbudget_ops_server::services::health::HealthVerifier;
use brightbudget_ops_server::{config, metrics, routes};

#[derive(Parser)]
#[command(name = "brightbudget-ops", about = "BrightBudget deployment webhook server")]
struct Cli {
    /// Server port
    #[arg(short, long, env = "OPS_PORT", default_value = "9090")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    }

    let cli = Cli::parse();

    tracing::info!("Starting BrightBudget ops server...");

    let config = Arc::new(config::OpsConfig::from_env());
    let audit = AuditLog::open(&config.audit_log_path);

    let state = routes::AppState {
        config: config.clone(),
        executor: Arc::new(DeploymentExecutor::new()),
        verifier: Arc::new(HealthVerifier::new()),
        audit: audit.clone(),
    };

    let app = routes::router(state);

    // Initialize metrics
    metrics::init_metrics();

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    tracing::info!(
        repo = %config.repo_path.display(),
        audit_log = %config.audit_log_path.display(),
        "BrightBudget ops server listening on {}",
        addr
    );
    audit.record(&format!("Ops server started on port {}", cli.port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    audit.record("Ops server stopped");
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
