//! TrueCheck HTTP server entrypoint.

use std::net::SocketAddr;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use truecheck::classifier::HttpClassifierClient;
use truecheck::config::Config;
use truecheck::gateway::{HandlerState, create_router_with_state, check_health};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
 _____                  ____ _               _
|_   _| __ _   _  ___  / ___| |__   ___  ___| | __
  | || '__| | | |/ _ \| |   | '_ \ / _ \/ __| |/ /
  | || |  | |_| |  __/| |___| | | |  __/ (__|   <
  |_||_|   \__,_|\___| \____|_| |_|\___|\___|_|\_\

        ASK MANY. ANSWER ONCE.
"#
    );

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        image_models = config.image_models.len(),
        video_models = config.video_models.len(),
        policy = %config.verdict_policy,
        quota = config.result_quota,
        "TrueCheck starting"
    );

    if config.api_token.is_none() {
        tracing::warn!("No TRUECHECK_API_TOKEN configured, classifier calls are unauthenticated");
    }

    let client = HttpClassifierClient::new(config.api_token.clone(), config.classifier_timeout);
    let state = HandlerState::from_config(&config, client)?;
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("TrueCheck shutdown complete");
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = std::env::var("TRUECHECK_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8888);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    if check_health(addr, Duration::from_secs(1)).await {
        0
    } else {
        1
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
