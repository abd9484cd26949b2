use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use treesignal_web::app::{AppState, build_router};
use treesignal_web::cleanup::run_cleanup_loop;
use treesignal_web::config;

fn main() {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(async {
            if let Err(err) = run_server().await {
                eprintln!("{err}");
                std::process::exit(1);
            }
        });
}

async fn run_server() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = config::load_config();
    let state = AppState::new(&config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("failed to bind HTTP on {addr}: {e}"))?;
    info!(%addr, version = %config.client.version, "tree-signal HTTP API ready");

    let mut cleanup_seconds = config.cleanup.interval_seconds;
    if !(cleanup_seconds > 0.0) {
        warn!(
            configured = config.cleanup.interval_seconds,
            "cleanup interval must be positive, using 60s"
        );
        cleanup_seconds = 60.0;
    }

    let app = build_router(state.clone());
    tokio::select! {
        _ = run_cleanup_loop(state.clone(), Duration::from_secs_f64(cleanup_seconds)) => {}
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!(%e, "HTTP server error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }
    Ok(())
}
