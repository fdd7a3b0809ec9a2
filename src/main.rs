use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use dominoes_engine::config::Config;
use dominoes_engine::logging::setup_logging;
use dominoes_engine::rng::{RandomSource, StdRandomSource};
use dominoes_engine::services::registry::SessionRegistry;
use dominoes_engine::services::timers;
use dominoes_engine::transport::ws::ConnectionHub;
use dominoes_engine::transport::{http, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    setup_logging(config.log_dir.as_deref())?;

    let registry = SessionRegistry::new();
    let hub = ConnectionHub::new();
    let rng: Arc<dyn RandomSource> = match config.rng_seed {
        Some(seed) => Arc::new(StdRandomSource::seeded(seed, false)),
        None => Arc::new(StdRandomSource::new(false)),
    };

    let state = AppState {
        registry: registry.clone(),
        hub: hub.clone(),
        rng: rng.clone(),
        default_picking_timeout: config.picking_timeout,
        default_turn_timeout: config.turn_timeout,
    };

    let http_addr: SocketAddr = format!("{}:{}", config.host, config.http_port).parse()?;
    let ws_addr: SocketAddr = format!("{}:{}", config.host, config.ws_port).parse()?;

    log::info!("HTTP API listening on {http_addr}");
    log::info!("WebSocket endpoint listening on {ws_addr}");

    let http_task = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(http_addr).await.expect("bind http listener");
        if let Err(e) = axum::serve(listener, http::router(state)).await {
            log::error!("http server error: {e}");
        }
    });

    let ws_task = {
        let registry = registry.clone();
        let hub = hub.clone();
        let rng = rng.clone();
        tokio::spawn(async move {
            if let Err(e) = dominoes_engine::transport::ws::serve(ws_addr, registry, hub, rng).await {
                log::error!("websocket server error: {e}");
            }
        })
    };

    let cleanup_task = tokio::spawn(timers::cleanup_sweep(registry.clone(), Duration::from_secs(config.cleanup_interval)));
    let picking_task = tokio::spawn(timers::picking_timeout_sweep(registry.clone(), Duration::from_secs(5), hub.clone()));
    let turn_task = tokio::spawn(timers::turn_timeout_sweep(registry.clone(), Duration::from_secs(1), rng.clone(), hub.clone()));

    tokio::signal::ctrl_c().await?;
    log::info!("shutting down");

    http_task.abort();
    ws_task.abort();
    cleanup_task.abort();
    picking_task.abort();
    turn_task.abort();

    Ok(())
}
