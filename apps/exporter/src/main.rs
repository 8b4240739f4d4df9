mod config;
mod errors;
mod exports;
mod layout;
mod preview;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::LayoutConfig;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting exporter v{}", env!("CARGO_PKG_VERSION"));

    let layout = LayoutConfig::default();
    info!(
        "Layout defaults: {}x{}pt, margins x={} top={} bottom={}",
        layout.page_width, layout.page_height, layout.margin_x, layout.margin_top, layout.margin_bottom
    );
    match &config.export_dir {
        Some(dir) => info!("Saving exports to {}", dir.display()),
        None => info!("EXPORT_DIR not set; exports are returned but not saved"),
    }

    let state = AppState::new(config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
