mod config;
mod engine;
mod errors;
mod routes;
mod simplify;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::engine::hf_client::HfEngineFactory;
use crate::engine::provider::EngineProvider;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.rust_log.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ClearSpeak API v{}", env!("CARGO_PKG_VERSION"));

    // The engine is NOT initialized here. The provider defers the expensive
    // model load to the first simplification request and memoizes the result.
    let factory = HfEngineFactory {
        api_token: config.hf_api_token.clone(),
    };
    let provider = Arc::new(EngineProvider::new(
        Box::new(factory),
        config.init_retry_policy(),
    ));
    info!(
        "Engine provider ready (model: {}, init retry policy: {:?})",
        engine::MODEL,
        config.init_retry_policy()
    );

    let state = AppState { provider };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
