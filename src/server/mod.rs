//! HTTP server assembly.
//!
//! Builds the axum router (detection endpoint plus health check) and runs
//! it. [`AppContext`] is the state shared across handlers: the immutable
//! configuration and one [`Detector`] reused by every request.

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use veriframe_core::Config;

use crate::detector::Detector;

/// Shared state for route handlers.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub detector: Arc<Detector>,
}

impl AppContext {
    /// Build the context, constructing the detector (and discovering
    /// external tools) once.
    pub fn new(config: Config) -> Self {
        let detector = Arc::new(Detector::new(config.clone()));
        Self {
            config: Arc::new(config),
            detector,
        }
    }
}

/// Build the complete axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/detect", post(routes::detect))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(ctx)
}

/// Start the veriframe server and serve until the process is stopped.
pub async fn serve(config: Config) -> veriframe_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let ctx = AppContext::new(config);
    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("veriframe listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
