//! HTTP API server.
//!
//! Built on Axum. Serves the static client, the health check, the power
//! endpoint and temperature readings, plus an OpenAPI description of them
//! at `/api-docs/openapi.json` (browsable under `/swagger-ui`).

use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::Result;
use crate::temperature::{TemperatureReading, TemperatureSource};
use crate::tracing::prelude::*;

pub mod error;
pub mod handlers;
pub mod types;

use types::{ErrorResponse, HealthStatus, PowerState};

/// Shared application state for API endpoints.
#[derive(Clone)]
pub struct AppState {
    /// Where `/temperature` readings come from
    pub source: Arc<dyn TemperatureSource>,
    /// Static client asset directory
    pub client_dir: PathBuf,
}

impl AppState {
    pub fn new(source: Arc<dyn TemperatureSource>, client_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            client_dir: client_dir.into(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Edge Control"),
    paths(handlers::health, handlers::set_power, handlers::temperature),
    components(schemas(HealthStatus, PowerState, TemperatureReading, ErrorResponse))
)]
pub struct ApiDoc;

/// Build the complete router.
pub fn router(state: AppState) -> Router {
    let index = state.client_dir.join("index.html");
    let assets = state.client_dir.clone();

    Router::new()
        .route_service("/", ServeFile::new(index))
        .nest_service("/static", ServeDir::new(assets))
        .route("/health", get(handlers::health))
        .route("/power", post(handlers::set_power))
        .route("/temperature", get(handlers::temperature))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listen address.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    Ok(TcpListener::bind(addr).await?)
}

/// Serve the API on `listener` until `running` is cancelled.
pub async fn serve(listener: TcpListener, state: AppState, running: CancellationToken) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(
        %addr,
        source = %state.source.mode(),
        client_dir = %state.client_dir.display(),
        "API server listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { running.cancelled().await })
        .await?;

    debug!("API server stopped.");
    Ok(())
}

/// Task wrapper around [`serve`] for the daemon's task tracker.
///
/// A server failure cancels `running` so the rest of the process shuts down
/// with it.
pub async fn task(listener: TcpListener, state: AppState, running: CancellationToken) {
    trace!("Task started.");

    if let Err(e) = serve(listener, state, running.clone()).await {
        error!(error = %e, "API server failed");
        running.cancel();
    }

    trace!("Task stopped.");
}
