//! HTTP surface for the wizard submissions and the layout catalog.
//!
//! - `POST /api/project-setup`, `/api/system-configuration`,
//!   `/api/technology-parameters`, `/api/load-demand`,
//!   `/api/model-uncertainties`: validate and acknowledge a step
//! - `GET /api/layouts`: the full catalog
//! - `GET /api/layouts/compatible?<component>=true...`: filter result

mod handlers;
mod types;

pub use types::{CompatibleQuery, CompatibleResponse, ErrorResponse};

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tower::util::ServiceExt;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::backend::{Backend, SubmitError};
use crate::endpoints::{Endpoint, INTERNAL_ERROR, Reply};
use crate::telemetry::shutdown_signal;

/// Application state shared across all request handlers.
///
/// Handlers keep nothing between requests, so this only carries settings.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Simulated processing time before each acknowledgement.
    pub latency: Duration,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/api/layouts", get(handlers::list_layouts))
        .route("/api/layouts/compatible", get(handlers::compatible));

    for endpoint in Endpoint::ALL {
        app = app.route(
            endpoint.path(),
            post(
                move |State(state): State<Arc<AppState>>, body: axum::body::Bytes| {
                    handlers::submit(state, endpoint, body)
                },
            ),
        );
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Binds to the given address and serves the API until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Sends submissions through the HTTP router in-process.
#[derive(Debug, Clone)]
pub struct RouterBackend {
    router: Router,
}

impl RouterBackend {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            router: router(state),
        }
    }
}

impl Backend for RouterBackend {
    async fn post(&self, endpoint: Endpoint, body: Vec<u8>) -> Result<Reply, SubmitError> {
        let transport = |message: String| SubmitError::Transport { endpoint, message };

        let req = Request::builder()
            .method("POST")
            .uri(endpoint.path())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .map_err(|e| transport(e.to_string()))?;

        let resp = self
            .router
            .clone()
            .oneshot(req)
            .await
            .map_err(|e| transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .map_err(|e| transport(e.to_string()))?;

        let body = serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| json!({ "error": INTERNAL_ERROR }));
        Ok(Reply { status, body })
    }
}
