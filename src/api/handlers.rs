//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use super::AppState;
use super::types::{CompatibleQuery, CompatibleResponse, ErrorResponse};
use crate::components::EnabledComponents;
use crate::endpoints::{self, Endpoint, HandlerError};
use crate::layouts::{CATALOG, Layout, compatible_layouts};

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}

/// Handles a wizard submission.
///
/// `POST /api/<step>` → 200 + acknowledgement, 400 on missing fields, 500 on
/// an unreadable body. The body is taken raw so malformed JSON reaches the
/// handler instead of being rejected by an extractor.
pub async fn submit(
    state: Arc<AppState>,
    endpoint: Endpoint,
    body: Bytes,
) -> Result<Json<Value>, HandlerError> {
    endpoints::process(endpoint, &body, state.latency)
        .await
        .map(Json)
}

/// Returns the full layout catalog.
///
/// `GET /api/layouts` → 200 + `Vec<Layout>` JSON
pub async fn list_layouts() -> Json<&'static [Layout]> {
    Json(&CATALOG[..])
}

/// Filters the catalog for the components switched on in the query.
///
/// `GET /api/layouts/compatible?solar_pv=true&battery=true` → 200 + `CompatibleResponse`
/// Unknown keys or non-boolean values → 400 + `ErrorResponse`
pub async fn compatible(
    query: Result<Query<CompatibleQuery>, QueryRejection>,
) -> Result<Json<CompatibleResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Query(query) = query.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.body_text(),
            }),
        )
    })?;

    let enabled = EnabledComponents::from(query);
    Ok(Json(CompatibleResponse::new(
        enabled,
        compatible_layouts(&enabled),
    )))
}
