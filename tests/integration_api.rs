//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use autarky_wizard::api::{AppState, RouterBackend, router};
use autarky_wizard::endpoints::Endpoint;
use autarky_wizard::wizard::{Navigation, Wizard};

fn build_api_state() -> Arc<AppState> {
    Arc::new(AppState {
        latency: Duration::ZERO,
    })
}

async fn post_json(path: &str, body: &Value) -> (StatusCode, Value) {
    let app = router(build_api_state());
    let req = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn every_endpoint_rejects_empty_object() {
    for endpoint in Endpoint::ALL {
        let (status, body) = post_json(endpoint.path(), &json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{endpoint}");
        assert_eq!(body, json!({ "error": "Missing required fields" }));
    }
}

#[tokio::test]
async fn null_required_field_counts_as_missing() {
    let (status, _) = post_json(
        "/api/model-uncertainties",
        &json!({ "project_id": "abc123", "selected_model": null }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_project_name_is_bad_request() {
    let (status, body) = post_json(
        "/api/project-setup",
        &json!({
            "project_name": "",
            "location": { "latitude": -2.27, "longitude": 40.9 }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing required fields" }));
}

#[tokio::test]
async fn project_setup_echoes_body() {
    let body = json!({
        "project_name": "Lamu",
        "location": { "latitude": 0.0, "longitude": 0.0 },
        "extra": [1, 2, 3]
    });
    let (status, ack) = post_json("/api/project-setup", &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["success"], true);
    assert_eq!(ack["message"], "Project setup saved successfully");
    assert_eq!(ack["data"], body);
}

#[tokio::test]
async fn system_configuration_returns_layout_id() {
    let (status, ack) = post_json(
        "/api/system-configuration",
        &json!({ "project_id": "abc123", "enabled_components": {}, "layout_id": 7 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ack,
        json!({
            "status": "ok",
            "message": "System configuration saved successfully",
            "layout_id": 7
        })
    );
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = router(build_api_state());
    let req = Request::builder()
        .method("POST")
        .uri("/api/renewable-potential")
        .body(Body::from("{}"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wizard_completes_over_http() {
    let backend = RouterBackend::new(build_api_state());
    let mut wizard = Wizard::new(common::default_state(), backend);
    let mut last = None;
    for _ in 0..5 {
        last = Some(wizard.next().await.unwrap());
    }
    assert_eq!(last, Some(Navigation::Completed));
    assert_eq!(
        wizard.last_acknowledgement().unwrap()["message"],
        "Model uncertainties saved successfully"
    );
}
