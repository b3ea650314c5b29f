//! Shared fixtures for server tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use petal_classifier::{
    ClassificationPipeline, InferenceBackend, InferenceInvoker, ModelLifecycle,
};
use petal_core::ClassCatalog;
use petal_server::{create_router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

#[path = "../../../petal-classifier/tests/support/mod.rs"]
mod support;

pub use support::{CentroidBackend, FailingBackend};

pub fn state_with_model(model: Arc<ModelLifecycle>) -> AppState {
    let pipeline = ClassificationPipeline::new(model, InferenceInvoker::new(), ClassCatalog::iris());
    AppState::new(pipeline, None)
}

pub fn app_with_backend(backend: Arc<dyn InferenceBackend>) -> Router {
    create_router(state_with_model(Arc::new(ModelLifecycle::with_backend(backend))))
}

/// Router over a loaded centroid model
pub fn ready_app() -> Router {
    app_with_backend(Arc::new(CentroidBackend::new()))
}

/// Status, content type and body of a GET request
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub async fn get(app: Router, uri: &str) -> TestResponse {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    TestResponse {
        status,
        content_type,
        body: String::from_utf8(body.to_vec()).unwrap(),
    }
}
