//! HTTP routes and handlers

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use petal_core::{parse_features, Error, VALIDATION_MESSAGE};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/iris", get(classify_iris))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Query string of `/iris`
#[derive(Debug, Deserialize)]
pub struct IrisQuery {
    /// Four comma-separated measurements
    data: Option<String>,
}

/// Classify one set of iris measurements
///
/// The readiness gate runs before the query is looked at, so an unloaded
/// model answers 503 even for malformed input.
async fn classify_iris(
    State(state): State<AppState>,
    query: Result<Query<IrisQuery>, QueryRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("iris", %request_id);

    async move {
        let result = classify(&state, query).await;
        if let Err(err) = &result {
            err.log();
        }

        let response = match result {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(err) => err.into_response(),
        };
        metrics::counter!(
            "petal_requests_total",
            "status" => response.status().as_u16().to_string()
        )
        .increment(1);
        response
    }
    .instrument(span)
    .await
}

async fn classify(
    state: &AppState,
    query: Result<Query<IrisQuery>, QueryRejection>,
) -> Result<petal_core::ClassificationResponse, AppError> {
    if !state.pipeline.is_ready() {
        return Err(AppError::NotReady);
    }

    let Query(query) = query.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    let features = parse_features(query.data.as_deref())?;
    debug!(features = ?features.values(), "Classifying");

    let response = state.pipeline.classify(&features).await?;
    debug!(predicted = %response.predicted, "Classified");
    Ok(response)
}

/// Model readiness as JSON
async fn health_check(State(state): State<AppState>) -> Response {
    let status = state.model().status();
    let code = if status.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status)).into_response()
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics_handle {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => fallback().await.into_response(),
    }
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Error handling
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("model not ready")]
    NotReady,

    /// Malformed input; the detail is logged, callers get the fixed message
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Inference(Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        match self {
            AppError::NotReady => warn!("Rejected request: model not ready"),
            AppError::InvalidRequest(detail) => debug!(%detail, "Rejected invalid input"),
            AppError::Inference(err) => error!(error = %err, "Inference failed"),
        }
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotReady => AppError::NotReady,
            Error::Validation(msg) => AppError::InvalidRequest(msg),
            other => AppError::Inference(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            AppError::NotReady => "Model not ready",
            AppError::InvalidRequest(_) => VALIDATION_MESSAGE,
            AppError::Inference(_) => "Inference error",
        };

        (self.status(), message).into_response()
    }
}
