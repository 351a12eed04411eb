//! HTTP API for price estimates, option domains, health checks and metrics

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use estimator_lib::{
    health::{ComponentStatus, HealthRegistry},
    EstimateResponse, ErrorKind, PriceEstimator, RawSpecInput, StructuredLogger,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub estimator: Arc<PriceEstimator>,
    pub health_registry: HealthRegistry,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        estimator: Arc<PriceEstimator>,
        health_registry: HealthRegistry,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            estimator,
            health_registry,
            logger,
        }
    }
}

/// Estimate a price - 200 on success, 422 for invalid input (400 for bad
/// JSON syntax), 500 when the pipeline fails. The body is always an
/// `EstimateResponse`, including for bodies that do not deserialize.
async fn estimate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawSpecInput>, JsonRejection>,
) -> (StatusCode, Json<EstimateResponse>) {
    let raw = match payload {
        Ok(Json(raw)) => raw,
        Err(rejection) => {
            let message = rejection.body_text();
            state
                .logger
                .log_rejection(ErrorKind::DomainError.as_str(), &message);
            return (
                rejection.status(),
                Json(EstimateResponse::failure(ErrorKind::DomainError, message)),
            );
        }
    };

    let start = Instant::now();
    // Runs to completion without yielding, so estimates never interleave
    let response = state.estimator.estimate_price(&raw);
    let latency_ms = start.elapsed().as_millis();

    let status_code = match (response.error_kind, response.price_value) {
        (None, Some(price_value)) => {
            state.logger.log_estimate(
                &raw.company,
                &raw.type_name,
                price_value,
                response.ppi_was_defaulted.unwrap_or(false),
                latency_ms,
            );
            state.health_registry.record_inference_success().await;
            StatusCode::OK
        }
        (Some(ErrorKind::DomainError), _) => {
            let message = response.message.as_deref().unwrap_or_default();
            state
                .logger
                .log_rejection(ErrorKind::DomainError.as_str(), message);
            StatusCode::UNPROCESSABLE_ENTITY
        }
        _ => {
            let message = response.message.as_deref().unwrap_or_default();
            state
                .logger
                .log_rejection(ErrorKind::InferenceError.as_str(), message);
            state.health_registry.record_inference_failure(message).await;
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status_code, Json(response))
}

/// Selectable values for every enumerated field
async fn options(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.estimator.domains().clone())
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still serving
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/estimate", post(estimate))
        .route("/api/v1/options", get(options))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
