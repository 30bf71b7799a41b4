use crate::errors::AppError;
use crate::models::{PredictionResponse, RawInput, SchemaResponse, FEATURE_COLUMNS};
use crate::services::ScoringService;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Scoring pipeline holding the loaded classifier.
    pub scorer: ScoringService,
}

/// Health check endpoint.
///
/// Returns the service status, version and the loaded model name.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy"))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "credit-risk-api",
            "version": env!("CARGO_PKG_VERSION"),
            "model": state.scorer.model_name(),
        })),
    )
}

/// POST /api/v1/predict
///
/// Scores one loan applicant and returns the default probability and risk category.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `payload` - JSON body with the eight applicant attributes, or the reason it failed to parse.
///
/// # Returns
///
/// * `Result<Json<PredictionResponse>, AppError>` - The prediction or an error.
#[utoipa::path(
    post,
    path = "/api/v1/predict",
    request_body = RawInput,
    responses(
        (status = 200, description = "Applicant scored", body = PredictionResponse),
        (status = 400, description = "Input outside the accepted domain"),
        (status = 500, description = "Classifier or schema failure")
    )
)]
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawInput>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let request_id = Uuid::new_v4();

    // Type errors (e.g. a fractional credit_length) get the same envelope as range errors
    let Json(input) = payload.map_err(|rejection| {
        tracing::warn!("Prediction {} rejected: {}", request_id, rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    })?;

    let result = state.scorer.score(&input).map_err(|e| {
        tracing::warn!("Prediction {} failed: {}", request_id, e);
        e
    })?;

    tracing::info!(
        "Prediction {}: probability={:.4} risk={}",
        request_id,
        result.probability,
        result.risk
    );

    Ok(Json(PredictionResponse {
        request_id,
        probability: result.probability,
        probability_percent: result.probability_percent(),
        risk_category: result.risk,
        model: state.scorer.model_name().to_string(),
        scored_at: Utc::now(),
    }))
}

/// GET /api/v1/schema
///
/// Lists the feature row columns in order and the placeholder values in use.
#[utoipa::path(
    get,
    path = "/api/v1/schema",
    responses((status = 200, description = "Feature schema", body = SchemaResponse))
)]
pub async fn feature_schema(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    Json(SchemaResponse {
        columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        defaults: state.scorer.builder().defaults().clone(),
    })
}
