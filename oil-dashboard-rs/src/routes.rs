//! HTTP routes of the dashboard service

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use once_cell::sync::Lazy;
use reasoning_sdk::{FailureClass, ReasoningAssembler, ReasoningError, Sample};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use crate::classifier::Classifier;
use crate::error::DashboardError;
use crate::prediction_log::PredictionLog;
use crate::wear_metals::{wear_metal_summary, WearMetalLevel};

pub static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub assembler: ReasoningAssembler,
    pub classifier: Option<Arc<dyn Classifier>>,
    pub prediction_log: Arc<PredictionLog>,
}

/// Explain request body (JSON)
///
/// The sample is kept as raw JSON and parsed on its own, so document order
/// is preserved and its errors surface as malformed samples.
#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    /// Predicted class; the classifier is asked when absent
    #[serde(default)]
    pub class: Option<String>,
    pub sample: Box<RawValue>,
}

/// Explain response body (JSON)
#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub class: String,
    pub explanation: String,
    pub complete: bool,
    pub missing_sections: Vec<&'static str>,
    pub wear_metals: Vec<WearMetalLevel>,
}

/// Prediction record request body (JSON)
#[derive(Debug, Deserialize)]
pub struct PredictionRequest {
    pub sample: Box<RawValue>,
    pub prediction: String,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub recorded: bool,
    pub prediction: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub service_name: String,
    pub uptime_seconds: u64,
    pub classifier_configured: bool,
    pub known_classes: Vec<&'static str>,
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, DashboardError> {
    serde_json::from_slice(body)
        .map_err(|e| DashboardError::BadRequest(format!("Invalid JSON body: {}", e)))
}

fn parse_sample(raw: &RawValue) -> Result<Sample, DashboardError> {
    serde_json::from_str(raw.get())
        .map_err(|e| ReasoningError::malformed_sample(e.to_string()).into())
}

/// Build the service router
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/explain", post(explain_handler))
        .route("/api/v1/predictions", post(record_prediction_handler))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// GET /health - Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        service_name: "oil-dashboard".to_string(),
        uptime_seconds: START_TIME.elapsed().as_secs(),
        classifier_configured: state.classifier.is_some(),
        known_classes: state
            .assembler
            .knowledge()
            .iter()
            .map(|entry| entry.class().as_str())
            .collect(),
    })
}

/// POST /api/v1/explain - Explain a (possibly classifier-supplied) prediction
async fn explain_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ExplainResponse>, DashboardError> {
    let request: ExplainRequest = parse_body(&body)?;
    let sample = parse_sample(&request.sample)?;

    let class = match request.class {
        Some(class) => class,
        None => {
            let classifier = state.classifier.as_ref().ok_or_else(|| {
                DashboardError::BadRequest(
                    "no class given and no classifier configured".to_string(),
                )
            })?;
            classifier.predict(&sample).await?.as_str().to_string()
        }
    };

    log::info!("Explain request: class={}, features={}", class, sample.len());

    let explanation = state.assembler.explain(&class, &sample).await?;
    let missing_sections = explanation.missing_sections();
    if !missing_sections.is_empty() {
        log::warn!("Explanation for {} lacks sections: {:?}", class, missing_sections);
    }

    Ok(Json(ExplainResponse {
        complete: missing_sections.is_empty(),
        missing_sections,
        wear_metals: wear_metal_summary(&sample),
        explanation: explanation.into_text(),
        class,
    }))
}

/// POST /api/v1/predictions - Append a (sample, prediction) row to the log
async fn record_prediction_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<PredictionResponse>), DashboardError> {
    let request: PredictionRequest = parse_body(&body)?;
    let sample = parse_sample(&request.sample)?;
    let prediction: FailureClass = request.prediction.parse()?;

    let log = Arc::clone(&state.prediction_log);
    tokio::task::spawn_blocking(move || log.append(&sample, prediction))
        .await
        .map_err(|e| DashboardError::Persistence(format!("write task failed: {}", e)))??;

    Ok((
        StatusCode::CREATED,
        Json(PredictionResponse {
            recorded: true,
            prediction: prediction.as_str().to_string(),
        }),
    ))
}
