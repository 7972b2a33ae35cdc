//! Dashboard error type and its HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reasoning_sdk::ReasoningError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// Errors raised by the reasoning core
    #[error(transparent)]
    Reasoning(#[from] ReasoningError),

    /// The external classifier could not produce a prediction
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// The prediction log could not be written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Invalid service settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request body could not be understood
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON body returned for every error
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    /// Machine-readable category, e.g. `unknown_class` or `backend_unavailable`
    pub kind: &'static str,
    /// Backend failure detail, when the backend was at fault
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_failure: Option<&'static str>,
}

impl DashboardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::Reasoning(ReasoningError::UnknownClass { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DashboardError::Reasoning(ReasoningError::MalformedSample(_)) => StatusCode::BAD_REQUEST,
            DashboardError::Reasoning(ReasoningError::BackendUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            DashboardError::Reasoning(ReasoningError::Configuration(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DashboardError::ClassifierUnavailable(_) => StatusCode::BAD_GATEWAY,
            DashboardError::Persistence(_) | DashboardError::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DashboardError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::Reasoning(ReasoningError::UnknownClass { .. }) => "unknown_class",
            DashboardError::Reasoning(ReasoningError::MalformedSample(_)) => "malformed_sample",
            DashboardError::Reasoning(ReasoningError::BackendUnavailable(_)) => "backend_unavailable",
            DashboardError::Reasoning(ReasoningError::Configuration(_)) => "configuration",
            DashboardError::ClassifierUnavailable(_) => "classifier_unavailable",
            DashboardError::Persistence(_) => "persistence",
            DashboardError::Configuration(_) => "configuration",
            DashboardError::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::warn!("Request rejected: {}", self);
        }

        let backend_failure = match &self {
            DashboardError::Reasoning(err) => err.backend_failure().map(|f| f.kind.code()),
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
            kind: self.kind(),
            backend_failure,
        };

        (status, Json(body)).into_response()
    }
}
