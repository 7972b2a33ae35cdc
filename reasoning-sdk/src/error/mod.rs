//! Error handling for the Reasoning SDK
//!
//! This module provides the caller-visible error taxonomy:
//! - `UnknownClass` when a predicted label has no knowledge entry
//! - `BackendUnavailable` for every failure of the generative backend
//! - `MalformedSample` for samples that cannot be rendered
//! - `Configuration` for invalid settings or knowledge tables
//!
//! Backend failures carry a `BackendFailureKind` so a caller can decide how
//! to degrade, but they all surface through the single `BackendUnavailable`
//! category.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub mod mapping;

/// Result type for Reasoning SDK operations
pub type Result<T> = std::result::Result<T, ReasoningError>;

/// Main error type for the Reasoning SDK
#[derive(Error, Debug)]
pub enum ReasoningError {
    /// The predicted class is not part of the fixed failure class set
    #[error("Unknown failure class: {label}")]
    UnknownClass { label: String },

    /// The generative backend could not produce an explanation
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(#[from] BackendError),

    /// The sample cannot be rendered into a prompt
    #[error("Malformed sample: {0}")]
    MalformedSample(String),

    /// Invalid configuration or knowledge table
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ReasoningError {
    /// Create an unknown class error
    pub fn unknown_class(label: impl Into<String>) -> Self {
        ReasoningError::UnknownClass {
            label: label.into(),
        }
    }

    /// Create a malformed sample error
    pub fn malformed_sample(message: impl Into<String>) -> Self {
        ReasoningError::MalformedSample(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        ReasoningError::Configuration(message.into())
    }

    /// The backend failure, if this error came from the backend
    pub fn backend_failure(&self) -> Option<&BackendError> {
        match self {
            ReasoningError::BackendUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

/// What went wrong while talking to the generative backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendFailureKind {
    /// Connection refused, reset, DNS failure
    Network,
    /// The request exceeded the configured timeout
    Timeout,
    /// Missing, invalid or rejected credentials
    Authentication,
    /// Quota or rate limit exhausted
    RateLimit,
    /// The service answered with an error status
    Service,
    /// The service answered but the body was unusable
    MalformedResponse,
    /// The adapter itself is misconfigured
    Configuration,
}

impl BackendFailureKind {
    /// Stable snake_case code, used in logs and API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Authentication => "authentication",
            Self::RateLimit => "rate_limit",
            Self::Service => "service",
            Self::MalformedResponse => "malformed_response",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for BackendFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "Network",
            Self::Timeout => "Timeout",
            Self::Authentication => "Authentication",
            Self::RateLimit => "Rate limit",
            Self::Service => "Service",
            Self::MalformedResponse => "Malformed response",
            Self::Configuration => "Configuration",
        };
        write!(f, "{}", label)
    }
}

/// A failed call to the generative backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error: {message}")]
pub struct BackendError {
    /// Failure category
    pub kind: BackendFailureKind,

    /// Human readable detail
    pub message: String,

    /// HTTP status code, when the service answered
    pub status_code: Option<u16>,
}

impl BackendError {
    /// Create a backend error of the given kind
    pub fn new(kind: BackendFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendFailureKind::Network, message)
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(BackendFailureKind::Timeout, message)
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(BackendFailureKind::Authentication, message)
    }

    /// Create a rate limit error
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(BackendFailureKind::RateLimit, message)
    }

    /// Create a service error
    pub fn service(message: impl Into<String>) -> Self {
        Self::new(BackendFailureKind::Service, message)
    }

    /// Create a malformed response error
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::new(BackendFailureKind::MalformedResponse, message)
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(BackendFailureKind::Configuration, message)
    }

    /// Attach the HTTP status code
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Check if this failure is transient.
    ///
    /// Only consulted by `RetryingBackend`; the assembler never retries.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            BackendFailureKind::Network
            | BackendFailureKind::Timeout
            | BackendFailureKind::RateLimit => true,
            BackendFailureKind::Service => {
                matches!(self.status_code, Some(500..=599) | None)
            }
            _ => false,
        }
    }
}

/// Convert reqwest errors to BackendError
impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        let backend_error = if err.is_timeout() {
            BackendError::timeout(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            BackendError::network(format!("Connection error: {}", err))
        } else if err.is_redirect() {
            BackendError::network(format!("Too many redirects: {}", err))
        } else if err.is_decode() {
            BackendError::malformed_response(format!("Response decode error: {}", err))
        } else if err.is_builder() {
            BackendError::configuration(format!("Invalid request: {}", err))
        } else {
            BackendError::network(format!("HTTP client error: {}", err))
        };

        match err.status() {
            Some(status) => backend_error.with_status(status.as_u16()),
            None => backend_error,
        }
    }
}
