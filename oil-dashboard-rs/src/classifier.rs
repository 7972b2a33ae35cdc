//! External classifier client
//!
//! The dashboard does not classify samples itself. When an explain request
//! carries no class, the sample is sent to the classifier service and its
//! label is validated against the known failure classes.

use std::time::Duration;

use async_trait::async_trait;
use reasoning_sdk::{FailureClass, Sample};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Produces a predicted failure class for a sample
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn predict(&self, sample: &Sample) -> Result<FailureClass, DashboardError>;
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    features: &'a Sample,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    prediction: String,
}

/// Classifier reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    http_client: Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DashboardError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DashboardError::ClassifierUnavailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn predict(&self, sample: &Sample) -> Result<FailureClass, DashboardError> {
        log::debug!("Requesting prediction from {} ({} features)", self.url, sample.len());

        let response = self
            .http_client
            .post(&self.url)
            .json(&PredictRequest { features: sample })
            .send()
            .await
            .map_err(|e| DashboardError::ClassifierUnavailable(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::ClassifierUnavailable(format!(
                "Classifier returned {}: {}",
                status, body
            )));
        }

        let body: PredictResponse = response.json().await.map_err(|e| {
            DashboardError::ClassifierUnavailable(format!("Failed to parse prediction: {}", e))
        })?;

        let class = body.prediction.trim().parse::<FailureClass>()?;
        log::info!("Classifier predicted {}", class);
        Ok(class)
    }
}
