//! OpenAI-compatible chat completions backend
//!
//! Submits a rendered prompt as a single user message and returns the first
//! choice's content verbatim. One HTTP request per call: no retries and an
//! explicit request timeout taken from `BackendConfig`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{header, Client};

use super::models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use super::GenerativeBackend;
use crate::config::{BackendConfig, ConfigProvider, DEFAULT_PROVIDER};
use crate::error::{mapping, BackendError, ReasoningError, Result};

/// User agent sent to the backend
const USER_AGENT: &str = concat!("oil-reasoning/", env!("CARGO_PKG_VERSION"), " (reasoning-sdk)");

/// Upper bound on generated tokens; the four sections fit comfortably
const MAX_TOKENS: u32 = 1000;

/// HTTP adapter for OpenAI-compatible chat completion services
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleBackend {
    http_client: Client,
    config: BackendConfig,
}

impl OpenAiCompatibleBackend {
    /// Create a backend from an explicit configuration
    pub fn new(config: BackendConfig) -> Result<Self> {
        config.validate()?;
        let http_client = build_http_client(config.timeout())?;

        info!(
            "Generative backend configured: {} (model: {}, timeout: {}s)",
            config.base_url, config.model, config.timeout_seconds
        );

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create a backend from the `OIL_BACKEND_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(BackendConfig::from_env()?)
    }

    /// Create a new builder
    pub fn builder() -> OpenAiCompatibleBackendBuilder {
        OpenAiCompatibleBackendBuilder::default()
    }

    /// The active configuration
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    async fn send(&self, request: &ChatCompletionRequest) -> std::result::Result<String, BackendError> {
        let url = self.endpoint();
        debug!("Sending chat completion: POST {} (model: {})", url, request.model);

        let start_time = Instant::now();
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(BackendError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => format!("Failed to read error response: {}", e),
            };
            return Err(mapping::map_http_error(status, &body));
        }

        let data: ChatCompletionResponse = response.json().await.map_err(|e| {
            BackendError::malformed_response(format!("Failed to parse response: {}", e))
                .with_status(status.as_u16())
        })?;

        if let Some(usage) = &data.usage {
            info!(
                "Chat completion finished in {:?}; used {} tokens",
                start_time.elapsed(),
                usage.total_tokens
            );
        }

        let content = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::malformed_response("No completion choices returned"))?
            .message
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| BackendError::malformed_response("Empty completion response"))?;

        Ok(content)
    }
}

#[async_trait]
impl GenerativeBackend for OpenAiCompatibleBackend {
    async fn complete(&self, prompt: &str, temperature: f32) -> std::result::Result<String, BackendError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature,
            max_tokens: Some(MAX_TOKENS),
        };

        self.send(&request).await.map_err(|err| {
            error!("Chat completion against {} failed: {}", self.config.base_url, err);
            err
        })
    }
}

fn build_http_client(timeout: Duration) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .gzip(true)
        .build()
        .map_err(|e| ReasoningError::configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Builder for the OpenAI-compatible backend
#[derive(Default)]
pub struct OpenAiCompatibleBackendBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_seconds: Option<u64>,
}

impl OpenAiCompatibleBackendBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the timeout in seconds
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Build the backend
    ///
    /// Settings from the `OIL_BACKEND_*` environment variables are used as a
    /// base and overridden by anything set explicitly on the builder.
    pub fn build(self) -> Result<OpenAiCompatibleBackend> {
        self.build_with(&**DEFAULT_PROVIDER)
    }

    /// Build the backend on top of settings read from `provider`
    pub fn build_with<P: ConfigProvider + ?Sized>(self, provider: &P) -> Result<OpenAiCompatibleBackend> {
        let mut config = BackendConfig::endpoint_from_provider(provider)?;

        if let Some(api_key) = self.api_key {
            config.api_key = api_key;
        }

        if let Some(base_url) = self.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(model) = self.model {
            config.model = model;
        }

        if let Some(timeout) = self.timeout_seconds {
            if timeout == 0 {
                return Err(ReasoningError::configuration("Timeout must be positive"));
            }
            config.timeout_seconds = timeout;
        }

        OpenAiCompatibleBackend::new(config)
    }
}
