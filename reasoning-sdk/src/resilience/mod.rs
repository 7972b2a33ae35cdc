//! Opt-in retry for generative backends
//!
//! The assembler never retries on its own. A host that wants bounded retries
//! wraps its backend in `RetryingBackend`, which retries transient failures
//! (network, timeout, rate limit, 5xx) with exponential backoff. The default
//! `RetryConfig` performs no retries at all.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;

use crate::backend::GenerativeBackend;
use crate::error::BackendError;

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 means no retries)
    pub max_retries: u32,

    /// Initial backoff duration
    pub initial_interval: Duration,

    /// Maximum backoff duration
    pub max_interval: Duration,

    /// Multiplier for backoff between retries
    pub multiplier: f64,

    /// Randomization applied to each interval
    pub randomization_factor: f64,

    /// Maximum total time to spend retrying
    pub max_elapsed_time: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(10),
            multiplier: 2.0,
            randomization_factor: 0.2,
            max_elapsed_time: Some(Duration::from_secs(60)),
        }
    }
}

impl fmt::Display for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RetryConfig {{ max_retries: {}, initial_interval: {:?}, max_interval: {:?} }}",
            self.max_retries, self.initial_interval, self.max_interval
        )
    }
}

impl RetryConfig {
    /// Whether this policy ever retries
    pub fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_interval,
            current_interval: self.initial_interval,
            max_interval: self.max_interval,
            multiplier: self.multiplier,
            randomization_factor: self.randomization_factor,
            max_elapsed_time: self.max_elapsed_time,
            ..ExponentialBackoff::default()
        }
    }
}

/// Backend decorator adding bounded retries
pub struct RetryingBackend<B> {
    inner: B,
    config: RetryConfig,
}

impl<B: GenerativeBackend> RetryingBackend<B> {
    pub fn new(inner: B, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn into_inner(self) -> B {
        self.inner
    }
}

#[async_trait]
impl<B: GenerativeBackend> GenerativeBackend for RetryingBackend<B> {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, BackendError> {
        let mut backoff = self.config.backoff();
        let mut attempts = 0;

        loop {
            match self.inner.complete(prompt, temperature).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && attempts < self.config.max_retries => {
                    match backoff.next_backoff() {
                        Some(delay) => {
                            attempts += 1;
                            log::warn!(
                                "Backend call failed, retrying in {:?} (attempt {}/{}): {}",
                                delay,
                                attempts,
                                self.config.max_retries,
                                err
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => return Err(err),
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockGenerativeBackend;
    use crate::error::BackendFailureKind;

    fn fast_retries(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(20),
            ..RetryConfig::default()
        }
    }

    #[test]
    fn test_default_policy_is_disabled() {
        assert!(!RetryConfig::default().is_enabled());
    }

    #[tokio::test]
    async fn test_default_policy_calls_once() {
        let mut mock = MockGenerativeBackend::new();
        mock.expect_complete()
            .times(1)
            .returning(|_, _| Err(BackendError::network("connection reset")));

        let backend = RetryingBackend::new(mock, RetryConfig::default());
        let err = backend.complete("prompt", 0.0).await.unwrap_err();
        assert_eq!(err.kind, BackendFailureKind::Network);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let mut mock = MockGenerativeBackend::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_complete()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(BackendError::rate_limit("slow down")));
        mock.expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok("The Observation: fine".to_string()));

        let backend = RetryingBackend::new(mock, fast_retries(3));
        assert_eq!(backend.complete("prompt", 0.0).await.unwrap(), "The Observation: fine");
    }

    #[tokio::test]
    async fn test_permanent_failures_are_not_retried() {
        let mut mock = MockGenerativeBackend::new();
        mock.expect_complete()
            .times(1)
            .returning(|_, _| Err(BackendError::authentication("bad key").with_status(401)));

        let backend = RetryingBackend::new(mock, fast_retries(3));
        let err = backend.complete("prompt", 0.0).await.unwrap_err();
        assert_eq!(err.kind, BackendFailureKind::Authentication);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let mut mock = MockGenerativeBackend::new();
        mock.expect_complete()
            .times(3)
            .returning(|_, _| Err(BackendError::timeout("timed out")));

        let backend = RetryingBackend::new(mock, fast_retries(2));
        assert!(backend.complete("prompt", 0.0).await.is_err());
    }
}
