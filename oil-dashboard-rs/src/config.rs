//! Dashboard configuration, read from `OIL_DASHBOARD_*` variables

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::DashboardError;

/// Service name used for `<NAME>_SERVICE_ADDR` / `<NAME>_SERVICE_PORT`
pub const SERVICE_NAME: &str = "OIL_DASHBOARD";

/// Default CSV file for recorded predictions
pub const DEFAULT_PREDICTION_LOG: &str = "prediction_result.csv";

/// Default timeout for classifier calls
pub const DEFAULT_CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request body limit (64 KiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,

    /// External classifier endpoint; explain requests must name a class when unset
    pub classifier_url: Option<String>,

    /// Timeout for classifier calls
    pub classifier_timeout: Duration,

    /// CSV file receiving (sample, prediction) rows
    pub prediction_log_path: PathBuf,

    /// Optional TOML knowledge table replacing the built-in one
    pub knowledge_path: Option<PathBuf>,

    /// Maximum accepted request body size
    pub max_body_bytes: usize,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, DashboardError> {
        let default_port = config_rs::get_default_port(SERVICE_NAME);

        let classifier_timeout = match parse_env::<u64>("OIL_DASHBOARD_CLASSIFIER_TIMEOUT_SECONDS")? {
            Some(0) => {
                return Err(DashboardError::Configuration(
                    "OIL_DASHBOARD_CLASSIFIER_TIMEOUT_SECONDS must be positive".to_string(),
                ))
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_CLASSIFIER_TIMEOUT,
        };

        let max_body_bytes =
            parse_env::<usize>("OIL_DASHBOARD_MAX_BODY_BYTES")?.unwrap_or(DEFAULT_MAX_BODY_BYTES);

        Ok(Self {
            bind_addr: config_rs::get_bind_address(SERVICE_NAME, default_port),
            classifier_url: config_rs::get_optional_env("OIL_DASHBOARD_CLASSIFIER_URL"),
            classifier_timeout,
            prediction_log_path: PathBuf::from(config_rs::get_env_or(
                "OIL_DASHBOARD_PREDICTION_LOG",
                DEFAULT_PREDICTION_LOG,
            )),
            knowledge_path: config_rs::get_optional_env("OIL_DASHBOARD_KNOWLEDGE_PATH")
                .map(PathBuf::from),
            max_body_bytes,
        })
    }
}

/// Parse an optional variable; unset is `None`, unparseable is an error
pub fn parse_env<T>(name: &str) -> Result<Option<T>, DashboardError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match config_rs::get_optional_env(name) {
        Some(value) => value.parse::<T>().map(Some).map_err(|e| {
            DashboardError::Configuration(format!("Invalid value {:?} in {}: {}", value, name, e))
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env() {
        std::env::set_var("OIL_DASHBOARD_TEST_LIMIT", "4096");
        assert_eq!(parse_env::<usize>("OIL_DASHBOARD_TEST_LIMIT").unwrap(), Some(4096));

        std::env::remove_var("OIL_DASHBOARD_TEST_UNSET");
        assert_eq!(parse_env::<usize>("OIL_DASHBOARD_TEST_UNSET").unwrap(), None);
    }

    #[test]
    fn test_unparseable_env_is_a_configuration_error() {
        std::env::set_var("OIL_DASHBOARD_TEST_TIMEOUT", "ten");
        let err = parse_env::<u64>("OIL_DASHBOARD_TEST_TIMEOUT").unwrap_err();

        assert!(matches!(err, DashboardError::Configuration(_)));
        assert!(err.to_string().contains("OIL_DASHBOARD_TEST_TIMEOUT"));
    }

    #[test]
    fn test_from_env_rejects_bad_classifier_timeout() {
        for value in ["ten", "0"] {
            std::env::set_var("OIL_DASHBOARD_CLASSIFIER_TIMEOUT_SECONDS", value);
            assert!(matches!(
                DashboardConfig::from_env(),
                Err(DashboardError::Configuration(_))
            ));
        }
        std::env::remove_var("OIL_DASHBOARD_CLASSIFIER_TIMEOUT_SECONDS");
    }
}
