//! oil-dashboard-rs/lib.rs
//! Host service for the oil-analysis diagnostic reasoning core
//!
//! Exposes the reasoning assembler over HTTP, obtains predictions from an
//! external classifier when the caller does not supply one, and records
//! (sample, prediction) rows to a CSV log.

pub mod classifier;
pub mod config;
pub mod error;
pub mod prediction_log;
pub mod routes;
pub mod wear_metals;

pub use classifier::{Classifier, HttpClassifier};
pub use config::DashboardConfig;
pub use error::DashboardError;
pub use prediction_log::PredictionLog;
pub use routes::{router, AppState};
