//! # Reasoning SDK
//!
//! Diagnostic reasoning core for oil-analysis failure predictions.
//!
//! This crate provides:
//!
//! - A static knowledge base mapping each failure class to its indicators,
//!   causes and solutions
//! - An ordered feature sample type
//! - A pure prompt renderer
//! - A narrow backend interface for generative text services, plus an
//!   OpenAI-compatible HTTP adapter
//! - The assembler tying these together
//!
//! ## Architecture
//!
//! - `KnowledgeBase`: immutable class → knowledge table, built once and shared
//! - `render_prompt`: turns a `PromptRequest` into the instruction string
//! - `GenerativeBackend`: "given a prompt and a temperature, return text"
//! - `ReasoningAssembler`: lookup → render → one backend call → `Explanation`
//! - `ReasoningError`: the caller-visible error taxonomy

pub mod error;
pub use error::{BackendError, BackendFailureKind, ReasoningError, Result};

pub mod config;
pub use config::{BackendConfig, ConfigProvider, ConfigProviderExt};

pub mod knowledge;
pub use knowledge::{DiagnosticKnowledge, FailureClass, KnowledgeBase};

pub mod sample;
pub use sample::Sample;

pub mod prompt;
pub use prompt::{render_prompt, PromptRequest};

pub mod backend;
pub use backend::{GenerativeBackend, OpenAiCompatibleBackend};

pub mod resilience;
pub use resilience::{RetryConfig, RetryingBackend};

pub mod explanation;
pub use explanation::Explanation;

pub mod assembler;
pub use assembler::{ReasoningAssembler, DETERMINISTIC_TEMPERATURE};

#[cfg(test)]
mod tests;
