//! Generative backend interface
//!
//! The assembler only needs one capability from a text service: given a
//! prompt and a decoding temperature, return text. Keeping that behind a
//! trait lets the knowledge base and renderer stay network-free, and lets
//! tests substitute echo or failing backends.

mod models;
mod openai;

pub use models::*;
pub use openai::{OpenAiCompatibleBackend, OpenAiCompatibleBackendBuilder};

use async_trait::async_trait;

use crate::error::BackendError;

#[cfg(test)]
use mockall::automock;

/// A service that completes prompts
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Submit a prompt and return the raw, unparsed response text
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, BackendError>;
}
