//! Diagnostic reasoning assembler
//!
//! Resolves the predicted class to its knowledge entry, renders the prompt
//! and makes exactly one backend call. Holds no per-call mutable state, so a
//! single assembler can serve concurrent requests.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::backend::GenerativeBackend;
use crate::error::Result;
use crate::explanation::Explanation;
use crate::knowledge::KnowledgeBase;
use crate::prompt::{render_prompt, PromptRequest};
use crate::sample::Sample;

/// Decoding temperature for every backend call
pub const DETERMINISTIC_TEMPERATURE: f32 = 0.0;

/// Turns (predicted class, sample) pairs into explanations
#[derive(Clone)]
pub struct ReasoningAssembler {
    knowledge: Arc<KnowledgeBase>,
    backend: Arc<dyn GenerativeBackend>,
}

impl ReasoningAssembler {
    pub fn new(knowledge: Arc<KnowledgeBase>, backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { knowledge, backend }
    }

    /// The shared knowledge base
    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Render the prompt for a request without calling the backend
    pub fn prepare(&self, label: &str, sample: &Sample) -> Result<String> {
        let knowledge = self.knowledge.lookup(label)?;
        let request = PromptRequest::new(label, sample, knowledge);
        Ok(render_prompt(&request))
    }

    /// Explain a prediction
    ///
    /// Fails with `UnknownClass` before any network I/O when the label is not
    /// a known failure class, and with `BackendUnavailable` when the single
    /// backend call fails. Nothing is retried.
    pub async fn explain(&self, label: &str, sample: &Sample) -> Result<Explanation> {
        let prompt = self.prepare(label, sample).map_err(|err| {
            warn!("Cannot assemble reasoning for class {:?}: {}", label, err);
            err
        })?;
        debug!("Rendered prompt for class {} ({} bytes)", label, prompt.len());

        let text = self
            .backend
            .complete(&prompt, DETERMINISTIC_TEMPERATURE)
            .await
            .map_err(|err| {
                warn!("Backend failed to explain class {}: {}", label, err);
                err
            })?;

        info!("Explanation produced for class {} ({} bytes)", label, text.len());
        Ok(Explanation::new(text))
    }
}
