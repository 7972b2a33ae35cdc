//! Prompt rendering
//!
//! Pure formatting of a `PromptRequest` into the instruction string sent to
//! the generative backend. No I/O and no shared state; identical inputs
//! always produce byte-identical prompts.

use crate::knowledge::DiagnosticKnowledge;
use crate::sample::Sample;

/// Role statement opening every prompt
pub const ROLE_STATEMENT: &str = "Role: You are a maintenance diagnostic assistant with expertise in \
interpreting oil analysis data to diagnose mechanical system conditions.";

/// One required section of the explanation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    /// Header the backend must use verbatim
    pub header: &'static str,
    /// Question the section answers
    pub question: &'static str,
    /// Word ceiling for the section
    pub max_words: u32,
}

/// The four sections, in the order they must appear
pub const SECTIONS: [SectionSpec; 4] = [
    SectionSpec {
        header: "The Observation",
        question: "What led to this diagnosis? Explain the indicators in the sample that support it.",
        max_words: 30,
    },
    SectionSpec {
        header: "Investigation Points",
        question: "What causes should be investigated?",
        max_words: 30,
    },
    SectionSpec {
        header: "The Solution",
        question: "What are the possible solutions based on the suggested causes?",
        max_words: 50,
    },
    SectionSpec {
        header: "Story",
        question: "A short paragraph combining every section above into one narrative.",
        max_words: 75,
    },
];

/// Inputs to a single prompt; built fresh per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    /// Predicted class label
    pub class: String,
    /// Rendered sample, e.g. `Fe: 5, Cu: 2`
    pub sample: String,
    /// Retrieved knowledge text
    pub knowledge: String,
}

impl PromptRequest {
    /// Build a request from typed inputs
    pub fn new(class: impl Into<String>, sample: &Sample, knowledge: &DiagnosticKnowledge) -> Self {
        Self {
            class: class.into(),
            sample: sample.render(),
            knowledge: knowledge.text().to_string(),
        }
    }
}

/// Render the instruction string for the generative backend
pub fn render_prompt(request: &PromptRequest) -> String {
    let mut prompt = String::with_capacity(
        ROLE_STATEMENT.len() + request.sample.len() + request.knowledge.len() + 1024,
    );

    prompt.push_str(ROLE_STATEMENT);
    prompt.push_str("\n\n");

    prompt.push_str(
        "Task: Using the oil sample, (a) explain the indicators that support the diagnosis, \
(b) list the points that should be investigated, (c) recommend solutions, and \
(d) write a short narrative combining all of the above.\n\n",
    );

    prompt.push_str(&format!(
        "Context: The oil analysis has been preliminarily diagnosed as {}. \
You are provided with the following oil sample report to evaluate this diagnosis:\n\n{}\n\n",
        request.class, request.sample
    ));

    prompt.push_str(&format!(
        "Support the reasoning for the diagnosis using this reference knowledge:\n\n{}\n\n",
        request.knowledge
    ));

    prompt.push_str(
        "Format: Fill in the following sections, using each header name exactly as written:\n",
    );
    for (position, section) in SECTIONS.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. {} (header name = {}) ({} words at most)\n",
            position + 1,
            section.question,
            section.header,
            section.max_words
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{FailureClass, KnowledgeBase};

    fn request(class: FailureClass) -> PromptRequest {
        let kb = KnowledgeBase::builtin();
        let sample = Sample::from_pairs([("Fe", 5.0), ("Cu", 2.0)]).unwrap();
        PromptRequest::new(class.as_str(), &sample, kb.get(class))
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let req = request(FailureClass::SludgeFormation);
        let first = render_prompt(&req);
        let second = render_prompt(&req.clone());
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_headers_and_word_limits_are_present() {
        let prompt = render_prompt(&request(FailureClass::WaterContamination));

        assert!(prompt.contains("(header name = The Observation) (30 words at most)"));
        assert!(prompt.contains("(header name = Investigation Points) (30 words at most)"));
        assert!(prompt.contains("(header name = The Solution) (50 words at most)"));
        assert!(prompt.contains("(header name = Story) (75 words at most)"));
    }

    #[test]
    fn test_context_carries_class_sample_and_knowledge() {
        let req = request(FailureClass::Normal);
        let prompt = render_prompt(&req);

        assert!(prompt.starts_with(ROLE_STATEMENT));
        assert!(prompt.contains("preliminarily diagnosed as normal."));
        assert!(prompt.contains("\n\nFe: 5, Cu: 2\n\n"));
        assert!(prompt.contains(&req.knowledge));
        assert!(prompt.contains("Continue scheduled monitoring"));
    }

    #[test]
    fn test_sections_appear_in_order() {
        let prompt = render_prompt(&request(FailureClass::DirtInOil));
        let positions: Vec<usize> = SECTIONS
            .iter()
            .map(|s| prompt.find(&format!("header name = {}", s.header)).unwrap())
            .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
