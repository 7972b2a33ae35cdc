//! Explanation returned by the generative backend
//!
//! The text is passed through verbatim. `missing_sections` is an advisory
//! structural check a caller may use for presentation; the assembler never
//! rejects a response because of it.

use std::fmt;

use serde::Serialize;

use crate::prompt::SECTIONS;

/// Free-form explanation text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Explanation {
    text: String,
}

impl Explanation {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The backend response, unmodified
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Section headers the backend did not produce
    ///
    /// Matching is case-insensitive and ignores markdown decoration, so
    /// `**The Observation:**` and `## the observation` both count.
    pub fn missing_sections(&self) -> Vec<&'static str> {
        let lines: Vec<String> = self.text.lines().map(normalize_heading).collect();

        SECTIONS
            .iter()
            .map(|section| section.header)
            .filter(|header| {
                let wanted = header.to_lowercase();
                !lines.iter().any(|line| line.starts_with(&wanted))
            })
            .collect()
    }

    /// Whether all four sections are present
    pub fn is_complete(&self) -> bool {
        self.missing_sections().is_empty()
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn normalize_heading(line: &str) -> String {
    line.trim()
        .trim_start_matches(|c: char| c == '#' || c == '*' || c == '_' || c.is_whitespace())
        .to_lowercase()
}
