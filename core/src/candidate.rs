//! Candidate types produced by the host conversion pipeline.
//!
//! This module provides:
//! - `Candidate`: a single conversion candidate with kind, span and quality
//! - `CandidateKind`: the closed set of candidate origins

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Where a candidate came from.
///
/// Filters that only reason about single characters use this to keep
/// composed sentences out of their matching logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    /// Single character or plain table entry
    #[default]
    Normal,
    /// Multi-character dictionary word
    Phrase,
    /// Entry learned from the user dictionary
    User,
    /// Completion of an incomplete code
    Completion,
    /// Sentence composed from several dictionary entries
    Sentence,
}

impl CandidateKind {
    /// Whether this candidate is a composed, sentence-level result.
    pub fn is_sentence(self) -> bool {
        matches!(self, Self::Sentence)
    }
}

/// A single text candidate.
///
/// `span` is a byte range into the raw input buffer that the candidate
/// converts. `quality` is a relative weight; higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub kind: CandidateKind,
    pub span: Range<usize>,
    pub quality: f64,
}

impl Candidate {
    pub fn new<T: Into<String>>(text: T, quality: f64) -> Self {
        Candidate {
            text: text.into(),
            kind: CandidateKind::Normal,
            span: 0..0,
            quality,
        }
    }

    pub fn with_kind(mut self, kind: CandidateKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.span = span;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let c = Candidate::new("你好", 3.0)
            .with_kind(CandidateKind::Phrase)
            .with_span(0..5);
        assert_eq!(c.text, "你好");
        assert_eq!(c.kind, CandidateKind::Phrase);
        assert_eq!(c.span, 0..5);
    }

    #[test]
    fn defaults_to_normal_kind() {
        let c = Candidate::new("我", 1.0);
        assert_eq!(c.kind, CandidateKind::Normal);
        assert!(!c.kind.is_sentence());
        assert!(CandidateKind::Sentence.is_sentence());
    }
}
