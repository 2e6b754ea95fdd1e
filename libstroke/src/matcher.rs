//! Candidate classification against a stroke code.

use crate::parser::StrokeCode;
use libstroke_core::utils::first_grapheme;
use libstroke_core::{Candidate, StrokeLookup};

/// Whether any whitespace-separated variant in `variants` starts with `code`.
pub fn variants_match(variants: &str, code: &StrokeCode) -> bool {
    variants.split_whitespace().any(|v| code.is_prefix_of(v))
}

/// Classifies candidates as matched or unmatched for one stroke code.
pub struct StrokeMatcher<'a> {
    db: &'a dyn StrokeLookup,
    code: StrokeCode,
}

impl<'a> StrokeMatcher<'a> {
    pub fn new(db: &'a dyn StrokeLookup, code: StrokeCode) -> Self {
        Self { db, code }
    }

    pub fn code(&self) -> &StrokeCode {
        &self.code
    }

    /// Sentence candidates never match. Otherwise the first character of the
    /// text is looked up; unknown characters and characters without variants
    /// are unmatched.
    pub fn matches(&self, candidate: &Candidate) -> bool {
        if candidate.kind.is_sentence() {
            return false;
        }
        self.text_matches(&candidate.text)
    }

    /// Match on the first character of `text` only.
    pub fn text_matches(&self, text: &str) -> bool {
        let Some(ch) = first_grapheme(text) else {
            return false;
        };
        self.db
            .lookup(&ch)
            .is_some_and(|variants| variants_match(&variants, &self.code))
    }
}

impl std::fmt::Debug for StrokeMatcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrokeMatcher")
            .field("code", &self.code.to_string())
            .finish_non_exhaustive()
    }
}
