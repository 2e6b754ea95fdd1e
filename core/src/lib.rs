//! libstroke-core
//!
//! Host-side building blocks shared by the libstroke filter: the candidate
//! model, composition segments and context, candidate sources and filters,
//! and the stroke lookup databases.
//!
//! Public API:
//! - `Candidate`, `CandidateKind` - conversion candidates
//! - `CompositionContext`, `InputContext` - the live composition
//! - `SelectNotifier`, `Connection` - scoped selection subscriptions
//! - `CandidateSource`, `CandidateFilter` - pipeline stages
//! - `Lexicon` - reference phonetic candidate source
//! - `StrokeLookup`, `StrokeDb` - character to stroke-code databases
//! - `Config` - host configuration
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod candidate;
pub use candidate::{Candidate, CandidateKind};

pub mod composition;
pub use composition::Segment;

pub mod input_buffer;
pub use input_buffer::InputBuffer;

pub mod notifier;
pub use notifier::{Connection, SelectNotifier};

pub mod context;
pub use context::{CompositionContext, InputContext};

pub mod source;
pub use source::{CandidateIter, CandidateSource, FixedSource};

pub mod filter;
pub use filter::CandidateFilter;

pub mod lexicon;
pub use lexicon::{Lexicon, PhraseEntry};

pub mod stroke_dict;
pub use stroke_dict::{FstStrokeDict, RedbStrokeDict, StrokeDb, StrokeDict, StrokeLookup};

/// Host configuration.
///
/// Contains only host-side options. Filter options live in the filter crate's
/// own config, which embeds this one.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding runtime artifacts (stroke databases, lexicons)
    pub data_dir: PathBuf,

    /// Tags given to the composition segment (filters are scoped by tag)
    pub segment_tags: Vec<String>,

    /// Keys for selecting candidates (default: "123456789").
    /// First char selects the 1st candidate of the page, etc.
    pub select_keys: String,

    /// Number of candidates shown per page
    pub page_size: usize,

    /// Maximum number of candidates pulled from the pipeline per keystroke
    pub max_candidates: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            segment_tags: vec!["general".to_string()],
            select_keys: "123456789".to_string(),
            page_size: 5,
            max_candidates: 50,
        }
    }
}

impl Config {
    /// Check if a character is a selection key and return its index (0-based).
    pub fn selection_key_index(&self, ch: char) -> Option<usize> {
        self.select_keys.chars().position(|c| c == ch)
    }
}

/// Utility helpers.
pub mod utils {
    use unicode_normalization::UnicodeNormalization;
    use unicode_segmentation::UnicodeSegmentation;

    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        s.nfc().collect::<String>().trim().to_string()
    }

    /// First extended grapheme cluster of `s`, NFC-normalized.
    ///
    /// Leading whitespace is not skipped. Returns `None` for empty text.
    pub fn first_grapheme(s: &str) -> Option<String> {
        let normalized: String = s.nfc().collect();
        normalized.graphemes(true).next().map(str::to_string)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn first_grapheme_of_word() {
            assert_eq!(first_grapheme("我们").as_deref(), Some("我"));
            assert_eq!(first_grapheme("a").as_deref(), Some("a"));
            assert_eq!(first_grapheme(""), None);
        }

        #[test]
        fn first_grapheme_does_not_skip_whitespace() {
            assert_eq!(first_grapheme(" 我").as_deref(), Some(" "));
            assert_eq!(first_grapheme("\t").as_deref(), Some("\t"));
        }

        #[test]
        fn first_grapheme_keeps_combining_marks() {
            // e + combining acute composes under NFC
            assert_eq!(first_grapheme("e\u{301}x").as_deref(), Some("\u{e9}"));
            // variation selector stays attached to its base
            assert_eq!(first_grapheme("葛\u{E0100}亮").as_deref(), Some("葛\u{E0100}"));
        }

        #[test]
        fn normalize_trims() {
            assert_eq!(normalize("  我 \n"), "我");
        }
    }
}
