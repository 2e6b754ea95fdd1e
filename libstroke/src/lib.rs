//! libstroke crate root
//!
//! Auxiliary stroke-code filtering for pinyin input. Typing a guide key
//! after the pinyin (`wo;p`) narrows the candidate menu to characters whose
//! stroke sequence starts with the typed strokes. After a partial selection
//! the guide key is re-armed so the next character can be filtered the same
//! way.
//!
//! Public API exported here:
//! - `StrokeConfig` from `config`
//! - `StrokeCode` and `parse_input` from `parser`
//! - `StrokeMatcher` from `matcher`
//! - `FilterStream` from `stream`
//! - `ContinuationController` from `continuation`
//! - `StrokeFilter` from `filter`

pub mod config;
pub mod continuation;
pub mod filter;
pub mod matcher;
pub mod parser;
pub mod stream;

pub use config::{CodePattern, StrokeConfig};
pub use continuation::{ContinuationController, FilterState, SelectOutcome};
pub use filter::StrokeFilter;
pub use matcher::{variants_match, StrokeMatcher};
pub use parser::{parse_input, split_at_guide, ParsedInput, Stroke, StrokeCode, StrokeCodeError, StrokeSlot};
pub use stream::FilterStream;

// Host types callers need alongside the filter.
pub use libstroke_core::{
    Candidate, CandidateKind, CompositionContext, InputContext, Lexicon, Segment, StrokeDb,
    StrokeDict, StrokeLookup,
};
