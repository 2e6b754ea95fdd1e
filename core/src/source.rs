//! Upstream candidate producers.
//!
//! The host's conversion pipeline (pinyin to characters) is a collaborator:
//! this crate only needs it to hand out a lazy, single-pass sequence of
//! candidates for the current input.

use crate::candidate::Candidate;

/// Lazy candidate sequence. Each element is produced on demand and visited
/// once; the sequence cannot be restarted.
pub type CandidateIter<'a> = Box<dyn Iterator<Item = Candidate> + 'a>;

/// Trait that candidate producers implement to feed the host menu.
pub trait CandidateSource {
    /// Produce candidates for the raw `input` buffer.
    ///
    /// Implementations decide how much of the input they convert; candidate
    /// spans report the converted byte range.
    fn candidates<'a>(&'a self, input: &'a str) -> CandidateIter<'a>;
}

impl<T: CandidateSource + ?Sized> CandidateSource for &T {
    fn candidates<'a>(&'a self, input: &'a str) -> CandidateIter<'a> {
        (**self).candidates(input)
    }
}

/// A fixed list of candidates, returned regardless of input.
///
/// Handy for tests and for hosts that already hold a materialized menu.
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    pub candidates: Vec<Candidate>,
}

impl FixedSource {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

impl CandidateSource for FixedSource {
    fn candidates<'a>(&'a self, _input: &'a str) -> CandidateIter<'a> {
        Box::new(self.candidates.iter().cloned())
    }
}
