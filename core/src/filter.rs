//! Candidate post-processing stage.
//!
//! Filters sit between the candidate source and the menu. They may reorder
//! or drop candidates but never alter them.

use crate::composition::Segment;
use crate::source::CandidateIter;

/// Filter: transforms the upstream candidate sequence for one segment.
pub trait CandidateFilter {
    /// Human-readable name (for logging).
    fn name(&self) -> &'static str;

    /// Whether this filter runs for `segment` at all.
    fn applies_to(&self, _segment: &Segment) -> bool {
        true
    }

    /// Transform `upstream` given the current raw `input`.
    fn apply<'a>(&'a self, input: &'a str, upstream: CandidateIter<'a>) -> CandidateIter<'a>;
}
