//! Composition segments.
//!
//! A segment is a tagged span of the raw input buffer that the host pipeline
//! converts. Filters can be scoped to segments carrying specific tags, e.g.
//! the `general` tag for ordinary phonetic input.

use std::collections::BTreeSet;
use std::ops::Range;

/// A tagged span of the raw input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segment {
    /// Byte range in the raw input
    pub range: Range<usize>,
    /// Tags assigned by the host segmentor
    pub tags: BTreeSet<String>,
    /// Whether this segment has been confirmed by the user
    pub confirmed: bool,
}

impl Segment {
    /// Create an unconfirmed segment with the given tags.
    pub fn new<I, T>(range: Range<usize>, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            range,
            tags: tags.into_iter().map(Into::into).collect(),
            confirmed: false,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// True if at least one of this segment's tags is in `tags`.
    pub fn has_any_tag(&self, tags: &BTreeSet<String>) -> bool {
        !self.tags.is_disjoint(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_intersection() {
        let seg = Segment::new(0..4, ["general", "pinyin"]);
        let wanted: BTreeSet<String> = ["pinyin".to_string()].into_iter().collect();
        let other: BTreeSet<String> = ["punct".to_string()].into_iter().collect();
        assert!(seg.has_tag("general"));
        assert!(seg.has_any_tag(&wanted));
        assert!(!seg.has_any_tag(&other));
        assert!(!seg.has_any_tag(&BTreeSet::new()));
    }

    #[test]
    fn new_segment_is_unconfirmed() {
        let seg = Segment::new(2..2, Vec::<String>::new());
        assert!(seg.tags.is_empty());
        assert!(!seg.confirmed);
    }
}
