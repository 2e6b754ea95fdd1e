//! Lazy partitioning stream.
//!
//! When a stroke code is active the upstream sequence is drained on the
//! first pull and split into matched and unmatched candidates. Matched ones
//! are yielded first; unmatched ones follow only when `show_others` is set.
//! Both groups keep upstream order. Without a stroke code the stream is a
//! plain pass-through and never buffers.

use crate::matcher::StrokeMatcher;
use libstroke_core::Candidate;
use std::vec;
use tracing::debug;

enum State<'a, I> {
    PassThrough(I),
    Pending {
        upstream: I,
        matcher: StrokeMatcher<'a>,
        show_others: bool,
    },
    Draining {
        matched: vec::IntoIter<Candidate>,
        unmatched: Option<vec::IntoIter<Candidate>>,
    },
}

/// Candidate stream produced by the stroke filter.
pub struct FilterStream<'a, I> {
    state: State<'a, I>,
}

impl<'a, I> FilterStream<'a, I>
where
    I: Iterator<Item = Candidate>,
{
    /// Forward `upstream` unchanged.
    pub fn pass_through(upstream: I) -> Self {
        Self {
            state: State::PassThrough(upstream),
        }
    }

    /// Partition `upstream` with `matcher` on first pull.
    pub fn partitioned(upstream: I, matcher: StrokeMatcher<'a>, show_others: bool) -> Self {
        Self {
            state: State::Pending {
                upstream,
                matcher,
                show_others,
            },
        }
    }

    /// True unless this stream is a pass-through.
    pub fn is_filtering(&self) -> bool {
        !matches!(self.state, State::PassThrough(_))
    }

    fn partition(&mut self) {
        let state = std::mem::replace(
            &mut self.state,
            State::Draining {
                matched: Vec::new().into_iter(),
                unmatched: None,
            },
        );
        let (upstream, matcher, show_others) = match state {
            State::Pending {
                upstream,
                matcher,
                show_others,
            } => (upstream, matcher, show_others),
            other => {
                self.state = other;
                return;
            }
        };

        let mut matched = Vec::new();
        let mut unmatched = Vec::new();
        let mut hidden = 0usize;
        for candidate in upstream {
            if matcher.matches(&candidate) {
                matched.push(candidate);
            } else if show_others {
                unmatched.push(candidate);
            } else {
                hidden += 1;
            }
        }
        debug!(
            code = %matcher.code(),
            matched = matched.len(),
            unmatched = unmatched.len(),
            hidden,
            "partitioned candidates by stroke code"
        );
        self.state = State::Draining {
            matched: matched.into_iter(),
            unmatched: show_others.then(|| unmatched.into_iter()),
        };
    }
}

impl<I> Iterator for FilterStream<'_, I>
where
    I: Iterator<Item = Candidate>,
{
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if matches!(self.state, State::Pending { .. }) {
            self.partition();
        }
        match &mut self.state {
            State::PassThrough(upstream) => upstream.next(),
            State::Draining { matched, unmatched } => {
                matched.next().or_else(|| unmatched.as_mut()?.next())
            }
            State::Pending { .. } => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.state {
            State::PassThrough(upstream) => upstream.size_hint(),
            State::Pending { upstream, .. } => (0, upstream.size_hint().1),
            State::Draining { matched, unmatched } => {
                let n = matched.len() + unmatched.as_ref().map_or(0, |u| u.len());
                (n, Some(n))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libstroke_core::StrokeDict;
    use std::cell::Cell;

    fn dict() -> StrokeDict {
        let mut d = StrokeDict::new();
        d.insert("我", "pnzn sz");
        d.insert("窝", "snpn");
        d.insert("握", "hsh");
        d.insert("卧", "hsp");
        d
    }

    fn cands(texts: &[&str]) -> Vec<Candidate> {
        texts.iter().map(|t| Candidate::new(*t, 1.0)).collect()
    }

    fn texts(stream: impl Iterator<Item = Candidate>) -> Vec<String> {
        stream.map(|c| c.text).collect()
    }

    #[test]
    fn matched_first_then_others() {
        let d = dict();
        let m = StrokeMatcher::new(&d, "s".parse().unwrap());
        let stream = FilterStream::partitioned(cands(&["握", "我", "窝", "卧"]).into_iter(), m, true);
        assert_eq!(texts(stream), ["我", "窝", "握", "卧"]);
    }

    #[test]
    fn others_hidden() {
        let d = dict();
        let m = StrokeMatcher::new(&d, "h".parse().unwrap());
        let stream = FilterStream::partitioned(cands(&["我", "握", "窝", "卧"]).into_iter(), m, false);
        assert_eq!(texts(stream), ["握", "卧"]);
    }

    #[test]
    fn pass_through_is_identity() {
        let input = cands(&["卧", "我", "窝"]);
        let stream = FilterStream::pass_through(input.clone().into_iter());
        assert!(!stream.is_filtering());
        assert_eq!(stream.collect::<Vec<_>>(), input);
    }

    #[test]
    fn upstream_untouched_until_first_pull() {
        let d = dict();
        let pulled = Cell::new(0);
        let upstream = cands(&["我", "窝"]).into_iter().inspect(|_| pulled.set(pulled.get() + 1));
        let m = StrokeMatcher::new(&d, "p".parse().unwrap());
        let mut stream = FilterStream::partitioned(upstream, m, true);
        assert!(stream.is_filtering());
        assert_eq!(pulled.get(), 0);
        assert_eq!(stream.next().map(|c| c.text), Some("我".to_string()));
        assert_eq!(pulled.get(), 2);
        assert_eq!(stream.size_hint(), (1, Some(1)));
    }

    #[test]
    fn empty_upstream() {
        let d = dict();
        let m = StrokeMatcher::new(&d, "p".parse().unwrap());
        let mut stream = FilterStream::partitioned(Vec::new().into_iter(), m, true);
        assert!(stream.next().is_none());
        assert!(stream.next().is_none());
    }
}
