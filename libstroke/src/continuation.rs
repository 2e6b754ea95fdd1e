//! Continuation after a partial selection.
//!
//! Picking a candidate while a stroke code is active normally leaves the
//! rest of the phonetic code in the buffer, still followed by the old stroke
//! code. The controller reacts to the host's selection event:
//!
//! - if the pending preedit still contains code letters, the stroke code is
//!   dropped and the guide key is re-armed so the user can type strokes for
//!   the next character;
//! - otherwise the stroke code is dropped and the composition commits.

use crate::config::CodePattern;
use crate::parser::split_at_guide;
use libstroke_core::CompositionContext;
use tracing::debug;

/// Per-session filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterState {
    /// No guide key in the buffer
    #[default]
    Idle,
    /// Guide key present; candidates are being partitioned
    Filtering,
    /// Guide key re-armed after a partial selection, no strokes typed yet
    AwaitingNextChar,
    /// Last selection committed the composition
    Committed,
}

/// What the controller did with a selection event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// No guide key in the buffer; nothing touched
    Ignored,
    /// Buffer rewritten to `<remaining code><guide key>`
    Rearmed,
    /// Stroke code removed and composition committed
    Committed,
}

#[derive(Debug, Clone)]
pub struct ContinuationController {
    guide_key: String,
    code_pattern: CodePattern,
    state: FilterState,
}

impl ContinuationController {
    pub fn new<S: Into<String>>(guide_key: S, code_pattern: CodePattern) -> Self {
        Self {
            guide_key: guide_key.into(),
            code_pattern,
            state: FilterState::Idle,
        }
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    pub fn guide_key(&self) -> &str {
        &self.guide_key
    }

    /// Track the buffer as it changes between selections.
    pub fn observe(&mut self, input: &str) -> FilterState {
        self.state = match split_at_guide(input, &self.guide_key) {
            None => FilterState::Idle,
            Some((_, "")) if self.state == FilterState::AwaitingNextChar => {
                FilterState::AwaitingNextChar
            }
            Some(_) => FilterState::Filtering,
        };
        self.state
    }

    /// React to a selection. Runs after the host consumed the selected
    /// candidate's code.
    pub fn on_select(&mut self, ctx: &mut dyn CompositionContext) -> SelectOutcome {
        let input = ctx.input().to_string();
        let Some((remaining, _)) = split_at_guide(&input, &self.guide_key) else {
            self.state = FilterState::Idle;
            return SelectOutcome::Ignored;
        };

        let preedit = ctx.preedit();
        let pending = split_at_guide(&preedit, &self.guide_key).map_or(preedit.as_str(), |(p, _)| p);

        if self.code_pattern.is_match(pending) {
            let rearmed = format!("{}{}", remaining, self.guide_key);
            debug!(pending, input = %rearmed, "re-arming guide key for next character");
            ctx.set_input(&rearmed);
            self.state = FilterState::AwaitingNextChar;
            SelectOutcome::Rearmed
        } else {
            debug!(pending, "selection complete, committing");
            ctx.set_input(remaining);
            ctx.commit();
            self.state = FilterState::Committed;
            SelectOutcome::Committed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libstroke_core::{Candidate, Config, FixedSource, InputContext};

    fn controller() -> ContinuationController {
        ContinuationController::new(";", CodePattern::default())
    }

    // menu holding a single candidate for `raw`
    fn after_select(confirmed: &str, raw: &str, span_end: usize) -> InputContext {
        let mut ctx = InputContext::new(Config::default());
        ctx.set_input(raw);
        let source = FixedSource::new(vec![Candidate::new(confirmed, 1.0).with_span(0..span_end)]);
        ctx.update_candidates(&source, &[]);
        ctx
    }

    #[test]
    fn rearms_while_code_remains() {
        let mut ctx = after_select("好", "haoma;h", 3);
        ctx.select(0);
        assert_eq!(ctx.input(), "ma;h");

        let mut c = controller();
        assert_eq!(c.on_select(&mut ctx), SelectOutcome::Rearmed);
        assert_eq!(ctx.input(), "ma;");
        assert_eq!(ctx.preedit(), "好ma;");
        assert_eq!(c.state(), FilterState::AwaitingNextChar);
        assert!(!ctx.has_commit());
    }

    #[test]
    fn commits_when_no_code_remains() {
        let mut ctx = after_select("我", "wo;p", 2);
        ctx.select(0);
        assert_eq!(ctx.input(), ";p");

        let mut c = controller();
        assert_eq!(c.on_select(&mut ctx), SelectOutcome::Committed);
        assert_eq!(ctx.take_commit(), "我");
        assert!(ctx.input().is_empty());
        assert_eq!(c.state(), FilterState::Committed);
    }

    #[test]
    fn ignores_buffer_without_guide() {
        let mut ctx = InputContext::new(Config::default());
        ctx.set_input("ma");
        let mut c = controller();
        assert_eq!(c.on_select(&mut ctx), SelectOutcome::Ignored);
        assert_eq!(ctx.input(), "ma");
        assert_eq!(c.state(), FilterState::Idle);
    }

    #[test]
    fn empty_pattern_always_commits() {
        let mut ctx = after_select("好", "haoma;h", 3);
        ctx.select(0);
        let mut c = ContinuationController::new(";", CodePattern::new(""));
        assert_eq!(c.on_select(&mut ctx), SelectOutcome::Committed);
        assert_eq!(ctx.take_commit(), "好ma");
    }

    #[test]
    fn observe_tracks_guide_key() {
        let mut c = controller();
        assert_eq!(c.observe("wo"), FilterState::Idle);
        assert_eq!(c.observe("wo;"), FilterState::Filtering);
        assert_eq!(c.observe("wo;p"), FilterState::Filtering);

        let mut ctx = after_select("好", "haoma;h", 3);
        ctx.select(0);
        c.on_select(&mut ctx);
        assert_eq!(c.observe("ma;"), FilterState::AwaitingNextChar);
        assert_eq!(c.observe("ma;s"), FilterState::Filtering);
        assert_eq!(c.observe("ma"), FilterState::Idle);
    }
}
