//! Composition context: the live state of one composition.
//!
//! `CompositionContext` is the surface filters see: the raw input buffer
//! (read/write), the preedit text, commit, and the selection notifier.
//! `InputContext` is the in-process implementation used by the CLI and the
//! tests. It keeps one tagged segment over the whole input, a candidate menu
//! rebuilt on every keystroke, and the text confirmed so far.

use crate::candidate::Candidate;
use crate::composition::Segment;
use crate::filter::CandidateFilter;
use crate::input_buffer::InputBuffer;
use crate::notifier::SelectNotifier;
use crate::source::{CandidateIter, CandidateSource};
use crate::Config;

/// What a filter may observe and change in the host composition.
pub trait CompositionContext {
    /// Current raw input buffer.
    fn input(&self) -> &str;

    /// Replace the raw input buffer wholesale.
    fn set_input(&mut self, input: &str);

    /// User-visible rendering of the in-progress composition.
    fn preedit(&self) -> String;

    /// Commit the composition to the application.
    fn commit(&mut self);

    /// Notifier fired after the user selects a candidate.
    fn select_notifier(&self) -> SelectNotifier;
}

/// In-process composition context.
#[derive(Debug)]
pub struct InputContext {
    config: Config,
    input: InputBuffer,
    /// Text of candidates selected so far in this composition
    confirmed: String,
    /// Text committed to the application, consumed by `take_commit`
    commit_text: String,
    segment: Segment,
    menu: Vec<Candidate>,
    notifier: SelectNotifier,
}

impl InputContext {
    pub fn new(config: Config) -> Self {
        let segment = Segment::new(0..0, config.segment_tags.iter().cloned());
        Self {
            config,
            input: InputBuffer::new(),
            confirmed: String::new(),
            commit_text: String::new(),
            segment,
            menu: Vec::new(),
            notifier: SelectNotifier::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The segment covering the current input.
    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    /// Whether the composition holds any state.
    pub fn is_composing(&self) -> bool {
        !self.input.is_empty() || !self.confirmed.is_empty()
    }

    pub fn insert_char(&mut self, ch: char) {
        self.input.insert_char(ch);
        self.sync_segment();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.input.insert_str(s);
        self.sync_segment();
    }

    /// Delete the last typed character. Returns false on an empty buffer.
    pub fn backspace(&mut self) -> bool {
        let deleted = self.input.delete_before();
        self.sync_segment();
        deleted
    }

    /// Abandon the composition without committing.
    pub fn clear(&mut self) {
        self.input.clear();
        self.confirmed.clear();
        self.menu.clear();
        self.sync_segment();
    }

    /// Rebuild the candidate menu for the current input.
    ///
    /// Filters whose `applies_to` rejects the current segment are skipped.
    /// At most `config.max_candidates` candidates are pulled from the
    /// pipeline.
    pub fn update_candidates(
        &mut self,
        source: &dyn CandidateSource,
        filters: &[&dyn CandidateFilter],
    ) {
        let menu: Vec<Candidate> = {
            let input = self.input.text();
            let mut stream: CandidateIter<'_> = source.candidates(input);
            for filter in filters {
                if filter.applies_to(&self.segment) {
                    stream = filter.apply(input, stream);
                } else {
                    tracing::trace!(filter = filter.name(), "filter skipped for segment");
                }
            }
            stream.take(self.config.max_candidates).collect()
        };
        self.menu = menu;
    }

    /// All candidates of the current menu.
    pub fn menu(&self) -> &[Candidate] {
        &self.menu
    }

    /// The first page of the menu.
    pub fn page(&self) -> &[Candidate] {
        let end = self.config.page_size.max(1).min(self.menu.len());
        &self.menu[..end]
    }

    /// Select the candidate at `index` in the menu.
    ///
    /// The candidate's text is confirmed and the code it converted is dropped
    /// from the input buffer. Subscribers are notified afterwards and may
    /// rewrite the buffer or commit. If nothing is left to convert the
    /// composition commits.
    pub fn select(&mut self, index: usize) -> Option<Candidate> {
        let selected = self.menu.get(index)?.clone();
        self.confirmed.push_str(&selected.text);
        self.input.consume_prefix(selected.span.end);
        self.menu.clear();
        self.sync_segment();

        let notifier = self.notifier.clone();
        notifier.emit(self, &selected);

        if self.input.is_empty() && !self.confirmed.is_empty() {
            self.commit();
        }
        Some(selected)
    }

    /// Select through a selection key (e.g. `'1'`), relative to the first page.
    pub fn select_by_key(&mut self, key: char) -> Option<Candidate> {
        let index = self.config.selection_key_index(key)?;
        if index >= self.page().len() {
            return None;
        }
        self.select(index)
    }

    /// Take the committed text, leaving it empty.
    pub fn take_commit(&mut self) -> String {
        std::mem::take(&mut self.commit_text)
    }

    pub fn has_commit(&self) -> bool {
        !self.commit_text.is_empty()
    }

    fn sync_segment(&mut self) {
        self.segment.range = 0..self.input.len();
        self.segment.confirmed = false;
    }
}

impl CompositionContext for InputContext {
    fn input(&self) -> &str {
        self.input.text()
    }

    fn set_input(&mut self, input: &str) {
        self.input.set_text(input);
        self.menu.clear();
        self.sync_segment();
    }

    fn preedit(&self) -> String {
        let mut s = String::with_capacity(self.confirmed.len() + self.input.len());
        s.push_str(&self.confirmed);
        s.push_str(self.input.text());
        s
    }

    /// Commit confirmed text followed by whatever raw input remains.
    fn commit(&mut self) {
        let text = self.preedit();
        if !text.is_empty() {
            self.commit_text.push_str(&text);
        }
        self.input.clear();
        self.confirmed.clear();
        self.menu.clear();
        self.sync_segment();
    }

    fn select_notifier(&self) -> SelectNotifier {
        self.notifier.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FixedSource;
    use crate::CandidateKind;

    fn menu_source() -> FixedSource {
        FixedSource::new(vec![
            Candidate::new("好吗", 5.0)
                .with_kind(CandidateKind::Phrase)
                .with_span(0..5),
            Candidate::new("好", 4.0).with_span(0..3),
            Candidate::new("号", 2.0).with_span(0..3),
        ])
    }

    #[test]
    fn typing_tracks_segment() {
        let mut ctx = InputContext::new(Config::default());
        ctx.insert_str("haoma");
        assert_eq!(ctx.segment().range, 0..5);
        assert!(ctx.segment().has_tag("general"));
        ctx.backspace();
        assert_eq!(ctx.segment().range, 0..4);
    }

    #[test]
    fn select_partial_keeps_composing() {
        let mut ctx = InputContext::new(Config::default());
        ctx.insert_str("haoma");
        ctx.update_candidates(&menu_source(), &[]);
        assert_eq!(ctx.menu().len(), 3);

        let picked = ctx.select(1).unwrap();
        assert_eq!(picked.text, "好");
        assert_eq!(ctx.input(), "ma");
        assert_eq!(ctx.preedit(), "好ma");
        assert!(!ctx.has_commit());
    }

    #[test]
    fn select_whole_input_commits() {
        let mut ctx = InputContext::new(Config::default());
        ctx.insert_str("haoma");
        ctx.update_candidates(&menu_source(), &[]);
        ctx.select(0);
        assert!(!ctx.is_composing());
        assert_eq!(ctx.take_commit(), "好吗");
        assert_eq!(ctx.take_commit(), "");
    }

    #[test]
    fn select_out_of_range() {
        let mut ctx = InputContext::new(Config::default());
        ctx.insert_str("hao");
        ctx.update_candidates(&menu_source(), &[]);
        assert!(ctx.select(9).is_none());
        assert!(ctx.select_by_key('9').is_none());
        assert!(ctx.select_by_key('x').is_none());
        assert_eq!(ctx.select_by_key('2').unwrap().text, "好");
    }

    #[test]
    fn commit_flushes_confirmed_and_raw() {
        let mut ctx = InputContext::new(Config::default());
        ctx.insert_str("haoma");
        ctx.update_candidates(&menu_source(), &[]);
        ctx.select(1);
        ctx.commit();
        assert_eq!(ctx.take_commit(), "好ma");
        assert_eq!(ctx.preedit(), "");
    }

    #[test]
    fn menu_is_capped() {
        let mut cfg = Config::default();
        cfg.max_candidates = 2;
        cfg.page_size = 1;
        let mut ctx = InputContext::new(cfg);
        ctx.insert_str("hao");
        ctx.update_candidates(&menu_source(), &[]);
        assert_eq!(ctx.menu().len(), 2);
        assert_eq!(ctx.page().len(), 1);
    }
}
