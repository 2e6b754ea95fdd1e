//! The stroke filter session.
//!
//! `StrokeFilter` ties together the pieces of one input session: the stroke
//! database, the candidate partitioning stream and the continuation
//! controller subscribed to the host's selection events.

use crate::config::StrokeConfig;
use crate::continuation::{ContinuationController, FilterState};
use crate::matcher::StrokeMatcher;
use crate::parser::parse_input;
use crate::stream::FilterStream;
use libstroke_core::utils::first_grapheme;
use libstroke_core::{
    Candidate, CandidateFilter, CandidateIter, CompositionContext, Connection, Segment, StrokeDb,
    StrokeLookup,
};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, warn};

pub struct StrokeFilter {
    guide_key: String,
    show_others: bool,
    tags: BTreeSet<String>,
    db: Option<Box<dyn StrokeLookup>>,
    controller: Rc<RefCell<ContinuationController>>,
    connection: Option<Connection>,
}

impl StrokeFilter {
    /// Build a filter over `db` without subscribing to any host.
    ///
    /// A `None` database leaves the filter permanently inactive.
    pub fn new(config: &StrokeConfig, db: Option<Box<dyn StrokeLookup>>) -> Self {
        let controller = ContinuationController::new(config.guide_key.clone(), config.code_pattern());
        Self {
            guide_key: config.guide_key.clone(),
            show_others: config.show_others,
            tags: config.tag_set(),
            db,
            controller: Rc::new(RefCell::new(controller)),
            connection: None,
        }
    }

    /// Session start: open the configured database and subscribe to
    /// selection events of `ctx`.
    ///
    /// A database that fails to open is logged and the filter passes every
    /// candidate through for the rest of the session.
    pub fn init(config: &StrokeConfig, ctx: &dyn CompositionContext) -> Self {
        let db = match StrokeDb::open(&config.base.data_dir, &config.db) {
            Ok(db) => Some(Box::new(db) as Box<dyn StrokeLookup>),
            Err(e) => {
                warn!(db = %config.db, error = %e, "stroke database unavailable, filter disabled");
                None
            }
        };
        let mut filter = Self::new(config, db);
        filter.attach(ctx);
        filter
    }

    /// Session start with an already opened database.
    pub fn with_db<D>(config: &StrokeConfig, db: D, ctx: &dyn CompositionContext) -> Self
    where
        D: StrokeLookup + 'static,
    {
        let mut filter = Self::new(config, Some(Box::new(db)));
        filter.attach(ctx);
        filter
    }

    /// Subscribe the continuation controller to `ctx`'s selection events,
    /// replacing any previous subscription.
    pub fn attach(&mut self, ctx: &dyn CompositionContext) {
        let controller = Rc::clone(&self.controller);
        let connection = ctx.select_notifier().connect(move |ctx, selected: &Candidate| {
            let outcome = controller.borrow_mut().on_select(ctx);
            debug!(selected = %selected.text, ?outcome, "stroke filter handled selection");
        });
        self.connection = Some(connection);
    }

    /// Session end: drop the selection subscription and the database.
    pub fn shutdown(self) {
        info!(
            subscribed = self.connection.is_some(),
            "stroke filter session closed"
        );
    }

    /// False when no database is loaded.
    pub fn is_active(&self) -> bool {
        self.db.is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.connection.as_ref().is_some_and(Connection::is_connected)
    }

    pub fn guide_key(&self) -> &str {
        &self.guide_key
    }

    pub fn state(&self) -> FilterState {
        self.controller.borrow().state()
    }

    /// Stroke variants of the first character of `text`, for display.
    pub fn strokes_of(&self, text: &str) -> Option<String> {
        let ch = first_grapheme(text)?;
        self.db.as_ref()?.lookup(&ch)
    }

    /// Whether a segment carries any of the configured tags.
    pub fn applies_to_segment(&self, segment: &Segment) -> bool {
        segment.has_any_tag(&self.tags)
    }

    /// Reorder `upstream` for the raw `input`.
    ///
    /// Passes everything through unchanged when the input carries no valid
    /// stroke code or no database is loaded.
    pub fn filter<'a, I>(&'a self, input: &str, upstream: I) -> FilterStream<'a, I::IntoIter>
    where
        I: IntoIterator<Item = Candidate>,
    {
        if let Ok(mut controller) = self.controller.try_borrow_mut() {
            controller.observe(input);
        }
        let upstream = upstream.into_iter();
        let Some(db) = self.db.as_deref() else {
            return FilterStream::pass_through(upstream);
        };
        match parse_input(input, &self.guide_key) {
            Some(parsed) => {
                debug!(base = parsed.base_code, code = %parsed.stroke_code, "stroke filter active");
                let matcher = StrokeMatcher::new(db, parsed.stroke_code);
                FilterStream::partitioned(upstream, matcher, self.show_others)
            }
            None => FilterStream::pass_through(upstream),
        }
    }

    /// Like [`filter`](Self::filter), but passes through segments outside the
    /// configured tags.
    pub fn filter_segment<'a, I>(
        &'a self,
        input: &str,
        segment: &Segment,
        upstream: I,
    ) -> FilterStream<'a, I::IntoIter>
    where
        I: IntoIterator<Item = Candidate>,
    {
        if self.applies_to_segment(segment) {
            self.filter(input, upstream)
        } else {
            FilterStream::pass_through(upstream.into_iter())
        }
    }
}

impl CandidateFilter for StrokeFilter {
    fn name(&self) -> &'static str {
        "stroke_filter"
    }

    fn applies_to(&self, segment: &Segment) -> bool {
        self.applies_to_segment(segment)
    }

    fn apply<'a>(&'a self, input: &'a str, upstream: CandidateIter<'a>) -> CandidateIter<'a> {
        Box::new(self.filter(input, upstream))
    }
}

impl fmt::Debug for StrokeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrokeFilter")
            .field("guide_key", &self.guide_key)
            .field("show_others", &self.show_others)
            .field("tags", &self.tags)
            .field("active", &self.is_active())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libstroke_core::{Config, InputContext, StrokeDict};

    fn dict() -> StrokeDict {
        let mut d = StrokeDict::new();
        d.insert("我", "pnzn sz");
        d.insert("窝", "snpn");
        d
    }

    fn cands() -> Vec<Candidate> {
        vec![Candidate::new("窝", 20.0), Candidate::new("我", 100.0)]
    }

    fn texts(stream: impl Iterator<Item = Candidate>) -> Vec<String> {
        stream.map(|c| c.text).collect()
    }

    #[test]
    fn filters_with_valid_code() {
        let filter = StrokeFilter::new(&StrokeConfig::default(), Some(Box::new(dict())));
        assert_eq!(texts(filter.filter("wo;p", cands())), ["我", "窝"]);
        assert_eq!(filter.state(), FilterState::Filtering);
    }

    #[test]
    fn passes_through_without_code() {
        let filter = StrokeFilter::new(&StrokeConfig::default(), Some(Box::new(dict())));
        assert_eq!(texts(filter.filter("wo", cands())), ["窝", "我"]);
        assert_eq!(texts(filter.filter("wo;q", cands())), ["窝", "我"]);
        assert_eq!(filter.state(), FilterState::Filtering);
        filter.filter("wo", Vec::new());
        assert_eq!(filter.state(), FilterState::Idle);
    }

    #[test]
    fn no_database_passes_through() {
        let filter = StrokeFilter::new(&StrokeConfig::default(), None);
        assert!(!filter.is_active());
        assert!(!filter.filter("wo;p", cands()).is_filtering());
    }

    #[test]
    fn init_with_missing_database_is_inactive() {
        let mut config = StrokeConfig::default();
        config.base.data_dir = std::env::temp_dir().join("libstroke_no_such_dir");
        let ctx = InputContext::new(Config::default());
        let filter = StrokeFilter::init(&config, &ctx);
        assert!(!filter.is_active());
        assert!(filter.is_attached());
        assert_eq!(texts(filter.filter("wo;p", cands())), ["窝", "我"]);
    }

    #[test]
    fn tag_scope() {
        let filter = StrokeFilter::new(&StrokeConfig::default(), Some(Box::new(dict())));
        let general = Segment::new(0..4, ["general"]);
        let punct = Segment::new(0..4, ["punct"]);
        assert!(filter.applies_to(&general));
        assert!(!filter.applies_to(&punct));
        assert_eq!(texts(filter.filter_segment("wo;p", &punct, cands())), ["窝", "我"]);
        assert_eq!(texts(filter.filter_segment("wo;p", &general, cands())), ["我", "窝"]);
    }

    #[test]
    fn shutdown_unsubscribes() {
        let ctx = InputContext::new(Config::default());
        let filter = StrokeFilter::with_db(&StrokeConfig::default(), dict(), &ctx);
        assert!(filter.is_attached());
        assert_eq!(ctx.select_notifier().subscriber_count(), 1);
        filter.shutdown();
        assert_eq!(ctx.select_notifier().subscriber_count(), 0);
    }

    #[test]
    fn strokes_for_display() {
        let filter = StrokeFilter::new(&StrokeConfig::default(), Some(Box::new(dict())));
        assert_eq!(filter.strokes_of("我们").as_deref(), Some("pnzn sz"));
        assert_eq!(filter.strokes_of("他"), None);
    }
}
