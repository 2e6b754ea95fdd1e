//! Selection notifications.
//!
//! Hosts fire a selection event whenever the user picks a candidate. Filters
//! that need to react (rewrite the buffer, commit early) connect a handler at
//! session start and keep the returned [`Connection`]; dropping it
//! unsubscribes.

use crate::candidate::Candidate;
use crate::context::CompositionContext;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Handler = Rc<RefCell<dyn FnMut(&mut dyn CompositionContext, &Candidate)>>;

#[derive(Default)]
struct Slots {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

/// Fan-out point for selection events.
///
/// Cloning is cheap and yields a handle to the same subscriber list.
#[derive(Clone, Default)]
pub struct SelectNotifier {
    slots: Rc<RefCell<Slots>>,
}

impl SelectNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler`. It stays registered until the returned
    /// connection is dropped or disconnected.
    pub fn connect<F>(&self, handler: F) -> Connection
    where
        F: FnMut(&mut dyn CompositionContext, &Candidate) + 'static,
    {
        let mut slots = self.slots.borrow_mut();
        let id = slots.next_id;
        slots.next_id += 1;
        let handler: Handler = Rc::new(RefCell::new(handler));
        slots.handlers.push((id, handler));
        Connection {
            id,
            slots: Rc::downgrade(&self.slots),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.slots.borrow().handlers.len()
    }

    /// Deliver a selection event to every subscriber, in connection order.
    ///
    /// Handlers may rewrite the context. A handler that is already running
    /// (re-entrant selection) is skipped.
    pub fn emit(&self, ctx: &mut dyn CompositionContext, selected: &Candidate) {
        let handlers: Vec<Handler> = self
            .slots
            .borrow()
            .handlers
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            match handler.try_borrow_mut() {
                Ok(mut f) => f(ctx, selected),
                Err(_) => tracing::debug!("skipping re-entrant select handler"),
            }
        }
    }
}

impl fmt::Debug for SelectNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Scoped subscription returned by [`SelectNotifier::connect`].
#[derive(Debug)]
pub struct Connection {
    id: u64,
    slots: Weak<RefCell<Slots>>,
}

impl Connection {
    /// Unsubscribe now. Equivalent to dropping the connection.
    pub fn disconnect(self) {}

    /// False once the notifier itself has been dropped.
    pub fn is_connected(&self) -> bool {
        self.slots
            .upgrade()
            .is_some_and(|s| s.borrow().handlers.iter().any(|(id, _)| *id == self.id))
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            if let Ok(mut slots) = slots.try_borrow_mut() {
                slots.handlers.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InputContext;
    use crate::Config;
    use std::cell::Cell;

    #[test]
    fn connect_emit_disconnect() {
        let mut ctx = InputContext::new(Config::default());
        let notifier = ctx.select_notifier();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        let conn = notifier.connect(move |_, _| h.set(h.get() + 1));
        assert!(conn.is_connected());
        assert_eq!(notifier.subscriber_count(), 1);

        notifier.emit(&mut ctx, &Candidate::new("我", 1.0));
        assert_eq!(hits.get(), 1);

        conn.disconnect();
        assert_eq!(notifier.subscriber_count(), 0);
        notifier.emit(&mut ctx, &Candidate::new("我", 1.0));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn handlers_run_in_connection_order() {
        let mut ctx = InputContext::new(Config::default());
        let notifier = SelectNotifier::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = Rc::clone(&order);
        let _a = notifier.connect(move |_, _| o1.borrow_mut().push(1));
        let o2 = Rc::clone(&order);
        let _b = notifier.connect(move |_, _| o2.borrow_mut().push(2));

        notifier.emit(&mut ctx, &Candidate::new("好", 1.0));
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn handler_can_rewrite_context() {
        let mut ctx = InputContext::new(Config::default());
        ctx.set_input("ma;h");
        let notifier = SelectNotifier::new();
        let _conn = notifier.connect(|ctx, _| ctx.set_input("ma;"));
        notifier.emit(&mut ctx, &Candidate::new("好", 1.0));
        assert_eq!(ctx.input(), "ma;");
    }
}
