//! Command dispatch.

use crate::chord::ChordSpec;
use crate::event::KeyEvent;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Payload delivered to subscribers when a sequence completes.
#[derive(Debug, Clone)]
pub struct CommandContext<O> {
    /// Owner the manager was created for
    pub owner: O,
    /// Command name bound to the sequence
    pub command: String,
    /// The key event that completed the sequence
    pub event: KeyEvent,
    /// Event target, copied from the event
    pub target: Option<String>,
    /// Final chord of the sequence
    pub chord: ChordSpec,
}

/// Handle returned by [`CommandBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Subscriber<O> = Rc<dyn Fn(&CommandContext<O>)>;

/// Ordered multicast of completed commands.
///
/// Subscribers run synchronously, in registration order. A subscriber may
/// subscribe or unsubscribe while a dispatch is running; the change applies to
/// the next dispatch.
pub struct CommandBus<O> {
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber<O>)>>,
    next_id: Cell<u64>,
}

impl<O> CommandBus<O> {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register a subscriber.
    pub fn subscribe<F>(&self, f: F) -> SubscriptionId
    where
        F: Fn(&CommandContext<O>) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(f)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Deliver a command to every subscriber.
    pub fn dispatch(&self, context: &CommandContext<O>) {
        let subscribers: Vec<Subscriber<O>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        for subscriber in subscribers {
            subscriber(context);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl<O> Default for CommandBus<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> fmt::Debug for CommandBus<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
