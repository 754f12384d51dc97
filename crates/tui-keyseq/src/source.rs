//! Host event sources.
//!
//! The sequence manager never reads the terminal itself. It registers
//! [`Listener`]s on an [`EventSource`] while attached; [`EventHub`] is the
//! provided implementation, fed either by hand or from crossterm events.

use crate::event::KeyEvent;
use crossterm::event::{Event as CtEvent, KeyEventKind};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`EventSource::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// A callback registered on an event source.
#[derive(Clone)]
pub enum Listener {
    /// Called for every key press; may mark the event as handled
    KeyDown(Rc<dyn Fn(&mut KeyEvent)>),
    /// Called when the source loses focus
    Blur(Rc<dyn Fn()>),
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyDown(_) => f.write_str("Listener::KeyDown(..)"),
            Self::Blur(_) => f.write_str("Listener::Blur(..)"),
        }
    }
}

/// Something that delivers key presses and focus loss.
pub trait EventSource {
    /// Register a listener.
    fn add_listener(&self, listener: Listener) -> ListenerId;

    /// Unregister a listener. Returns false if it was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;
}

/// Audible (or visible) failure signal for an abandoned sequence.
pub trait Beeper {
    fn beep(&self);
}

impl<F: Fn()> Beeper for F {
    fn beep(&self) {
        self()
    }
}

/// Single-threaded event source driven by the host loop.
#[derive(Default)]
pub struct EventHub {
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_id: Cell<u64>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn snapshot(&self) -> Vec<Listener> {
        self.listeners
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect()
    }

    /// Deliver a key press to every keydown listener, in registration order.
    pub fn fire_key_down(&self, event: &mut KeyEvent) {
        for listener in self.snapshot() {
            if let Listener::KeyDown(f) = listener {
                f(event);
            }
        }
    }

    /// Deliver a key press and hand the event back with its handled flags.
    pub fn key_down(&self, mut event: KeyEvent) -> KeyEvent {
        self.fire_key_down(&mut event);
        event
    }

    /// Deliver a focus loss to every blur listener.
    pub fn fire_blur(&self) {
        for listener in self.snapshot() {
            if let Listener::Blur(f) = listener {
                f();
            }
        }
    }

    /// Route a crossterm event.
    ///
    /// Key presses and repeats become keydowns, focus loss becomes a blur,
    /// everything else is ignored. Returns the delivered key event, if any.
    pub fn feed_crossterm(&self, event: &CtEvent) -> Option<KeyEvent> {
        match event {
            CtEvent::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                Some(self.key_down(KeyEvent::from(*key)))
            }
            CtEvent::FocusLost => {
                self.fire_blur();
                None
            }
            _ => None,
        }
    }
}

impl EventSource for EventHub {
    fn add_listener(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent as CtKeyEvent, KeyEventState, KeyModifiers};

    fn recording_hub() -> (EventHub, Rc<RefCell<Vec<String>>>) {
        let hub = EventHub::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = log.clone();
        hub.add_listener(Listener::KeyDown(Rc::new(move |e: &mut KeyEvent| {
            l.borrow_mut().push(e.key.clone());
        })));
        let l = log.clone();
        hub.add_listener(Listener::Blur(Rc::new(move || {
            l.borrow_mut().push("blur".to_string());
        })));

        (hub, log)
    }

    #[test]
    fn test_fire_and_remove() {
        let (hub, log) = recording_hub();
        assert_eq!(hub.listener_count(), 2);

        hub.fire_key_down(&mut KeyEvent::new("a"));
        hub.fire_blur();
        assert_eq!(*log.borrow(), vec!["a", "blur"]);

        assert!(hub.remove_listener(ListenerId(0)));
        assert!(!hub.remove_listener(ListenerId(0)));
        hub.fire_key_down(&mut KeyEvent::new("b"));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_listener_marks_event() {
        let hub = EventHub::new();
        hub.add_listener(Listener::KeyDown(Rc::new(|e: &mut KeyEvent| {
            e.prevent_default();
            e.stop_propagation();
        })));
        assert!(hub.key_down(KeyEvent::new("x")).is_suppressed());
    }

    #[test]
    fn test_feed_crossterm() {
        let (hub, log) = recording_hub();

        let press = CtKeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        let delivered = hub.feed_crossterm(&CtEvent::Key(press)).unwrap();
        assert!(delivered.ctrl);

        let release = CtKeyEvent::new_with_kind_and_state(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert!(hub.feed_crossterm(&CtEvent::Key(release)).is_none());
        assert!(hub.feed_crossterm(&CtEvent::FocusGained).is_none());
        hub.feed_crossterm(&CtEvent::FocusLost);

        assert_eq!(*log.borrow(), vec!["q", "blur"]);
    }

    #[test]
    fn test_closure_beeper() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let beeper = move || c.set(c.get() + 1);
        beeper.beep();
        beeper.beep();
        assert_eq!(count.get(), 2);
    }
}
