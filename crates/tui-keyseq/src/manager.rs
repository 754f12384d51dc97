//! Sequence manager.
//!
//! Owns the overlay stack, listens on an [`EventSource`] while attached and runs
//! every key press through the composed [`MatchNode`] automaton:
//!
//! ```text
//!             attach (stack non-empty)
//!  Detached ───────────────────────────▶ Idle ◀─────────────┐
//!     ▲                                   │                  │ command / no match /
//!     │ detach                            │ prefix chord     │ blur
//!     └───────────────────────────────────┤                  │
//!                                         ▼                  │
//!                                      Pending ──────────────┘
//! ```

use crate::bus::{CommandBus, CommandContext, SubscriptionId};
use crate::chord::ChordSpec;
use crate::error::{KeymapError, Result};
use crate::event::KeyEvent;
use crate::matcher::{Consumed, MatchNode};
use crate::modifier::KeyConfig;
use crate::source::{Beeper, EventSource, Listener, ListenerId};
use crate::table::BindingTable;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Where the manager is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// Not listening for events
    Detached,
    /// Listening, no sequence in progress
    Idle,
    /// Listening, part of a sequence has been typed
    Pending,
}

/// Position in the automaton while attached.
struct Cursor {
    node: MatchNode,
    consumed: Vec<ChordSpec>,
}

/// Keydown/blur handling shared with the registered listeners.
struct Handler<O> {
    owner: O,
    config: KeyConfig,
    bus: Rc<CommandBus<O>>,
    beeper: Rc<dyn Beeper>,
    root: MatchNode,
    cursor: RefCell<Cursor>,
}

impl<O: Clone> Handler<O> {
    fn new(
        owner: O,
        config: KeyConfig,
        bus: Rc<CommandBus<O>>,
        beeper: Rc<dyn Beeper>,
        root: MatchNode,
    ) -> Self {
        let cursor = RefCell::new(Cursor {
            node: root.clone(),
            consumed: Vec::new(),
        });
        Self {
            owner,
            config,
            bus,
            beeper,
            root,
            cursor,
        }
    }

    fn reset(&self) {
        let mut cursor = self.cursor.borrow_mut();
        cursor.node = self.root.clone();
        cursor.consumed.clear();
    }

    fn is_pending(&self) -> bool {
        !self.cursor.borrow().consumed.is_empty()
    }

    fn on_blur(&self) {
        if self.is_pending() {
            trace!("blur, abandoning pending sequence");
        }
        self.reset();
    }

    fn on_key_down(&self, event: &mut KeyEvent) {
        if event.is_modifier_key() {
            trace!(key = %event.key, "ignoring modifier key");
            return;
        }

        let chord = match ChordSpec::from_event(event, &self.config) {
            Ok(chord) => chord,
            Err(err) => {
                warn!(key = %event.key, error = %err, "unparsable key event, passing through");
                return;
            }
        };

        let (node, was_pending) = {
            let cursor = self.cursor.borrow();
            (cursor.node.clone(), !cursor.consumed.is_empty())
        };

        match node.consume(&chord) {
            Consumed::Command(command) => {
                event.prevent_default();
                event.stop_propagation();
                self.reset();

                debug!(command = %command, chord = %chord.canonical(), "dispatching command");
                let context = CommandContext {
                    owner: self.owner.clone(),
                    command,
                    event: event.clone(),
                    target: event.target.clone(),
                    chord,
                };
                self.bus.dispatch(&context);
            }
            Consumed::Pending(next) => {
                event.prevent_default();
                event.stop_propagation();

                let mut cursor = self.cursor.borrow_mut();
                cursor.node = next;
                cursor.consumed.push(chord);
                trace!(depth = cursor.consumed.len(), "sequence pending");
            }
            Consumed::NoMatch if was_pending => {
                event.prevent_default();
                event.stop_propagation();
                debug!(chord = %chord.canonical(), "sequence failed");
                self.reset();
                self.beeper.beep();
            }
            Consumed::NoMatch => {}
        }
    }
}

/// Live attachment to an event source.
struct Attachment<O> {
    handler: Rc<Handler<O>>,
    listeners: Vec<ListenerId>,
}

/// Turns key presses from an [`EventSource`] into commands on a [`CommandBus`].
///
/// Tables are pushed onto the front of the stack; the most recently pushed table
/// has the highest precedence. Every stack change rebuilds the automaton and
/// abandons any pending sequence.
pub struct SequenceManager<O> {
    owner: O,
    config: KeyConfig,
    source: Rc<dyn EventSource>,
    bus: Rc<CommandBus<O>>,
    beeper: Rc<dyn Beeper>,
    stack: Vec<Arc<BindingTable>>,
    attachment: Option<Attachment<O>>,
}

impl<O: Clone + 'static> SequenceManager<O> {
    /// Create a detached manager with an empty stack and a silent beeper.
    pub fn new(owner: O, source: Rc<dyn EventSource>, config: KeyConfig) -> Self {
        Self {
            owner,
            config,
            source,
            bus: Rc::new(CommandBus::new()),
            beeper: Rc::new(|| {}),
            stack: Vec::new(),
            attachment: None,
        }
    }

    /// Set the failure signal.
    pub fn with_beeper(mut self, beeper: impl Beeper + 'static) -> Self {
        self.beeper = Rc::new(beeper);
        self
    }

    /// Share an existing command bus.
    pub fn with_bus(mut self, bus: Rc<CommandBus<O>>) -> Self {
        self.bus = bus;
        self
    }

    /// Start listening.
    ///
    /// Returns `Ok(false)` and stays detached when the stack is empty.
    pub fn attach(&mut self) -> Result<bool> {
        if self.attachment.is_some() {
            return Err(KeymapError::AlreadyAttached);
        }
        if self.stack.is_empty() {
            debug!("attach skipped, empty table stack");
            return Ok(false);
        }

        let root = BindingTable::compose(self.stack.iter().map(Arc::as_ref))?;
        let handler = Rc::new(Handler::new(
            self.owner.clone(),
            self.config,
            self.bus.clone(),
            self.beeper.clone(),
            root,
        ));

        let on_blur = handler.clone();
        let on_key_down = handler.clone();
        let listeners = vec![
            self.source
                .add_listener(Listener::Blur(Rc::new(move || on_blur.on_blur()))),
            self.source.add_listener(Listener::KeyDown(Rc::new(
                move |event: &mut KeyEvent| on_key_down.on_key_down(event),
            ))),
        ];

        debug!(tables = self.stack.len(), "attached");
        self.attachment = Some(Attachment { handler, listeners });
        Ok(true)
    }

    /// Stop listening and drop any pending sequence. No-op when detached.
    pub fn detach(&mut self) {
        if let Some(attachment) = self.attachment.take() {
            for id in attachment.listeners {
                self.source.remove_listener(id);
            }
            debug!("detached");
        }
    }

    /// Push a table onto the front of the stack.
    pub fn push(&mut self, table: Arc<BindingTable>) -> Result<()> {
        if self.position(&table).is_some() {
            return Err(KeymapError::AlreadyInStack);
        }
        self.stack.insert(0, table);
        self.rebuild();
        Ok(())
    }

    /// Remove the front table.
    pub fn pop(&mut self) -> Option<Arc<BindingTable>> {
        if self.stack.is_empty() {
            return None;
        }
        let popped = self.stack.remove(0);
        self.rebuild();
        Some(popped)
    }

    /// Remove `table`, and with `also_subsequent` every table pushed after it.
    ///
    /// Returns false if the table is not on the stack.
    pub fn remove(&mut self, table: &Arc<BindingTable>, also_subsequent: bool) -> bool {
        let Some(index) = self.position(table) else {
            return false;
        };
        if also_subsequent {
            self.stack.drain(..=index);
        } else {
            self.stack.remove(index);
        }
        self.rebuild();
        true
    }

    /// Empty the stack. An attached manager ends up detached.
    pub fn reset_stack(&mut self) {
        if !self.stack.is_empty() {
            self.stack.clear();
            self.rebuild();
        }
    }

    fn position(&self, table: &Arc<BindingTable>) -> Option<usize> {
        self.stack.iter().position(|t| Arc::ptr_eq(t, table))
    }

    fn rebuild(&mut self) {
        let was_attached = self.is_attached();
        self.detach();
        if was_attached {
            debug!(tables = self.stack.len(), "rebuilding automaton");
            if let Err(err) = self.attach() {
                warn!(error = %err, "re-attach after stack change failed");
            }
        }
    }

    /// Run a synthetic key press through the handler. No-op when detached.
    pub fn inject(&self, event: &mut KeyEvent) {
        if let Some(handler) = self.handler() {
            handler.on_key_down(event);
        }
    }

    /// Run a synthetic focus loss through the handler. No-op when detached.
    pub fn inject_blur(&self) {
        if let Some(handler) = self.handler() {
            handler.on_blur();
        }
    }

    /// Subscribe to completed commands.
    pub fn subscribe<F>(&self, f: F) -> SubscriptionId
    where
        F: Fn(&CommandContext<O>) + 'static,
    {
        self.bus.subscribe(f)
    }
}

impl<O> SequenceManager<O> {
    fn handler(&self) -> Option<Rc<Handler<O>>> {
        self.attachment.as_ref().map(|a| a.handler.clone())
    }

    pub fn state(&self) -> ManagerState {
        match &self.attachment {
            None => ManagerState::Detached,
            Some(a) if a.handler.cursor.borrow().consumed.is_empty() => ManagerState::Idle,
            Some(_) => ManagerState::Pending,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// Chords typed so far in the pending sequence.
    pub fn pending_chords(&self) -> Vec<ChordSpec> {
        self.attachment
            .as_ref()
            .map(|a| a.handler.cursor.borrow().consumed.clone())
            .unwrap_or_default()
    }

    /// The overlay stack, highest precedence first.
    pub fn stack(&self) -> &[Arc<BindingTable>] {
        &self.stack
    }

    pub fn commands(&self) -> &Rc<CommandBus<O>> {
        &self.bus
    }

    pub fn owner(&self) -> &O {
        &self.owner
    }

    pub fn config(&self) -> &KeyConfig {
        &self.config
    }
}

impl<O> Drop for SequenceManager<O> {
    fn drop(&mut self) {
        if let Some(attachment) = self.attachment.take() {
            for id in attachment.listeners {
                self.source.remove_listener(id);
            }
        }
    }
}

impl<O: fmt::Debug> fmt::Debug for SequenceManager<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceManager")
            .field("owner", &self.owner)
            .field("config", &self.config)
            .field("tables", &self.stack.len())
            .field("state", &self.state())
            .finish()
    }
}
