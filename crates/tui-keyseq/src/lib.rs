//! # tui-keyseq
//!
//! Chord-sequence keybindings: turns a stream of key presses into named commands.
//!
//! ## Features
//!
//! - Chord strings like `"Ctrl-x Ctrl-s"`, `"CmdOrCtrl-Shift-S"`, `"alt+up"`
//! - Conflict-checked binding tables compiled into tries
//! - Overlay stacks with first-table-wins precedence
//! - Dynamic recognizers (e.g. insert-self for printable keys)
//! - Event-driven sequence manager with suppression and failure signalling
//! - TOML keymaps and built-in presets
//!
//! ```text
//! let config = KeyConfig::for_platform(Platform::Other);
//! let table = BindingTable::new([("save", ["Ctrl-x Ctrl-s"])], &config)?;
//!
//! let hub = Rc::new(EventHub::new());
//! let mut manager = SequenceManager::new(owner, hub.clone(), config);
//! manager.push(Arc::new(table))?;
//! manager.attach()?;
//! manager.subscribe(|ctx| run(&ctx.command));
//!
//! hub.feed_crossterm(&crossterm::event::read()?);
//! ```

mod bus;
mod chord;
mod config;
mod display;
mod error;
mod event;
mod manager;
mod matcher;
mod modifier;
mod preset;
mod source;
mod table;

pub use bus::{CommandBus, CommandContext, SubscriptionId};
pub use chord::ChordSpec;
pub use config::KeymapConfig;
pub use display::{key_glyph, key_label, KeyDisplayConfig, KeyDisplayFormat};
pub use error::{KeymapError, Result};
pub use event::{is_modifier_key, key_identifier, KeyEvent, MODIFIER_KEYS};
pub use manager::{ManagerState, SequenceManager};
pub use matcher::{Consumed, MatchNode, NodeKind, Recognizer};
pub use modifier::{
    validate_descriptors, KeyConfig, Modifier, ModifierDescriptor, ModifierFlags, Platform,
    CANONICAL_KEY_SEPARATOR, MODIFIERS, SEQUENCE_SEPARATOR,
};
pub use preset::KeymapPreset;
pub use source::{Beeper, EventHub, EventSource, Listener, ListenerId};
pub use table::{BindingTable, Trie, TrieEntry};

/// Parse a chord sequence for the detected platform.
pub fn parse_sequence(sequence: &str) -> Result<Vec<ChordSpec>> {
    ChordSpec::parse_sequence(sequence, &KeyConfig::detect())
}

/// Format a chord sequence with the given display config.
pub fn format_sequence(sequence: &str, display: &KeyDisplayConfig) -> Result<String> {
    Ok(display.format_sequence(&parse_sequence(sequence)?))
}
