//! Keymap error types.

use thiserror::Error;

/// Errors raised while building or driving keymaps.
///
/// Everything except the usage variants is a configuration error: it comes from a
/// malformed chord or binding table and is reported at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeymapError {
    /// Chord string was empty.
    #[error("chord string must not be empty")]
    EmptyChord,

    /// Chord string contained an empty token.
    #[error("invalid chord string {chord:?}")]
    Syntax { chord: String },

    /// Modifier token is not in the alias table.
    #[error("invalid modifier {modifier:?} in chord string {chord:?}")]
    UnknownModifier { modifier: String, chord: String },

    /// Modifier resolved to one already present in the chord.
    #[error("redundant modifier {modifier:?} in chord string {chord:?}")]
    DuplicateModifier { modifier: String, chord: String },

    /// Binding table used an empty command name.
    #[error("command names must not be empty")]
    EmptyCommand,

    /// Two bindings claim the same prefix, or a command is reused as a prefix.
    #[error("duplicate bindings specified for key sequence: {sequence}")]
    DuplicateBinding { sequence: String },

    /// `compose` was called without any tables.
    #[error("at least one binding table must be given")]
    NoTables,

    /// Match node built with neither a trie nor a fallback.
    #[error("at least one of trie or fallback must be given")]
    InvalidNode,

    /// Manager was attached twice.
    #[error("attach() called when already attached")]
    AlreadyAttached,

    /// Binding table is already on the overlay stack.
    #[error("binding table already exists in stack")]
    AlreadyInStack,

    /// Modifier descriptor table breaks a uniqueness rule.
    #[error("invalid modifier table: {reason}")]
    InvalidDescriptor { reason: String },

    /// TOML binding configuration could not be read.
    #[error("TOML error: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for KeymapError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e.to_string())
    }
}

impl From<toml::ser::Error> for KeymapError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Toml(e.to_string())
    }
}

/// Result type for keymap operations.
pub type Result<T> = std::result::Result<T, KeymapError>;
