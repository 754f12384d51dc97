//! Host key events.
//!
//! A [`KeyEvent`] is what the host hands the sequence manager for every key press:
//! a key identifier in the style of the DOM `KeyboardEvent.key` (`"a"`, `"A"`,
//! `"Enter"`, `"ArrowUp"`, `"F5"`) plus the four modifier bits. The manager marks
//! events it consumes with [`KeyEvent::prevent_default`] and
//! [`KeyEvent::stop_propagation`]; the host decides what that means.

use crate::modifier::Modifier;
use crossterm::event::{
    KeyCode as CtKeyCode, KeyEvent as CtKeyEvent, KeyModifiers as CtKeyModifiers, ModifierKeyCode,
};

/// Key identifiers that are pure modifier presses.
pub const MODIFIER_KEYS: [&str; 15] = [
    "Alt",
    "AltGraph",
    "CapsLock",
    "Control",
    "Fn",
    "FnLock",
    "Hyper",
    "Meta",
    "NumLock",
    "ScrollLock",
    "Shift",
    "Super",
    "Symbol",
    "SymbolLock",
    "OS",
];

/// Check if a key identifier names a pure modifier key.
pub fn is_modifier_key(key: &str) -> bool {
    MODIFIER_KEYS.contains(&key)
}

/// A key press delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    /// Key identifier
    pub key: String,
    /// Meta/Cmd/Super held
    pub meta: bool,
    /// Control held
    pub ctrl: bool,
    /// Shift held
    pub shift: bool,
    /// Alt/Option held
    pub alt: bool,
    /// Identifier of the element that had focus
    pub target: Option<String>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl KeyEvent {
    /// Create an event with no modifiers.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Set a modifier bit.
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        match modifier {
            Modifier::Meta => self.meta = true,
            Modifier::Ctrl => self.ctrl = true,
            Modifier::Shift => self.shift = true,
            Modifier::Alt => self.alt = true,
        }
        self
    }

    /// Set the Control bit.
    pub fn ctrl(self) -> Self {
        self.with_modifier(Modifier::Ctrl)
    }

    /// Set the Alt bit.
    pub fn alt(self) -> Self {
        self.with_modifier(Modifier::Alt)
    }

    /// Set the Shift bit.
    pub fn shift(self) -> Self {
        self.with_modifier(Modifier::Shift)
    }

    /// Set the Meta bit.
    pub fn meta(self) -> Self {
        self.with_modifier(Modifier::Meta)
    }

    /// Set the event target.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Read a modifier bit.
    pub fn has(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Meta => self.meta,
            Modifier::Ctrl => self.ctrl,
            Modifier::Shift => self.shift,
            Modifier::Alt => self.alt,
        }
    }

    /// Check if this is a pure modifier press.
    pub fn is_modifier_key(&self) -> bool {
        is_modifier_key(&self.key)
    }

    /// Suppress the host's native handling.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Stop other host handlers from seeing the event.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Both `prevent_default` and `stop_propagation` were called.
    pub fn is_suppressed(&self) -> bool {
        self.default_prevented && self.propagation_stopped
    }
}

impl From<CtKeyEvent> for KeyEvent {
    fn from(event: CtKeyEvent) -> Self {
        let mut shift = event.modifiers.contains(CtKeyModifiers::SHIFT);
        if event.code == CtKeyCode::BackTab {
            shift = true;
        }

        Self {
            key: key_identifier(event.code),
            meta: event.modifiers.intersects(CtKeyModifiers::SUPER | CtKeyModifiers::META),
            ctrl: event.modifiers.contains(CtKeyModifiers::CONTROL),
            shift,
            alt: event.modifiers.contains(CtKeyModifiers::ALT),
            ..Self::default()
        }
    }
}

/// Map a crossterm key code to a key identifier.
pub fn key_identifier(code: CtKeyCode) -> String {
    match code {
        CtKeyCode::Char(c) => c.to_string(),
        CtKeyCode::Enter => "Enter".to_string(),
        CtKeyCode::Esc => "Escape".to_string(),
        CtKeyCode::Tab | CtKeyCode::BackTab => "Tab".to_string(),
        CtKeyCode::Backspace => "Backspace".to_string(),
        CtKeyCode::Delete => "Delete".to_string(),
        CtKeyCode::Insert => "Insert".to_string(),
        CtKeyCode::Up => "ArrowUp".to_string(),
        CtKeyCode::Down => "ArrowDown".to_string(),
        CtKeyCode::Left => "ArrowLeft".to_string(),
        CtKeyCode::Right => "ArrowRight".to_string(),
        CtKeyCode::Home => "Home".to_string(),
        CtKeyCode::End => "End".to_string(),
        CtKeyCode::PageUp => "PageUp".to_string(),
        CtKeyCode::PageDown => "PageDown".to_string(),
        CtKeyCode::F(n) => format!("F{}", n),
        CtKeyCode::CapsLock => "CapsLock".to_string(),
        CtKeyCode::ScrollLock => "ScrollLock".to_string(),
        CtKeyCode::NumLock => "NumLock".to_string(),
        CtKeyCode::PrintScreen => "PrintScreen".to_string(),
        CtKeyCode::Pause => "Pause".to_string(),
        CtKeyCode::Menu => "ContextMenu".to_string(),
        CtKeyCode::KeypadBegin => "Clear".to_string(),
        CtKeyCode::Modifier(m) => modifier_identifier(m).to_string(),
        CtKeyCode::Media(_) | CtKeyCode::Null => "Unidentified".to_string(),
    }
}

fn modifier_identifier(code: ModifierKeyCode) -> &'static str {
    match code {
        ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => "Shift",
        ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => "Control",
        ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => "Alt",
        ModifierKeyCode::LeftSuper | ModifierKeyCode::RightSuper => "Super",
        ModifierKeyCode::LeftHyper | ModifierKeyCode::RightHyper => "Hyper",
        ModifierKeyCode::LeftMeta | ModifierKeyCode::RightMeta => "Meta",
        ModifierKeyCode::IsoLevel3Shift => "AltGraph",
        ModifierKeyCode::IsoLevel5Shift => "Shift",
    }
}
