//! Modifier descriptors, flags and platform configuration.

use crate::error::{KeymapError, Result};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Separator between modifier codes and key in a canonical chord.
pub const CANONICAL_KEY_SEPARATOR: char = '+';

/// Separator between chords in a sequence.
pub const SEQUENCE_SEPARATOR: char = ' ';

/// One of the four canonical modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Meta,
    Ctrl,
    Shift,
    Alt,
}

/// Static description of a modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierDescriptor {
    /// Canonical modifier
    pub modifier: Modifier,
    /// Canonical lowercase name
    pub name: &'static str,
    /// Single-character code used in canonical chords
    pub code: char,
    /// Name of the boolean on a key event carrying this modifier
    pub event_bit: &'static str,
    /// Symbolic glyph
    pub glyph: &'static str,
    /// Text label
    pub label: &'static str,
    /// Rank in canonical/display ordering (lower first)
    pub display_order: u8,
    /// Lowercase alternate names
    pub aliases: &'static [&'static str],
}

/// The fixed descriptor table, in event scan order.
pub const MODIFIERS: [ModifierDescriptor; 4] = [
    ModifierDescriptor {
        modifier: Modifier::Meta,
        name: "meta",
        code: 'm',
        event_bit: "metaKey",
        glyph: "\u{2318}",
        label: "Meta",
        display_order: 3,
        aliases: &["cmd", "command"],
    },
    ModifierDescriptor {
        modifier: Modifier::Ctrl,
        name: "ctrl",
        code: 'c',
        event_bit: "ctrlKey",
        glyph: "\u{2303}",
        label: "Ctrl",
        display_order: 1,
        aliases: &["control"],
    },
    ModifierDescriptor {
        modifier: Modifier::Shift,
        name: "shift",
        code: 's',
        event_bit: "shiftKey",
        glyph: "\u{21e7}",
        label: "Shift",
        display_order: 2,
        aliases: &[],
    },
    ModifierDescriptor {
        modifier: Modifier::Alt,
        name: "alt",
        code: 'a',
        event_bit: "altKey",
        glyph: "\u{2325}",
        label: "Alt",
        display_order: 4,
        aliases: &[],
    },
];

/// Virtual aliases resolved through the platform.
const CMD_OR_CTRL: [&str; 2] = ["cmdorctrl", "commandorctrl"];

impl Modifier {
    /// All modifiers in event scan order.
    pub const ALL: [Modifier; 4] = [Modifier::Meta, Modifier::Ctrl, Modifier::Shift, Modifier::Alt];

    /// Descriptor for this modifier.
    pub fn descriptor(self) -> &'static ModifierDescriptor {
        match self {
            Modifier::Meta => &MODIFIERS[0],
            Modifier::Ctrl => &MODIFIERS[1],
            Modifier::Shift => &MODIFIERS[2],
            Modifier::Alt => &MODIFIERS[3],
        }
    }

    /// Canonical code character.
    pub fn code(self) -> char {
        self.descriptor().code
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Flag bit for this modifier.
    pub fn flag(self) -> ModifierFlags {
        match self {
            Modifier::Meta => ModifierFlags::META,
            Modifier::Ctrl => ModifierFlags::CTRL,
            Modifier::Shift => ModifierFlags::SHIFT,
            Modifier::Alt => ModifierFlags::ALT,
        }
    }

    /// Resolve a (case-insensitive) modifier token.
    ///
    /// `cmdorctrl` and `commandorctrl` resolve through the platform in `config`.
    pub fn resolve(token: &str, config: &KeyConfig) -> Option<Modifier> {
        let token = token.to_lowercase();
        if CMD_OR_CTRL.contains(&token.as_str()) {
            return Some(config.cmd_or_ctrl());
        }
        MODIFIERS
            .iter()
            .find(|d| d.name == token || d.aliases.contains(&token.as_str()))
            .map(|d| d.modifier)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Modifier bitmask, one bit per canonical modifier.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModifierFlags: u8 {
        const META = 0b0001;
        const CTRL = 0b0010;
        const SHIFT = 0b0100;
        const ALT = 0b1000;
    }
}

impl ModifierFlags {
    /// No modifiers held.
    pub const NONE: ModifierFlags = ModifierFlags::empty();
}

impl FromIterator<Modifier> for ModifierFlags {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ModifierFlags::NONE, |flags, m| flags | m.flag())
    }
}

/// Host platform family, as far as modifier aliasing cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// macOS / iOS: `cmdorctrl` means Meta
    Apple,
    /// Everything else: `cmdorctrl` means Ctrl
    #[default]
    Other,
}

impl Platform {
    /// Probe the platform this crate was compiled for.
    pub fn detect() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Platform::Apple
        } else {
            Platform::Other
        }
    }
}

/// Immutable configuration passed to every chord parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyConfig {
    platform: Platform,
}

impl KeyConfig {
    /// Configuration for the detected host platform.
    pub fn detect() -> Self {
        Self::for_platform(Platform::detect())
    }

    /// Configuration for an explicit platform.
    pub const fn for_platform(platform: Platform) -> Self {
        Self { platform }
    }

    /// The configured platform.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// What `cmdorctrl` resolves to.
    pub fn cmd_or_ctrl(&self) -> Modifier {
        match self.platform {
            Platform::Apple => Modifier::Meta,
            Platform::Other => Modifier::Ctrl,
        }
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self::detect()
    }
}

/// Check the uniqueness invariants of a descriptor table.
///
/// Reports the first violation found.
pub fn validate_descriptors(descriptors: &[ModifierDescriptor]) -> Result<()> {
    let invalid = |reason: String| Err(KeymapError::InvalidDescriptor { reason });

    let mut names = HashSet::new();
    for desc in descriptors {
        for name in std::iter::once(&desc.name).chain(desc.aliases.iter()) {
            if *name != name.to_lowercase() {
                return invalid(format!("modifier name {name:?} must be lowercase"));
            }
            if !names.insert(*name) {
                return invalid(format!("modifier name {name:?} is not distinct"));
            }
        }
    }

    let mut codes = HashSet::new();
    for desc in descriptors {
        if ['+', '-', CANONICAL_KEY_SEPARATOR, SEQUENCE_SEPARATOR].contains(&desc.code) {
            return invalid(format!("modifier code {:?} is reserved", desc.code));
        }
        if !codes.insert(desc.code) {
            return invalid(format!("modifier code {:?} is not distinct", desc.code));
        }
    }

    let mut bits = HashSet::new();
    for desc in descriptors {
        if !bits.insert(desc.event_bit) {
            return invalid(format!("event bit {:?} is not distinct", desc.event_bit));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        assert_eq!(validate_descriptors(&MODIFIERS), Ok(()));
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let mut table = MODIFIERS;
        table[3].aliases = &["control"];
        assert!(validate_descriptors(&table).is_err());
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut table = MODIFIERS;
        table[3].code = 'c';
        assert_eq!(
            validate_descriptors(&table),
            Err(KeymapError::InvalidDescriptor {
                reason: "modifier code 'c' is not distinct".to_string()
            })
        );
    }

    #[test]
    fn test_reserved_code_rejected() {
        let mut table = MODIFIERS;
        table[0].code = '+';
        let err = validate_descriptors(&table).unwrap_err();
        insta::assert_snapshot!(err, @"invalid modifier table: modifier code '+' is reserved");

        let mut table = MODIFIERS;
        table[2].code = ' ';
        assert!(validate_descriptors(&table).is_err());
    }

    #[test]
    fn test_duplicate_event_bit_rejected() {
        let mut table = MODIFIERS;
        table[3].event_bit = "ctrlKey";
        assert_eq!(
            validate_descriptors(&table),
            Err(KeymapError::InvalidDescriptor {
                reason: "event bit \"ctrlKey\" is not distinct".to_string()
            })
        );
    }

    #[test]
    fn test_uppercase_name_rejected() {
        let mut table = MODIFIERS;
        table[1].name = "Ctrl";
        assert!(matches!(
            validate_descriptors(&table),
            Err(KeymapError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_resolve_aliases() {
        let config = KeyConfig::for_platform(Platform::Other);
        assert_eq!(Modifier::resolve("CMD", &config), Some(Modifier::Meta));
        assert_eq!(Modifier::resolve("Command", &config), Some(Modifier::Meta));
        assert_eq!(Modifier::resolve("control", &config), Some(Modifier::Ctrl));
        assert_eq!(Modifier::resolve("Shift", &config), Some(Modifier::Shift));
        assert_eq!(Modifier::resolve("super", &config), None);
    }

    #[test]
    fn test_cmd_or_ctrl_follows_platform() {
        let apple = KeyConfig::for_platform(Platform::Apple);
        let other = KeyConfig::for_platform(Platform::Other);
        assert_eq!(Modifier::resolve("CmdOrCtrl", &apple), Some(Modifier::Meta));
        assert_eq!(Modifier::resolve("commandorctrl", &other), Some(Modifier::Ctrl));
        assert_eq!(apple.platform(), Platform::Apple);
        assert_eq!(other.platform(), Platform::Other);
        assert_eq!(KeyConfig::detect().platform(), Platform::detect());
    }

    #[test]
    fn test_flags() {
        let flags: ModifierFlags = [Modifier::Shift, Modifier::Ctrl].into_iter().collect();
        assert!(flags.contains(ModifierFlags::CTRL));
        assert!(flags.contains(ModifierFlags::SHIFT));
        assert!(!flags.contains(ModifierFlags::ALT));
        assert_eq!(flags.difference(ModifierFlags::SHIFT), ModifierFlags::CTRL);
        assert_eq!(flags.bits(), 0b0110);
        assert_eq!(flags, ModifierFlags::CTRL | ModifierFlags::SHIFT);

        let none: ModifierFlags = std::iter::empty::<Modifier>().collect();
        assert_eq!(none, ModifierFlags::NONE);
        assert!(none.is_empty());
    }
}
