//! Chord parsing and canonicalization.

use crate::display::key_glyph;
use crate::error::{KeymapError, Result};
use crate::event::KeyEvent;
use crate::modifier::{
    KeyConfig, Modifier, ModifierFlags, CANONICAL_KEY_SEPARATOR, SEQUENCE_SEPARATOR,
};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;
use unicode_general_category::{get_general_category, GeneralCategory};

/// One parsed chord: zero or more modifiers plus a key.
///
/// Supported formats:
/// - `"a"`, `"A"`, `"Enter"`, `"F5"` - a bare key
/// - `"ctrl+s"`, `"Ctrl-s"`, `"CTRL+S"` - modifiers joined with `+` or `-`
/// - `"CmdOrCtrl-S"` - Meta on Apple platforms, Ctrl elsewhere
/// - `"alt-up"` - `up`/`down`/`left`/`right` become `ArrowUp` etc.
/// - `"-"`, `"+"`, `"shift++"`, `"ctrl--"` - a delimiter as the key
///
/// Two chords are equal when their canonical forms are equal. Fields are only
/// reachable through accessors, so a `ChordSpec` never changes after parsing.
#[derive(Debug, Clone)]
pub struct ChordSpec {
    raw: String,
    key: String,
    modifiers: Vec<Modifier>,
    modifier_flags: ModifierFlags,
    canonical_modifiers: String,
    canonical: String,
    printable: bool,
    event: Option<KeyEvent>,
    glyphs: OnceLock<String>,
}

impl ChordSpec {
    /// Parse a chord string.
    pub fn parse(chord: &str, config: &KeyConfig) -> Result<Self> {
        Self::build(chord, config, None)
    }

    /// Build a chord from a host key press.
    ///
    /// The event is kept as context so recognizers and command handlers can see it.
    pub fn from_event(event: &KeyEvent, config: &KeyConfig) -> Result<Self> {
        let mut parts: Vec<&str> = Modifier::ALL
            .iter()
            .filter(|m| event.has(**m))
            .map(|m| m.name())
            .collect();
        parts.push(&event.key);
        let raw = parts.join("+");
        Self::build(&raw, config, Some(event.clone()))
    }

    /// Parse a space-separated chord sequence such as `"Ctrl-x Ctrl-s"`.
    pub fn parse_sequence(sequence: &str, config: &KeyConfig) -> Result<Vec<Self>> {
        sequence
            .split(SEQUENCE_SEPARATOR)
            .map(|chord| Self::parse(chord, config))
            .collect()
    }

    fn build(raw: &str, config: &KeyConfig, event: Option<KeyEvent>) -> Result<Self> {
        if raw.is_empty() {
            return Err(KeymapError::EmptyChord);
        }

        let tokens = tokenize(raw)?;
        let Some((key_token, modifier_tokens)) = tokens.split_last() else {
            return Err(KeymapError::Syntax {
                chord: raw.to_string(),
            });
        };

        let mut modifiers: Vec<Modifier> = Vec::with_capacity(modifier_tokens.len());
        for token in modifier_tokens {
            let modifier =
                Modifier::resolve(token, config).ok_or_else(|| KeymapError::UnknownModifier {
                    modifier: token.to_lowercase(),
                    chord: raw.to_string(),
                })?;
            if modifiers.contains(&modifier) {
                return Err(KeymapError::DuplicateModifier {
                    modifier: token.to_lowercase(),
                    chord: raw.to_string(),
                });
            }
            modifiers.push(modifier);
        }
        modifiers.sort_by_key(|m| m.descriptor().display_order);

        let key = normalize_key(key_token);
        let modifier_flags: ModifierFlags = modifiers.iter().copied().collect();
        let canonical_modifiers: String = modifiers.iter().map(|m| m.code()).collect();

        // any modifier other than shift makes the chord non-printable
        let printable = modifier_flags.difference(ModifierFlags::SHIFT).is_empty()
            && is_single_printable(&key);

        let canonical_key = if printable {
            key.clone()
        } else {
            key.to_lowercase()
        };
        let canonical = format!("{canonical_modifiers}{CANONICAL_KEY_SEPARATOR}{canonical_key}");

        Ok(Self {
            raw: raw.to_string(),
            key,
            modifiers,
            modifier_flags,
            canonical_modifiers,
            canonical,
            printable,
            event,
            glyphs: OnceLock::new(),
        })
    }

    /// The string this chord was parsed from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The key, with its original case.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resolved modifiers in display order.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn modifier_flags(&self) -> ModifierFlags {
        self.modifier_flags
    }

    /// Modifier codes in display order, e.g. `"cs"` for Ctrl+Shift.
    pub fn canonical_modifiers(&self) -> &str {
        &self.canonical_modifiers
    }

    /// Normalized form used as a trie key, e.g. `"cs+s"`.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// True when the chord would insert a character: no modifier other than
    /// shift, and a single non-control character as the key.
    pub fn is_printable(&self) -> bool {
        self.printable
    }

    /// The host event this chord was built from, if any.
    pub fn event(&self) -> Option<&KeyEvent> {
        self.event.as_ref()
    }

    /// Check if a modifier is part of this chord.
    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifier_flags.contains(modifier.flag())
    }

    /// Human-readable symbolic label, e.g. `⌃⇧S`.
    pub fn glyphs(&self) -> &str {
        self.glyphs.get_or_init(|| {
            let mut label: String = self
                .modifiers
                .iter()
                .map(|m| m.descriptor().glyph)
                .collect();
            label.push_str(&key_glyph(&self.key));
            label
        })
    }
}

/// Split a chord string into modifier tokens followed by the key token.
fn tokenize(raw: &str) -> Result<Vec<&str>> {
    let mut tokens: Vec<&str> = raw.split(|c| c == '+' || c == '-').collect();

    if tokens.iter().any(|t| t.is_empty()) {
        if raw == "+" || raw == "-" {
            tokens = vec![raw];
        } else if ends_with_two_delimiters(raw) {
            // "shift++": drop the trailing empty token, the delimiter is the key
            tokens.pop();
            if let Some(last) = tokens.last_mut() {
                *last = &raw[raw.len() - 1..];
            }
        }

        if tokens.iter().any(|t| t.is_empty()) {
            return Err(KeymapError::Syntax {
                chord: raw.to_string(),
            });
        }
    }

    Ok(tokens)
}

fn ends_with_two_delimiters(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 2
        && bytes[bytes.len() - 2..]
            .iter()
            .all(|b| *b == b'+' || *b == b'-')
}

fn normalize_key(key: &str) -> String {
    match key.to_lowercase().as_str() {
        "up" => "ArrowUp".to_string(),
        "down" => "ArrowDown".to_string(),
        "left" => "ArrowLeft".to_string(),
        "right" => "ArrowRight".to_string(),
        _ => key.to_string(),
    }
}

/// One char outside the Unicode "Other" categories (Cc, Cf, Cs, Co, Cn).
fn is_single_printable(key: &str) -> bool {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => !matches!(
            get_general_category(c),
            GeneralCategory::Control
                | GeneralCategory::Format
                | GeneralCategory::Surrogate
                | GeneralCategory::PrivateUse
                | GeneralCategory::Unassigned
        ),
        _ => false,
    }
}

impl PartialEq for ChordSpec {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for ChordSpec {}

impl Hash for ChordSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for ChordSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for ChordSpec {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, &KeyConfig::default())
    }
}
