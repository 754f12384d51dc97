//! Chord display formatting.

use crate::chord::ChordSpec;
use serde::{Deserialize, Serialize};

/// Format for displaying chords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyDisplayFormat {
    /// Unicode symbols: ⌃⇧S, ⌥↑
    #[default]
    Symbolic,
    /// Text labels: Ctrl+Shift+S, Alt+Up
    Text,
}

/// Configuration for chord display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDisplayConfig {
    /// Display format
    #[serde(default)]
    pub format: KeyDisplayFormat,
}

impl KeyDisplayConfig {
    /// Create a symbolic display config.
    pub fn symbolic() -> Self {
        Self {
            format: KeyDisplayFormat::Symbolic,
        }
    }

    /// Create a text display config.
    pub fn text() -> Self {
        Self {
            format: KeyDisplayFormat::Text,
        }
    }

    /// Format a single chord.
    pub fn format_chord(&self, chord: &ChordSpec) -> String {
        match self.format {
            KeyDisplayFormat::Symbolic => chord.glyphs().to_string(),
            KeyDisplayFormat::Text => {
                let mut parts: Vec<String> = chord
                    .modifiers()
                    .iter()
                    .map(|m| m.descriptor().label.to_string())
                    .collect();
                parts.push(key_label(chord.key()));
                parts.join("+")
            }
        }
    }

    /// Format a chord sequence, chords separated by a space.
    pub fn format_sequence(&self, chords: &[ChordSpec]) -> String {
        chords
            .iter()
            .map(|c| self.format_chord(c))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Symbolic glyph for a key (without modifiers).
pub fn key_glyph(key: &str) -> String {
    match key.to_lowercase().as_str() {
        "arrowleft" => "\u{2190}".to_string(),
        "arrowup" => "\u{2191}".to_string(),
        "arrowright" => "\u{2192}".to_string(),
        "arrowdown" => "\u{2193}".to_string(),
        "enter" => "Enter".to_string(),
        "backspace" => "Backspace".to_string(),
        "delete" => "Delete".to_string(),
        _ if is_ascii_letter(key) || is_function_key(key) => key.to_uppercase(),
        _ => key.to_string(),
    }
}

/// Text label for a key (without modifiers).
pub fn key_label(key: &str) -> String {
    match key.to_lowercase().as_str() {
        "arrowleft" => "Left".to_string(),
        "arrowup" => "Up".to_string(),
        "arrowright" => "Right".to_string(),
        "arrowdown" => "Down".to_string(),
        " " => "Space".to_string(),
        _ if is_ascii_letter(key) || is_function_key(key) => key.to_uppercase(),
        _ => key.to_string(),
    }
}

fn is_ascii_letter(key: &str) -> bool {
    key.len() == 1 && key.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_function_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some('f' | 'F'))
        && (2..=3).contains(&key.len())
        && chars.all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::{KeyConfig, Platform};

    fn chord(s: &str) -> ChordSpec {
        ChordSpec::parse(s, &KeyConfig::for_platform(Platform::Other)).unwrap()
    }

    #[test]
    fn test_key_glyphs() {
        assert_eq!(key_glyph("ArrowUp"), "\u{2191}");
        assert_eq!(key_glyph("a"), "A");
        assert_eq!(key_glyph("f12"), "F12");
        assert_eq!(key_glyph("Enter"), "Enter");
        assert_eq!(key_glyph("#"), "#");
        assert_eq!(key_glyph("fa"), "fa");
    }

    #[test]
    fn test_text_format() {
        let config = KeyDisplayConfig::text();

        insta::assert_snapshot!(config.format_chord(&chord("shift+ctrl+s")), @"Ctrl+Shift+S");
        insta::assert_snapshot!(config.format_chord(&chord("alt-up")), @"Alt+Up");
        insta::assert_snapshot!(
            config.format_sequence(&[chord("Ctrl-x"), chord("Ctrl-s")]),
            @"Ctrl+X Ctrl+S"
        );
    }

    #[test]
    fn test_symbolic_format() {
        let config = KeyDisplayConfig::symbolic();

        assert_eq!(config.format_chord(&chord("ctrl+shift+s")), "\u{2303}\u{21e7}S");
        assert_eq!(config.format_chord(&chord("cmd+alt+down")), "\u{2318}\u{2325}\u{2193}");
    }
}
