//! Built-in binding presets.

use crate::error::Result;
use crate::modifier::KeyConfig;
use crate::table::BindingTable;
use serde::{Deserialize, Serialize};

/// Built-in binding presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeymapPreset {
    /// Notebook editor defaults: `CmdOrCtrl` chords plus `Alt-T`/`Alt-V` prefixes
    #[default]
    Global,
    /// Emacs-style `Ctrl-x` sequences; use instead of `Global`, not on top of it
    Emacs,
}

impl KeymapPreset {
    /// The preset's declarative bindings.
    pub fn bindings(&self) -> &'static [(&'static str, &'static [&'static str])] {
        match self {
            Self::Global => GLOBAL_BINDINGS,
            Self::Emacs => EMACS_BINDINGS,
        }
    }

    /// Compile the preset.
    pub fn load(&self, config: &KeyConfig) -> Result<BindingTable> {
        BindingTable::new(
            self.bindings()
                .iter()
                .map(|(command, seqs)| (*command, seqs.iter().copied())),
            config,
        )
    }
}

const GLOBAL_BINDINGS: &[(&str, &[&str])] = &[
    ("reset", &["CmdOrCtrl-Shift-#"]),
    ("reset-all", &["CmdOrCtrl-Alt-Shift-#"]),
    ("clear-all", &["CmdOrCtrl-Shift-!"]),
    // Clipboard
    ("cut", &["CmdOrCtrl-X"]),
    ("copy", &["CmdOrCtrl-C"]),
    ("paste", &["CmdOrCtrl-V"]),
    // File
    ("save", &["CmdOrCtrl-S"]),
    ("save-as", &["CmdOrCtrl-Shift-S"]),
    ("export", &["CmdOrCtrl-Shift-E"]),
    ("toggle-auto-eval", &["CmdOrCtrl-Shift-A"]),
    ("settings", &["CmdOrCtrl-,"]),
    // Evaluation
    ("eval", &["CmdOrCtrl-Enter"]),
    ("eval-and-refocus", &["Shift-Enter"]),
    ("eval-before", &["CmdOrCtrl-Shift-Enter"]),
    ("eval-all", &["CmdOrCtrl-Shift-Alt-Enter"]),
    ("stop", &["CmdOrCtrl-Shift-$"]),
    ("stop-all", &["CmdOrCtrl-Shift-Alt-$"]),
    // Cells
    ("focus-up", &["Alt-Up"]),
    ("focus-down", &["Alt-Down"]),
    ("move-up", &["CmdOrCtrl-Alt-Up"]),
    ("move-down", &["CmdOrCtrl-Alt-Down"]),
    ("add-before", &["CmdOrCtrl-Alt-Shift-Up"]),
    ("add-after", &["CmdOrCtrl-Alt-Shift-Down"]),
    ("duplicate", &["CmdOrCtrl-Alt-Shift-:"]),
    ("delete", &["CmdOrCtrl-Alt-Backspace"]),
    // Cell type
    ("set-type-plain", &["Alt-T t", "Alt-T p"]),
    ("set-type-markdown", &["Alt-T m"]),
    ("set-type-tex", &["Alt-T x"]),
    ("set-type-javascript", &["Alt-T j"]),
    // View
    ("set-view-normal", &["Alt-V n"]),
    ("set-view-hide", &["Alt-V h"]),
    ("set-view-full", &["Alt-V f"]),
    ("set-view-none", &["Alt-V x"]),
    ("set-view-presentation", &["Alt-V p"]),
    ("help", &["F1"]),
];

const EMACS_BINDINGS: &[(&str, &[&str])] = &[
    ("quit", &["Ctrl-x Ctrl-c"]),
    ("save", &["Ctrl-x Ctrl-s"]),
    ("save-as", &["Ctrl-x Ctrl-w"]),
    ("find-file", &["Ctrl-x Ctrl-f"]),
    ("eval", &["Ctrl-c Ctrl-c"]),
    ("eval-all", &["Ctrl-c Ctrl-a"]),
    ("focus-up", &["Ctrl-p"]),
    ("focus-down", &["Ctrl-n"]),
    ("move-up", &["Alt-Up"]),
    ("move-down", &["Alt-Down"]),
    ("cut", &["Ctrl-w"]),
    ("copy", &["Alt-w"]),
    ("paste", &["Ctrl-y"]),
    ("help", &["Ctrl-h ?", "F1"]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::ChordSpec;
    use crate::modifier::Platform;
    use crate::table::TrieEntry;

    fn command(table: &BindingTable, seq: &str, config: &KeyConfig) -> Option<String> {
        let chords = ChordSpec::parse_sequence(seq, config).unwrap();
        match table.lookup(&chords) {
            Some(TrieEntry::Command(c)) => Some(c.clone()),
            _ => None,
        }
    }

    #[test]
    fn test_presets_compile() {
        for platform in [Platform::Apple, Platform::Other] {
            let config = KeyConfig::for_platform(platform);
            for preset in [KeymapPreset::Global, KeymapPreset::Emacs] {
                let table = preset.load(&config).unwrap();
                assert_eq!(table.bindings().len(), preset.bindings().len());
            }
        }
    }

    #[test]
    fn test_global_preset() {
        let apple = KeyConfig::for_platform(Platform::Apple);
        let table = KeymapPreset::Global.load(&apple).unwrap();
        assert_eq!(command(&table, "cmd+s", &apple).as_deref(), Some("save"));
        assert_eq!(command(&table, "Alt-t m", &apple).as_deref(), Some("set-type-markdown"));
        assert_eq!(command(&table, "ctrl+s", &apple), None);

        let other = KeyConfig::for_platform(Platform::Other);
        let table = KeymapPreset::Global.load(&other).unwrap();
        assert_eq!(command(&table, "ctrl+shift+#", &other).as_deref(), Some("reset"));
        assert_eq!(command(&table, "f1", &other).as_deref(), Some("help"));
    }

    #[test]
    fn test_emacs_preset() {
        let config = KeyConfig::for_platform(Platform::Other);
        let table = KeymapPreset::Emacs.load(&config).unwrap();
        assert_eq!(command(&table, "Ctrl-x Ctrl-c", &config).as_deref(), Some("quit"));
        assert_eq!(command(&table, "Ctrl-h ?", &config).as_deref(), Some("help"));
    }
}
