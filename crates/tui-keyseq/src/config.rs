//! Keymap configuration files.
//!
//! ```toml
//! platform = "apple"
//!
//! [bindings]
//! save = ["CmdOrCtrl-S", "Ctrl-x Ctrl-s"]
//! set-type-markdown = ["Alt-T m"]
//! ```

use crate::error::Result;
use crate::modifier::{KeyConfig, Platform};
use crate::table::BindingTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declarative keymap: a command-to-sequences map plus an optional platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Platform for `CmdOrCtrl`; detected when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Command name to chord sequences
    #[serde(default)]
    pub bindings: BTreeMap<String, Vec<String>>,
}

impl KeymapConfig {
    /// Parse from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Add a binding, appending to any sequences the command already has.
    pub fn bind(mut self, command: impl Into<String>, sequence: impl Into<String>) -> Self {
        self.bindings
            .entry(command.into())
            .or_default()
            .push(sequence.into());
        self
    }

    /// The parser configuration this file asks for.
    pub fn key_config(&self) -> KeyConfig {
        self.platform
            .map(KeyConfig::for_platform)
            .unwrap_or_default()
    }

    /// Compile the bindings.
    pub fn build_table(&self) -> Result<BindingTable> {
        BindingTable::new(
            self.bindings
                .iter()
                .map(|(command, seqs)| (command.as_str(), seqs.iter().map(String::as_str))),
            &self.key_config(),
        )
    }
}

impl BindingTable {
    /// Parse and compile a TOML keymap.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        KeymapConfig::from_toml_str(s)?.build_table()
    }
}
