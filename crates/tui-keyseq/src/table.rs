//! Binding tables.
//!
//! A [`BindingTable`] compiles a declarative `{command -> [sequence...]}` map into an
//! immutable trie keyed by canonical chords:
//!
//! ```text
//! { "save": ["Ctrl-x Ctrl-s"], "open": ["Ctrl-o"] }
//!
//! "c+x" ─▶ { "c+s" ─▶ save }
//! "c+o" ─▶ open
//! ```
//!
//! Conflicts are rejected while building: a command can't sit where another
//! sequence needs a prefix, and two commands can't claim the same sequence.

use crate::chord::ChordSpec;
use crate::error::{KeymapError, Result};
use crate::matcher::{MatchNode, Recognizer};
use crate::modifier::{KeyConfig, SEQUENCE_SEPARATOR};
use std::collections::HashMap;
use std::sync::Arc;

/// One trie slot: a finished command or the next level of a longer sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrieEntry {
    Command(String),
    Prefix(Arc<Trie>),
}

/// One level of a compiled binding trie, keyed by canonical chord.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trie {
    entries: HashMap<String, TrieEntry>,
}

impl Trie {
    /// Look up a canonical chord.
    pub fn get(&self, canonical: &str) -> Option<&TrieEntry> {
        self.entries.get(canonical)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(canonical chord, entry)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrieEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Mutable trie used only while a table is being built.
#[derive(Default)]
struct TrieBuilder {
    entries: HashMap<String, BuildEntry>,
}

enum BuildEntry {
    Command(String),
    Prefix(TrieBuilder),
}

impl TrieBuilder {
    fn insert(&mut self, chords: &[&str], command: &str, config: &KeyConfig) -> Result<()> {
        let mut level = self;

        for (i, chord) in chords.iter().enumerate() {
            let canonical = ChordSpec::parse(chord, config)?.canonical().to_string();
            let is_last = i + 1 == chords.len();
            let conflict = || KeymapError::DuplicateBinding {
                sequence: chords[..=i].join(" "),
            };

            match level.entries.get(&canonical) {
                Some(BuildEntry::Command(_)) => return Err(conflict()),
                Some(BuildEntry::Prefix(_)) if is_last => return Err(conflict()),
                _ => {}
            }

            if is_last {
                level
                    .entries
                    .insert(canonical, BuildEntry::Command(command.to_string()));
                break;
            }

            level = match level
                .entries
                .entry(canonical)
                .or_insert_with(|| BuildEntry::Prefix(TrieBuilder::default()))
            {
                BuildEntry::Prefix(next) => next,
                BuildEntry::Command(_) => return Err(conflict()),
            };
        }

        Ok(())
    }

    fn freeze(self) -> Trie {
        let entries = self
            .entries
            .into_iter()
            .map(|(chord, entry)| {
                let entry = match entry {
                    BuildEntry::Command(command) => TrieEntry::Command(command),
                    BuildEntry::Prefix(next) => TrieEntry::Prefix(Arc::new(next.freeze())),
                };
                (chord, entry)
            })
            .collect();
        Trie { entries }
    }
}

/// An immutable set of bindings plus an optional dynamic recognizer.
#[derive(Debug, Clone)]
pub struct BindingTable {
    bindings: Vec<(String, Vec<String>)>,
    recognizer: Option<Recognizer>,
    trie: Arc<Trie>,
}

impl BindingTable {
    /// Compile a binding table.
    ///
    /// Each command maps to any number of sequences; a sequence is one or more
    /// chord strings separated by a single space.
    pub fn new<I, C, Q, S>(bindings: I, config: &KeyConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (C, Q)>,
        C: Into<String>,
        Q: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bindings: Vec<(String, Vec<String>)> = bindings
            .into_iter()
            .map(|(command, sequences)| {
                (
                    command.into(),
                    sequences.into_iter().map(Into::into).collect(),
                )
            })
            .collect();

        let mut root = TrieBuilder::default();
        for (command, sequences) in &bindings {
            if command.is_empty() {
                return Err(KeymapError::EmptyCommand);
            }
            for sequence in sequences {
                let chords: Vec<&str> = sequence.split(SEQUENCE_SEPARATOR).collect();
                root.insert(&chords, command, config)?;
            }
        }

        Ok(Self {
            bindings,
            recognizer: None,
            trie: Arc::new(root.freeze()),
        })
    }

    /// A table with no static bindings.
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
            recognizer: None,
            trie: Arc::new(Trie::default()),
        }
    }

    /// Attach a recognizer that is consulted before the static bindings.
    pub fn with_recognizer(mut self, recognizer: Recognizer) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// The declared bindings, in declaration order.
    pub fn bindings(&self) -> &[(String, Vec<String>)] {
        &self.bindings
    }

    pub fn recognizer(&self) -> Option<&Recognizer> {
        self.recognizer.as_ref()
    }

    /// Root level of the compiled trie.
    pub fn trie(&self) -> &Arc<Trie> {
        &self.trie
    }

    /// Sequences bound to a command.
    pub fn sequences_for(&self, command: &str) -> &[String] {
        self.bindings
            .iter()
            .find(|(c, _)| c == command)
            .map(|(_, seqs)| seqs.as_slice())
            .unwrap_or(&[])
    }

    /// Walk the trie along `chords`.
    pub fn lookup(&self, chords: &[ChordSpec]) -> Option<&TrieEntry> {
        let (last, prefix) = chords.split_last()?;
        let mut level: &Trie = &self.trie;
        for chord in prefix {
            match level.get(chord.canonical())? {
                TrieEntry::Prefix(next) => level = next.as_ref(),
                TrieEntry::Command(_) => return None,
            }
        }
        level.get(last.canonical())
    }

    /// Wrap this table in a match node, optionally falling back to another node.
    pub fn create_mapper(&self, fallback: Option<MatchNode>) -> MatchNode {
        MatchNode::with_trie(self.trie.clone(), self.recognizer.clone(), fallback)
    }

    /// Compose tables into one match node; the first table has the highest
    /// precedence, the last the lowest.
    pub fn compose<'a, I>(tables: I) -> Result<MatchNode>
    where
        I: IntoIterator<Item = &'a BindingTable>,
        I::IntoIter: DoubleEndedIterator,
    {
        tables
            .into_iter()
            .rev()
            .fold(None, |fallback, table| Some(table.create_mapper(fallback)))
            .ok_or(KeymapError::NoTables)
    }
}
