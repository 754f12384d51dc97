//! The runtime recognition automaton.
//!
//! A [`MatchNode`] wraps one trie level, an optional [`Recognizer`] and an optional
//! fallback node. Composing overlays chains nodes through their fallbacks; the
//! chain is persistent and shared, nothing in it is ever mutated.

use crate::chord::ChordSpec;
use crate::error::{KeymapError, Result};
use crate::modifier::KeyConfig;
use crate::table::{Trie, TrieEntry};
use std::fmt;
use std::sync::Arc;

type RecognizeFn = dyn Fn(&ChordSpec) -> Option<String> + Send + Sync;

/// A dynamic matcher consulted before the static trie.
///
/// Returning `Some(command)` wins over every static binding and every fallback.
#[derive(Clone)]
pub struct Recognizer(Arc<RecognizeFn>);

impl Recognizer {
    /// Wrap a recognizer function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ChordSpec) -> Option<String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Recognize every printable chord as `command`, e.g. `"insert-self"`.
    ///
    /// The chord keeps the originating key event, so the handler can read
    /// the character to insert from it.
    pub fn insert_self(command: impl Into<String>) -> Self {
        let command = command.into();
        Self::new(move |chord| chord.is_printable().then(|| command.clone()))
    }

    /// Run the recognizer.
    pub fn recognize(&self, chord: &ChordSpec) -> Option<String> {
        (self.0)(chord)
    }
}

impl fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Recognizer(..)")
    }
}

/// What a node does with a chord before asking its fallback.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Static lookup only
    Table(Arc<Trie>),
    /// Recognizer only; always paired with a fallback
    Recognizer(Recognizer),
    /// Recognizer first, then static lookup
    Hybrid {
        trie: Arc<Trie>,
        recognizer: Recognizer,
    },
    /// Nothing local; everything goes to the fallback
    Fallthrough,
}

/// Result of feeding one chord to a node.
#[derive(Debug, Clone)]
pub enum Consumed {
    /// The sequence is complete
    Command(String),
    /// The sequence may continue from this node
    Pending(MatchNode),
    /// The sequence has failed
    NoMatch,
}

impl Consumed {
    /// The command, if the sequence completed.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Command(command) => Some(command),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }

    /// The continuation node, if the sequence is still pending.
    pub fn into_node(self) -> Option<MatchNode> {
        match self {
            Self::Pending(node) => Some(node),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct NodeInner {
    kind: NodeKind,
    fallback: Option<MatchNode>,
}

/// One node of the recognition automaton.
///
/// Cloning is cheap; clones share the same node.
#[derive(Debug, Clone)]
pub struct MatchNode {
    inner: Arc<NodeInner>,
}

impl MatchNode {
    /// Build a node.
    ///
    /// At least one of `trie` and `fallback` must be present; a recognizer on its
    /// own is not enough.
    pub fn new(
        trie: Option<Arc<Trie>>,
        recognizer: Option<Recognizer>,
        fallback: Option<MatchNode>,
    ) -> Result<Self> {
        let kind = match (trie, recognizer) {
            (Some(trie), Some(recognizer)) => NodeKind::Hybrid { trie, recognizer },
            (Some(trie), None) => NodeKind::Table(trie),
            (None, Some(recognizer)) => NodeKind::Recognizer(recognizer),
            (None, None) => NodeKind::Fallthrough,
        };

        let has_trie = matches!(kind, NodeKind::Table(_) | NodeKind::Hybrid { .. });
        if !has_trie && fallback.is_none() {
            return Err(KeymapError::InvalidNode);
        }

        Ok(Self::from_parts(kind, fallback))
    }

    pub(crate) fn with_trie(
        trie: Arc<Trie>,
        recognizer: Option<Recognizer>,
        fallback: Option<MatchNode>,
    ) -> Self {
        let kind = match recognizer {
            Some(recognizer) => NodeKind::Hybrid { trie, recognizer },
            None => NodeKind::Table(trie),
        };
        Self::from_parts(kind, fallback)
    }

    fn from_parts(kind: NodeKind, fallback: Option<MatchNode>) -> Self {
        Self {
            inner: Arc::new(NodeInner { kind, fallback }),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.inner.kind
    }

    pub fn fallback(&self) -> Option<&MatchNode> {
        self.inner.fallback.as_ref()
    }

    /// This node's trie level, if it has one.
    pub fn trie(&self) -> Option<&Arc<Trie>> {
        match &self.inner.kind {
            NodeKind::Table(trie) | NodeKind::Hybrid { trie, .. } => Some(trie),
            NodeKind::Recognizer(_) | NodeKind::Fallthrough => None,
        }
    }

    pub fn recognizer(&self) -> Option<&Recognizer> {
        match &self.inner.kind {
            NodeKind::Recognizer(recognizer) | NodeKind::Hybrid { recognizer, .. } => {
                Some(recognizer)
            }
            NodeKind::Table(_) | NodeKind::Fallthrough => None,
        }
    }

    /// Number of nodes in the fallback chain, this one included.
    pub fn chain_len(&self) -> usize {
        1 + self.fallback().map_or(0, MatchNode::chain_len)
    }

    /// Check if two handles refer to the same node.
    pub fn ptr_eq(&self, other: &MatchNode) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Feed one chord to the automaton.
    ///
    /// Resolution order: recognizer, own trie, fallback. When neither completes a
    /// command but either can continue, the result is a node whose own level is
    /// this node's continuation and whose fallback is the fallback's continuation.
    pub fn consume(&self, chord: &ChordSpec) -> Consumed {
        if let Some(command) = self.recognizer().and_then(|r| r.recognize(chord)) {
            return Consumed::Command(command);
        }

        let own_next = match self.trie().and_then(|t| t.get(chord.canonical())) {
            Some(TrieEntry::Command(command)) => return Consumed::Command(command.clone()),
            Some(TrieEntry::Prefix(next)) => Some(next.clone()),
            None => None,
        };

        let fallback_next = match self.fallback().map(|f| f.consume(chord)) {
            Some(Consumed::Command(command)) => return Consumed::Command(command),
            Some(Consumed::Pending(node)) => Some(node),
            Some(Consumed::NoMatch) | None => None,
        };

        match (own_next, fallback_next) {
            (Some(trie), fallback) => Consumed::Pending(Self::with_trie(trie, None, fallback)),
            (None, Some(node)) => Consumed::Pending(node),
            (None, None) => Consumed::NoMatch,
        }
    }

    /// Parse `chord` and feed it to the automaton.
    pub fn consume_str(&self, chord: &str, config: &KeyConfig) -> Result<Consumed> {
        Ok(self.consume(&ChordSpec::parse(chord, config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::Platform;
    use crate::table::BindingTable;

    fn config() -> KeyConfig {
        KeyConfig::for_platform(Platform::Other)
    }

    fn table(bindings: &[(&str, &[&str])]) -> BindingTable {
        BindingTable::new(
            bindings.iter().map(|(c, seqs)| (*c, seqs.iter().copied())),
            &config(),
        )
        .unwrap()
    }

    /// Feed chords one at a time, as the manager would.
    fn run(node: &MatchNode, chords: &[&str]) -> Consumed {
        let mut current = Consumed::Pending(node.clone());
        for chord in chords {
            current = match current {
                Consumed::Pending(node) => node.consume_str(chord, &config()).unwrap(),
                done => return done,
            };
        }
        current
    }

    #[test]
    fn test_single_chord() {
        let node = table(&[("open", &["Ctrl-o"])]).create_mapper(None);
        assert_eq!(run(&node, &["ctrl+o"]).command(), Some("open"));
        assert!(run(&node, &["o"]).is_no_match());
    }

    #[test]
    fn test_multi_chord_progress() {
        let node = table(&[("save", &["Ctrl-x Ctrl-s"])]).create_mapper(None);

        let next = node.consume_str("Ctrl-x", &config()).unwrap();
        assert!(next.is_pending());
        let next = next.into_node().unwrap();
        assert_eq!(next.consume_str("Ctrl-s", &config()).unwrap().command(), Some("save"));
        assert!(next.consume_str("s", &config()).unwrap().is_no_match());
    }

    #[test]
    fn test_precedence() {
        let a = table(&[("cmdA", &["x"])]);
        let b = table(&[("cmdB", &["x"])]);

        let ab = BindingTable::compose([&a, &b]).unwrap();
        assert_eq!(ab.consume_str("x", &config()).unwrap().command(), Some("cmdA"));

        let ba = BindingTable::compose([&b, &a]).unwrap();
        assert_eq!(ba.consume_str("x", &config()).unwrap().command(), Some("cmdB"));
        assert_eq!(ba.chain_len(), 2);
    }

    #[test]
    fn test_fallback_terminal_beats_own_prefix() {
        // own level only continues, fallback completes: the fallback wins
        let top = table(&[("long", &["Ctrl-x a"])]);
        let base = table(&[("short", &["Ctrl-x"])]);
        let node = BindingTable::compose([&top, &base]).unwrap();
        assert_eq!(run(&node, &["Ctrl-x"]).command(), Some("short"));
    }

    #[test]
    fn test_overlapping_overlays() {
        let km = table(&[("command", &["Ctrl-x a"]), ("xyzzy", &["x"])]);
        let km0 = table(&[("command0", &["Ctrl-x b 0"])]);
        let km1 = table(&[("command1", &["Ctrl-x b 1"])]);
        let kmo = table(&[("override", &["Ctrl-x a", "Ctrl-x b 0", "Ctrl-x b 1"])]);
        let kmo2 = table(&[("override2", &["Ctrl-x a", "Ctrl-x b 0", "Ctrl-x b 1"])]);

        let kmm = BindingTable::compose([&km]).unwrap();
        let kmm0 = BindingTable::compose([&km0, &km]).unwrap();
        let kmm1 = BindingTable::compose([&km1, &km]).unwrap();
        let kmmo = BindingTable::compose([&kmo, &km]).unwrap();
        let kmmo2 = BindingTable::compose([&kmo2, &kmo, &km]).unwrap();

        let cases: [(Option<&str>, &MatchNode, &[&str]); 15] = [
            (None, &kmm, &["u"]),
            (Some("command"), &kmm, &["Ctrl-x", "a"]),
            (Some("xyzzy"), &kmm, &["x"]),
            (Some("command0"), &kmm0, &["Ctrl-x", "b", "0"]),
            (Some("xyzzy"), &kmm0, &["x"]),
            (Some("command1"), &kmm1, &["Ctrl-x", "b", "1"]),
            (Some("xyzzy"), &kmm1, &["x"]),
            (Some("override"), &kmmo, &["Ctrl-x", "a"]),
            (Some("override"), &kmmo, &["Ctrl-x", "b", "0"]),
            (Some("override"), &kmmo, &["Ctrl-x", "b", "1"]),
            (Some("xyzzy"), &kmmo, &["x"]),
            (Some("override2"), &kmmo2, &["Ctrl-x", "a"]),
            (Some("override2"), &kmmo2, &["Ctrl-x", "b", "0"]),
            (Some("override2"), &kmmo2, &["Ctrl-x", "b", "1"]),
            (Some("xyzzy"), &kmmo2, &["x"]),
        ];

        for (expected, node, chords) in cases {
            assert_eq!(run(node, chords).command(), expected, "{chords:?}");
        }
    }

    #[test]
    fn test_deep_ambiguity_resolves_per_level() {
        // three overlays share "Ctrl-x b" and diverge at the third chord
        let top = table(&[("top-0", &["Ctrl-x b 0"])]);
        let mid = table(&[("mid-0", &["Ctrl-x b 0"]), ("mid-1", &["Ctrl-x b 1"])]);
        let base = table(&[("base-1", &["Ctrl-x b 1"]), ("base-2", &["Ctrl-x b 2"])]);
        let node = BindingTable::compose([&top, &mid, &base]).unwrap();

        assert_eq!(run(&node, &["Ctrl-x", "b", "0"]).command(), Some("top-0"));
        assert_eq!(run(&node, &["Ctrl-x", "b", "1"]).command(), Some("mid-1"));
        assert_eq!(run(&node, &["Ctrl-x", "b", "2"]).command(), Some("base-2"));
        assert!(run(&node, &["Ctrl-x", "b", "3"]).is_no_match());

        let pending = run(&node, &["Ctrl-x", "b"]).into_node().unwrap();
        assert_eq!(pending.chain_len(), 3);
    }

    #[test]
    fn test_continuation_only_in_fallback() {
        let top = table(&[("top", &["y"])]);
        let base = table(&[("base", &["Ctrl-x z"])]);
        let node = BindingTable::compose([&top, &base]).unwrap();

        let pending = run(&node, &["Ctrl-x"]).into_node().unwrap();
        assert_eq!(pending.chain_len(), 1);
        assert_eq!(run(&node, &["Ctrl-x", "z"]).command(), Some("base"));
    }

    #[test]
    fn test_recognizer_wins() {
        let recognizer =
            Recognizer::new(|chord| (chord.key() == "q").then(|| "dynamic".to_string()));
        let top = table(&[("static", &["q"])]).with_recognizer(recognizer);
        let node = top.create_mapper(None);
        assert!(matches!(node.kind(), NodeKind::Hybrid { .. }));
        assert_eq!(run(&node, &["q"]).command(), Some("dynamic"));
    }

    #[test]
    fn test_recognizer_in_fallback_beats_own_prefix() {
        let base = BindingTable::empty().with_recognizer(Recognizer::insert_self("insert-self"));
        let top = table(&[("chord", &["a b"])]);
        let node = BindingTable::compose([&top, &base]).unwrap();

        // own trie only has a prefix for "a"; the fallback recognizer completes
        assert_eq!(run(&node, &["a"]).command(), Some("insert-self"));
        assert!(run(&node, &["Ctrl-a"]).is_no_match());
    }

    #[test]
    fn test_recognizer_not_carried_into_continuations() {
        let top = table(&[("save", &["Ctrl-x Ctrl-s"])])
            .with_recognizer(Recognizer::insert_self("insert-self"));
        let node = top.create_mapper(None);
        let pending = run(&node, &["Ctrl-x"]).into_node().unwrap();
        assert!(pending.recognizer().is_none());
        assert!(run(&node, &["Ctrl-x", "s"]).is_no_match());
    }

    #[test]
    fn test_node_construction() {
        let recognizer = Recognizer::insert_self("insert-self");
        assert_eq!(
            MatchNode::new(None, Some(recognizer.clone()), None).unwrap_err(),
            KeymapError::InvalidNode
        );
        assert_eq!(MatchNode::new(None, None, None).unwrap_err(), KeymapError::InvalidNode);

        let base = BindingTable::empty().create_mapper(None);
        let node = MatchNode::new(None, Some(recognizer), Some(base.clone())).unwrap();
        assert!(matches!(node.kind(), NodeKind::Recognizer(_)));
        assert!(node.fallback().unwrap().ptr_eq(&base));

        let pass = MatchNode::new(None, None, Some(base)).unwrap();
        assert!(matches!(pass.kind(), NodeKind::Fallthrough));
        assert!(pass.trie().is_none());
    }
}
