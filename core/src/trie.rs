/// Prefix trie over source-side rule symbols.
use crate::rule::TargetPhrase;
use crate::word::Word;
use serde::{Deserialize, Serialize};
use ahash::AHashMap;

/// Index of a node inside a `RuleTrie`.
pub type NodeId = usize;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RuleTrieNode {
    children: AHashMap<Word, NodeId>,
    /// Targets of every rule whose source side ends at this node.
    targets: Vec<TargetPhrase>,
}

/// Arena-backed trie keyed by source symbols (terminals and non-terminals).
///
/// Lookup managers walk it symbol by symbol; a node id is the whole
/// partial-match state, so incremental lookups can store plain ids per span.
///
/// # Example
/// ```
/// use cykplus_core::trie::RuleTrie;
/// use cykplus_core::{Label, TargetPhrase, Word};
///
/// let mut trie = RuleTrie::new();
/// let src = [Word::terminal("das"), Word::terminal("haus")];
/// let tgt = TargetPhrase::new(vec![Word::terminal("the house")].into(), Label::new("X"));
/// trie.insert(&src, tgt);
///
/// let das = trie.child(RuleTrie::ROOT, &src[0]).unwrap();
/// assert!(trie.targets(das).is_empty());
/// let haus = trie.child(das, &src[1]).unwrap();
/// assert_eq!(trie.targets(haus).len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTrie {
    nodes: Vec<RuleTrieNode>,
}

impl Default for RuleTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleTrie {
    pub const ROOT: NodeId = 0;

    /// Create a trie holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![RuleTrieNode::default()],
        }
    }

    /// Add a rule. Returns the node the source side ends at.
    pub fn insert(&mut self, source: &[Word], target: TargetPhrase) -> NodeId {
        let mut node = Self::ROOT;
        for sym in source {
            node = match self.nodes[node].children.get(sym) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(RuleTrieNode::default());
                    self.nodes[node].children.insert(sym.clone(), next);
                    next
                }
            };
        }
        self.nodes[node].targets.push(target);
        node
    }

    /// Follow the edge labelled `sym` out of `node`.
    pub fn child(&self, node: NodeId, sym: &Word) -> Option<NodeId> {
        self.nodes[node].children.get(sym).copied()
    }

    pub fn targets(&self, node: NodeId) -> &[TargetPhrase] {
        &self.nodes[node].targets
    }

    pub fn has_children(&self, node: NodeId) -> bool {
        !self.nodes[node].children.is_empty()
    }

    /// Node reached by the whole `source` sequence, if any.
    pub fn find(&self, source: &[Word]) -> Option<NodeId> {
        source
            .iter()
            .try_fold(Self::ROOT, |node, sym| self.child(node, sym))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of stored target phrases.
    pub fn rule_count(&self) -> usize {
        self.nodes.iter().map(|n| n.targets.len()).sum()
    }
}
