//! Incremental (CYK+) rule lookup over a `RuleTrie`.
//!
//! For every processed span the manager keeps the dotted items that end
//! exactly at the span's last token: trie nodes reached by some sequence of
//! terminals and gaps covering the span. Extending `(start, end)` combines
//!
//! 1. items of the prefix `(start, end - 1)` advanced by the word at `end`,
//! 2. items of `(start, s' - 1)` advanced by a gap over each postfix `(s', end)`,
//! 3. fresh items whose first symbol is a gap over the whole span.
//!
//! Only items that can still grow are stored; every item whose node carries
//! targets is emitted. The rule set per span equals that of the whole-span
//! lookup.

use crate::callback::ChartParserCallback;
use crate::error::{ChartError, Result};
use crate::input_path::{InputPath, InputPathMatrix};
use crate::lookup::IncrementalLookup;
use crate::phrase_table::rules_at;
use crate::rule::Gap;
use crate::span::Span;
use crate::trie::{NodeId, RuleTrie};
use crate::word::{LabelSet, Word};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct DottedItem {
    node: NodeId,
    source: Vec<Word>,
    gaps: Vec<Gap>,
}

impl DottedItem {
    fn root() -> Self {
        Self {
            node: RuleTrie::ROOT,
            source: Vec::new(),
            gaps: Vec::new(),
        }
    }
}

pub struct IncrementalRuleLookup {
    table: Arc<str>,
    trie: Arc<RuleTrie>,
    /// Stored items per span, `[start][end - start]`; `None` until processed.
    states: Vec<Vec<Option<Vec<DottedItem>>>>,
}

impl IncrementalRuleLookup {
    pub fn new(table: Arc<str>, trie: Arc<RuleTrie>, matrix: &InputPathMatrix) -> Self {
        let size = matrix.len();
        let states = (0..size).map(|start| vec![None; size - start]).collect();
        Self { table, trie, states }
    }

    /// True once `span` has been initialised or extended.
    pub fn is_processed(&self, span: Span) -> bool {
        self.state(span).is_some()
    }

    /// Number of partial matches that can still grow past `span`.
    pub fn live_items(&self, span: Span) -> usize {
        self.state(span).map_or(0, Vec::len)
    }

    fn state(&self, span: Span) -> Option<&Vec<DottedItem>> {
        self.states
            .get(span.start())
            .and_then(|row| row.get(span.end() - span.start()))
            .and_then(Option::as_ref)
    }

    fn advance_word(&self, item: &DottedItem, word: &Word, out: &mut Vec<DottedItem>) {
        if let Some(node) = self.trie.child(item.node, word) {
            let mut next = item.clone();
            next.node = node;
            next.source.push(word.clone());
            out.push(next);
        }
    }

    fn advance_gap(&self, item: &DottedItem, span: Span, labels: &LabelSet, out: &mut Vec<DottedItem>) {
        for label in labels.iter() {
            let sym = Word::non_terminal(label);
            if let Some(node) = self.trie.child(item.node, &sym) {
                let mut next = item.clone();
                next.node = node;
                next.source.push(sym);
                next.gaps.push(Gap {
                    span,
                    label: label.clone(),
                });
                out.push(next);
            }
        }
    }

    /// Emit completed items and keep the ones that can grow.
    fn finish(&mut self, span: Span, items: Vec<DottedItem>, to: &mut dyn ChartParserCallback) {
        let mut emitted = 0;
        for item in &items {
            for rule in rules_at(&self.trie, item.node, &self.table, &item.source, &item.gaps) {
                to.add_rule(rule, span);
                emitted += 1;
            }
        }
        let live: Vec<DottedItem> = items
            .into_iter()
            .filter(|item| self.trie.has_children(item.node))
            .collect();
        tracing::trace!(table = &*self.table, %span, emitted, live = live.len(), "incremental lookup");
        if live.is_empty() {
            tracing::trace!(table = &*self.table, %span, "chain has no live items");
        }
        self.states[span.start()][span.end() - span.start()] = Some(live);
    }
}

impl IncrementalLookup for IncrementalRuleLookup {
    fn init(
        &mut self,
        _matrix: &InputPathMatrix,
        path: &InputPath,
        to: &mut dyn ChartParserCallback,
    ) -> Result<()> {
        let span = path.span();
        debug_assert_eq!(span.len(), 1);
        let root = DottedItem::root();
        let mut items = Vec::new();
        self.advance_word(&root, path.last_word(), &mut items);
        self.advance_gap(&root, span, path.labels(), &mut items);
        self.finish(span, items, to);
        Ok(())
    }

    fn extend(
        &mut self,
        matrix: &InputPathMatrix,
        path: &InputPath,
        to: &mut dyn ChartParserCallback,
    ) -> Result<()> {
        let span = path.span();
        let scheduling = || ChartError::Scheduling {
            table: self.table.to_string(),
            span,
        };
        let prefix = path.prefix().ok_or_else(scheduling)?;
        let prefix_items = self.state(prefix).ok_or_else(scheduling)?;

        let mut items = Vec::new();
        for item in prefix_items {
            self.advance_word(item, path.last_word(), &mut items);
        }

        for &postfix in path.postfixes() {
            // items covering everything left of the gap; the prefix chain computed them
            let left = Span::new(span.start(), postfix.start() - 1);
            let left_items = self.state(left).ok_or_else(scheduling)?;
            let labels = matrix.path(postfix).labels();
            for item in left_items {
                self.advance_gap(item, postfix, labels, &mut items);
            }
        }

        self.advance_gap(&DottedItem::root(), span, path.labels(), &mut items);
        self.finish(span, items, to);
        Ok(())
    }
}
