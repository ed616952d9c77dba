//! Whole-span rule lookup over a `RuleTrie`.
//!
//! Every span is matched from scratch: terminals against the span's words,
//! non-terminals against the label sets of every sub-span a gap could cover.
//! Results are memoized per span in an LRU cache owned by the manager, so
//! a driver revisiting spans does not pay for the match twice.

use crate::callback::ChartParserCallback;
use crate::input_path::{InputPath, InputPathMatrix};
use crate::lookup::WholeSpanLookup;
use crate::phrase_table::rules_at;
use crate::rule::{ChartRule, Gap};
use crate::span::Span;
use crate::trie::{NodeId, RuleTrie};
use crate::word::Word;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

pub struct WholeSpanRuleLookup {
    table: Arc<str>,
    trie: Arc<RuleTrie>,
    cache: LruCache<Span, Vec<ChartRule>>,
    cache_hits: usize,
    cache_misses: usize,
}

impl WholeSpanRuleLookup {
    pub fn new(table: Arc<str>, trie: Arc<RuleTrie>, cache_size: usize) -> Self {
        Self {
            table,
            trie,
            cache: LruCache::new(NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN)),
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    /// All rules matching `span` exactly.
    pub fn collect(&self, matrix: &InputPathMatrix, span: Span) -> Vec<ChartRule> {
        let mut out = Vec::new();
        let mut source = Vec::new();
        let mut gaps = Vec::new();
        self.match_from(
            matrix,
            RuleTrie::ROOT,
            span.start(),
            span.end(),
            &mut source,
            &mut gaps,
            &mut out,
        );
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn match_from(
        &self,
        matrix: &InputPathMatrix,
        node: NodeId,
        pos: usize,
        end: usize,
        source: &mut Vec<Word>,
        gaps: &mut Vec<Gap>,
        out: &mut Vec<ChartRule>,
    ) {
        if pos > end {
            out.extend(rules_at(&self.trie, node, &self.table, source, gaps));
            return;
        }
        if !self.trie.has_children(node) {
            return;
        }

        let word = matrix.get(pos, pos).last_word();
        if let Some(next) = self.trie.child(node, word) {
            source.push(word.clone());
            self.match_from(matrix, next, pos + 1, end, source, gaps, out);
            source.pop();
        }

        for gap_end in pos..=end {
            for label in matrix.get(pos, gap_end).labels().iter() {
                let sym = Word::non_terminal(label);
                if let Some(next) = self.trie.child(node, &sym) {
                    source.push(sym);
                    gaps.push(Gap {
                        span: Span::new(pos, gap_end),
                        label: label.clone(),
                    });
                    self.match_from(matrix, next, gap_end + 1, end, source, gaps, out);
                    gaps.pop();
                    source.pop();
                }
            }
        }
    }

    /// Returns (hits, misses).
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.cache_hits, self.cache_misses)
    }
}

impl WholeSpanLookup for WholeSpanRuleLookup {
    fn lookup(&mut self, matrix: &InputPathMatrix, path: &InputPath, to: &mut dyn ChartParserCallback) {
        let span = path.span();
        let cached = self.cache.get(&span).cloned();
        let rules = match cached {
            Some(rules) => {
                self.cache_hits += 1;
                rules
            }
            None => {
                self.cache_misses += 1;
                let rules = self.collect(matrix, span);
                self.cache.put(span, rules.clone());
                rules
            }
        };
        tracing::trace!(table = &*self.table, %span, rules = rules.len(), "whole-span lookup");
        for rule in rules {
            to.add_rule(rule, span);
        }
    }
}
