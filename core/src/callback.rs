//! Rule emission interface between lookup managers and the search.

use crate::rule::ChartRule;
use crate::span::Span;
use ahash::AHashMap;

/// Receiver of every rule produced for a span.
///
/// The chart parser asks `is_empty` after all tables have been consulted to
/// decide whether the unknown-word fallback is needed.
pub trait ChartParserCallback {
    fn add_rule(&mut self, rule: ChartRule, span: Span);

    /// Rules synthesized for an untranslatable word.
    fn add_unknown_rule(&mut self, rule: ChartRule, span: Span);

    fn is_empty(&self, span: Span) -> bool;
}

/// Default callback that keeps the rules of every span in memory.
#[derive(Debug, Clone, Default)]
pub struct RuleCollector {
    by_span: AHashMap<Span, Vec<ChartRule>>,
}

impl RuleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rules for `span`, table rules and fallback rules alike.
    pub fn rules(&self, span: Span) -> &[ChartRule] {
        self.by_span.get(&span).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn unknown_rules(&self, span: Span) -> impl Iterator<Item = &ChartRule> {
        self.rules(span).iter().filter(|r| r.is_unknown())
    }

    /// Total number of rules across all spans.
    pub fn len(&self) -> usize {
        self.by_span.values().map(Vec::len).sum()
    }

    pub fn is_empty_total(&self) -> bool {
        self.len() == 0
    }

    /// Spans that received at least one rule, sorted.
    pub fn spans(&self) -> Vec<Span> {
        let mut spans: Vec<Span> = self
            .by_span
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(s, _)| *s)
            .collect();
        spans.sort();
        spans
    }
}

impl ChartParserCallback for RuleCollector {
    fn add_rule(&mut self, rule: ChartRule, span: Span) {
        self.by_span.entry(span).or_default().push(rule);
    }

    fn add_unknown_rule(&mut self, rule: ChartRule, span: Span) {
        self.by_span.entry(span).or_default().push(rule);
    }

    fn is_empty(&self, span: Span) -> bool {
        self.rules(span).is_empty()
    }
}
