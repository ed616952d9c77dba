//! Decode graphs: which table may contribute rules to which spans.

use crate::lookup::LookupProtocol;
use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Configuration entry binding one rule table to a decoding step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeGraphConfig {
    /// Name of the rule table, checked against the table supplied at the same position.
    pub table: String,
    /// Longest span the table may cover; 0 means unbounded.
    #[serde(default)]
    pub max_chart_span: usize,
    #[serde(default)]
    pub lookup: LookupProtocol,
}

impl DecodeGraphConfig {
    pub fn new<T: Into<String>>(table: T, max_chart_span: usize, lookup: LookupProtocol) -> Self {
        Self {
            table: table.into(),
            max_chart_span,
            lookup,
        }
    }
}

/// Runtime decoding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeGraph {
    max_chart_span: usize,
    lookup: LookupProtocol,
}

impl DecodeGraph {
    pub fn new(max_chart_span: usize, lookup: LookupProtocol) -> Self {
        Self {
            max_chart_span,
            lookup,
        }
    }

    pub fn max_chart_span(&self) -> usize {
        self.max_chart_span
    }

    pub fn lookup(&self) -> LookupProtocol {
        self.lookup
    }

    /// Whether this graph's table may produce rules for `span`.
    pub fn admits(&self, span: Span) -> bool {
        self.max_chart_span == 0 || span.len() <= self.max_chart_span
    }
}

impl From<&DecodeGraphConfig> for DecodeGraph {
    fn from(cfg: &DecodeGraphConfig) -> Self {
        Self::new(cfg.max_chart_span, cfg.lookup)
    }
}

/// Ordered decode graphs; order fixes table priority.
#[derive(Debug, Clone, Default)]
pub struct DecodeGraphList {
    graphs: Vec<DecodeGraph>,
}

impl DecodeGraphList {
    pub fn from_config(configs: &[DecodeGraphConfig]) -> Self {
        Self {
            graphs: configs.iter().map(DecodeGraph::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecodeGraph> {
        self.graphs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bound_admits_everything() {
        let g = DecodeGraph::new(0, LookupProtocol::WholeSpan);
        assert!(g.admits(Span::new(0, 99)));
    }

    #[test]
    fn bound_is_inclusive() {
        let g = DecodeGraph::new(3, LookupProtocol::Incremental);
        assert!(g.admits(Span::new(2, 4)));
        assert!(!g.admits(Span::new(2, 5)));
        assert!(g.admits(Span::single(7)));
    }

    #[test]
    fn list_preserves_order() {
        let list = DecodeGraphList::from_config(&[
            DecodeGraphConfig::new("a", 0, LookupProtocol::WholeSpan),
            DecodeGraphConfig::new("b", 5, LookupProtocol::Incremental),
        ]);
        let graphs: Vec<(usize, LookupProtocol)> = list.iter().map(|g| (g.max_chart_span(), g.lookup())).collect();
        assert_eq!(graphs, vec![(0, LookupProtocol::WholeSpan), (5, LookupProtocol::Incremental)]);
    }
}
