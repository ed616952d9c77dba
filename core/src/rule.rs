//! Rules emitted for a span.
//!
//! This module provides:
//! - `Alignment`: source/target word alignment pairs
//! - `TargetPhrase`: right-hand side of a rule with its left-hand-side label
//! - `ChartRule`: a target phrase applied to a concrete span, with the
//!   sub-spans its non-terminals cover

use crate::score::ScoreBreakdown;
use crate::span::Span;
use crate::word::{Label, Phrase};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Word alignment as `(source, target)` index pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment(Vec<(usize, usize)>);

impl Alignment {
    pub fn new(pairs: Vec<(usize, usize)>) -> Self {
        Self(pairs)
    }

    /// The one-word-to-one-word alignment `0-0`.
    pub fn trivial() -> Self {
        Self(vec![(0, 0)])
    }

    /// Parse the `"0-0 1-2"` text form.
    pub fn parse(text: &str) -> Option<Self> {
        let mut pairs = Vec::new();
        for tok in text.split_whitespace() {
            let (s, t) = tok.split_once('-')?;
            pairs.push((s.parse().ok()?, t.parse().ok()?));
        }
        Some(Self(pairs))
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (s, t)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{s}-{t}")?;
        }
        Ok(())
    }
}

/// Target side of a translation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPhrase {
    pub words: Phrase,
    pub lhs: Label,
    pub scores: ScoreBreakdown,
    pub alignment: Alignment,
}

impl TargetPhrase {
    pub fn new(words: Phrase, lhs: Label) -> Self {
        Self {
            words,
            lhs,
            scores: ScoreBreakdown::new(),
            alignment: Alignment::default(),
        }
    }
}

/// Source-side non-terminal of an applied rule and the span it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub span: Span,
    pub label: Label,
}

/// Where a rule came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleOrigin {
    Table(Arc<str>),
    Unknown,
}

/// A rule applicable to one span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRule {
    /// Source-side symbols as matched (terminals and non-terminals).
    pub source: Phrase,
    pub target: TargetPhrase,
    /// Non-terminal coverage, left to right.
    pub gaps: Vec<Gap>,
    pub origin: RuleOrigin,
}

impl ChartRule {
    pub fn is_unknown(&self) -> bool {
        self.origin == RuleOrigin::Unknown
    }
}

impl fmt::Display for ChartRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} ({:.3})",
            self.target.lhs,
            self.source,
            self.target.words,
            self.target.scores.total()
        )?;
        if !self.target.alignment.is_empty() {
            write!(f, " |{}|", self.target.alignment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_text_form() {
        let a = Alignment::parse("0-0 2-1").expect("parse");
        assert_eq!(a.pairs(), &[(0, 0), (2, 1)]);
        assert_eq!(a.to_string(), "0-0 2-1");
        assert!(Alignment::parse("0-x").is_none());
        assert!(Alignment::parse("").expect("empty").is_empty());
    }
}
