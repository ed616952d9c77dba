//! Fallback rules for source words no table can translate.
//!
//! Without fallback rules a single-token span that no table covers would
//! leave a hole in the chart and no complete derivation could exist. For
//! every configured unknown left-hand side the handler either passes the
//! word through (flagged OOV) or, when unknown words are dropped and the
//! word holds no digits, deletes it at the floor score.

use crate::callback::ChartParserCallback;
use crate::rule::{Alignment, ChartRule, RuleOrigin, TargetPhrase};
use crate::score::{ScoreTransform, UNKNOWN_WORD_PENALTY};
use crate::span::Span;
use crate::word::{Label, Phrase, Word};
use crate::UnknownLhs;
use std::sync::Arc;

pub struct UnknownWordHandler {
    unknown_lhs: Vec<(Label, f32)>,
    drop_unknown: bool,
    scoring: Arc<dyn ScoreTransform>,
    /// Synthesized one-word source phrases, released with the handler.
    sources: Vec<Phrase>,
}

impl UnknownWordHandler {
    pub fn new(unknown_lhs: &[UnknownLhs], drop_unknown: bool, scoring: Arc<dyn ScoreTransform>) -> Self {
        Self {
            unknown_lhs: unknown_lhs
                .iter()
                .map(|u| (Label::new(u.label.clone()), u.probability))
                .collect(),
            drop_unknown,
            scoring,
            sources: Vec::new(),
        }
    }

    /// Emit fallback rules for `word` at the single-token `span`.
    /// Returns the number of rules emitted.
    pub fn process(&mut self, word: &Word, span: Span, to: &mut dyn ChartParserCallback) -> usize {
        debug_assert_eq!(span.len(), 1);
        let has_digit = self.drop_unknown && word.text.chars().any(|c| c.is_ascii_digit());

        let mut source: Phrase = vec![word.clone()].into();
        source.word_mut(0).oov = true;
        self.sources.push(source.clone());

        let keep_word = !self.drop_unknown || has_digit;
        let drop_score = self.scoring.floor(f32::NEG_INFINITY);

        for (lhs, prob) in &self.unknown_lhs {
            let target = if keep_word {
                let mut tp = TargetPhrase::new(vec![Word::unknown_from(word)].into(), lhs.clone());
                let score = self.scoring.floor(self.scoring.transform(*prob));
                tp.scores.assign(UNKNOWN_WORD_PENALTY, score);
                tp.alignment = Alignment::trivial();
                tp
            } else {
                let mut tp = TargetPhrase::new(Phrase::new(), lhs.clone());
                tp.scores.assign(UNKNOWN_WORD_PENALTY, drop_score);
                tp
            };
            let rule = ChartRule {
                source: source.clone(),
                target,
                gaps: Vec::new(),
                origin: RuleOrigin::Unknown,
            };
            to.add_unknown_rule(rule, span);
        }
        self.unknown_lhs.len()
    }

    /// Source phrases synthesized so far for this sentence.
    pub fn synthesized(&self) -> &[Phrase] {
        &self.sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::RuleCollector;
    use crate::score::{LogScore, LOWEST_SCORE};

    fn lhs() -> Vec<UnknownLhs> {
        vec![
            UnknownLhs {
                label: "X".into(),
                probability: 1.0,
            },
            UnknownLhs {
                label: "NN".into(),
                probability: 0.5,
            },
        ]
    }

    fn penalty(rule: &ChartRule) -> f32 {
        rule.target.scores.get(UNKNOWN_WORD_PENALTY).expect("penalty")[0]
    }

    #[test]
    fn pass_through_one_rule_per_label() {
        let mut h = UnknownWordHandler::new(&lhs(), false, Arc::new(LogScore));
        let mut to = RuleCollector::new();
        let span = Span::single(2);
        assert_eq!(h.process(&Word::terminal("Zwiebel"), span, &mut to), 2);

        let rules = to.rules(span);
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|r| r.is_unknown()));
        assert_eq!(rules[0].target.lhs, Label::new("X"));
        assert_eq!(rules[0].target.words.word(0).text, "Zwiebel");
        assert!(rules[0].target.words.word(0).oov);
        assert!(rules[0].source.word(0).oov);
        assert_eq!(rules[0].target.alignment, Alignment::trivial());
        assert_eq!(penalty(&rules[0]), 0.0);
        assert!((penalty(&rules[1]) - 0.5_f32.ln()).abs() < 1e-6);
        assert_eq!(h.synthesized().len(), 1);
    }

    #[test]
    fn drop_mode_deletes_words() {
        let mut h = UnknownWordHandler::new(&lhs(), true, Arc::new(LogScore));
        let mut to = RuleCollector::new();
        let span = Span::single(1);
        h.process(&Word::terminal("Zwiebel"), span, &mut to);

        let rules = to.rules(span);
        assert_eq!(rules.len(), 2);
        for r in rules {
            assert!(r.target.words.is_empty());
            assert!(r.target.alignment.is_empty());
            assert_eq!(penalty(r), LOWEST_SCORE);
        }
    }

    #[test]
    fn drop_mode_keeps_numbers() {
        let mut h = UnknownWordHandler::new(&lhs(), true, Arc::new(LogScore));
        let mut to = RuleCollector::new();
        let span = Span::single(1);
        h.process(&Word::terminal("2024"), span, &mut to);
        let rules = to.rules(span);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].target.words.word(0).text, "2024");
    }

    #[test]
    fn zero_probability_is_floored() {
        let cfg = vec![UnknownLhs {
            label: "X".into(),
            probability: 0.0,
        }];
        let mut h = UnknownWordHandler::new(&cfg, false, Arc::new(LogScore));
        let mut to = RuleCollector::new();
        h.process(&Word::terminal("w"), Span::single(1), &mut to);
        assert_eq!(penalty(&to.rules(Span::single(1))[0]), LOWEST_SCORE);
    }
}
