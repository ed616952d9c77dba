//! Score normalisation and per-feature score storage.
//!
//! Probabilities are mapped to natural-log space and clamped at
//! `LOWEST_SCORE`, so a zero probability never turns into `-inf` in
//! downstream sums and comparisons.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Floor applied to every log score.
pub const LOWEST_SCORE: f32 = -100.0;

/// Feature name used for scores of synthesized unknown-word rules.
pub const UNKNOWN_WORD_PENALTY: &str = "UnknownWordPenalty";

/// ln(prob). `transform_score(0.0)` is `-inf`.
pub fn transform_score(prob: f32) -> f32 {
    prob.ln()
}

/// Clamp a log score at `LOWEST_SCORE`.
pub fn floor_score(score: f32) -> f32 {
    score.max(LOWEST_SCORE)
}

/// Pluggable probability-to-score mapping used by the unknown-word fallback.
pub trait ScoreTransform: Send + Sync {
    fn transform(&self, prob: f32) -> f32;
    fn floor(&self, score: f32) -> f32;
}

/// Natural log with the `LOWEST_SCORE` floor.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogScore;

impl ScoreTransform for LogScore {
    fn transform(&self, prob: f32) -> f32 {
        transform_score(prob)
    }

    fn floor(&self, score: f32) -> f32 {
        floor_score(score)
    }
}

/// Scores of one rule, grouped by the feature that produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    scores: BTreeMap<String, Vec<f32>>,
}

impl ScoreBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single-valued feature, replacing any previous value.
    pub fn assign<F: Into<String>>(&mut self, feature: F, score: f32) {
        self.scores.insert(feature.into(), vec![score]);
    }

    pub fn assign_all<F: Into<String>>(&mut self, feature: F, scores: Vec<f32>) {
        self.scores.insert(feature.into(), scores);
    }

    pub fn get(&self, feature: &str) -> Option<&[f32]> {
        self.scores.get(feature).map(Vec::as_slice)
    }

    /// Unweighted sum of every component.
    pub fn total(&self) -> f32 {
        self.scores.values().flatten().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.scores.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
