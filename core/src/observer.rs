//! Observation hooks for chart construction.
//!
//! Observers are notified at fixed points (path creation, table lookup,
//! unknown-word fallback) and never influence control flow.

use crate::input_path::InputPath;
use crate::lookup::LookupProtocol;
use crate::span::Span;

pub trait ChartObserver: Send + Sync {
    /// A matrix path has been fully linked.
    fn on_input_path(&self, _path: &InputPath) {}

    /// A table is about to be consulted for `span`.
    fn on_lookup(&self, _table: &str, _protocol: LookupProtocol, _span: Span) {}

    /// The unknown-word fallback emitted `rules` rules for `span`.
    fn on_unknown(&self, _span: Span, _rules: usize) {}
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ChartObserver for NoopObserver {}

/// Forwards events to `tracing` at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ChartObserver for TracingObserver {
    fn on_input_path(&self, path: &InputPath) {
        tracing::trace!(
            span = %path.span(),
            phrase = %path.phrase(),
            postfixes = path.postfixes().len(),
            "input path"
        );
    }

    fn on_lookup(&self, table: &str, protocol: LookupProtocol, span: Span) {
        tracing::trace!(table, %protocol, %span, "lookup");
    }

    fn on_unknown(&self, span: Span, rules: usize) {
        tracing::debug!(%span, rules, "unknown word fallback");
    }
}
