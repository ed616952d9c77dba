//! Rule lookup protocols and the rule table interface.
//!
//! A `RuleTable` is shared read-only between sentence workers. For every
//! sentence it hands out a fresh `RuleLookupManager` that owns all of the
//! per-sentence state (caches, partial matches). Each manager speaks exactly
//! one protocol:
//!
//! - whole span: every span is matched from scratch, in any order
//! - incremental: a span's partial matches are derived from its prefix, so
//!   spans sharing a start must be visited by increasing end

use crate::callback::ChartParserCallback;
use crate::Config;
use crate::error::Result;
use crate::input::InputSource;
use crate::input_path::{InputPath, InputPathMatrix};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which lookup protocol a decode graph runs its table with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupProtocol {
    #[default]
    WholeSpan,
    Incremental,
}

impl fmt::Display for LookupProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupProtocol::WholeSpan => f.write_str("whole-span"),
            LookupProtocol::Incremental => f.write_str("incremental"),
        }
    }
}

/// Lookup that computes all rules of a span independently of other spans.
pub trait WholeSpanLookup: Send {
    fn lookup(&mut self, matrix: &InputPathMatrix, path: &InputPath, to: &mut dyn ChartParserCallback);
}

/// CYK+ style lookup that threads partial matches along a start position.
pub trait IncrementalLookup: Send {
    /// Seed the chain for a single-token path.
    fn init(
        &mut self,
        matrix: &InputPathMatrix,
        path: &InputPath,
        to: &mut dyn ChartParserCallback,
    ) -> Result<()>;

    /// Grow the chain by one token. Fails with `ChartError::Scheduling` if
    /// the path's prefix has not been processed.
    fn extend(
        &mut self,
        matrix: &InputPathMatrix,
        path: &InputPath,
        to: &mut dyn ChartParserCallback,
    ) -> Result<()>;
}

/// Per-sentence lookup manager of one table.
pub enum RuleLookupManager {
    WholeSpan(Box<dyn WholeSpanLookup>),
    Incremental(Box<dyn IncrementalLookup>),
}

impl RuleLookupManager {
    pub fn protocol(&self) -> LookupProtocol {
        match self {
            RuleLookupManager::WholeSpan(_) => LookupProtocol::WholeSpan,
            RuleLookupManager::Incremental(_) => LookupProtocol::Incremental,
        }
    }

    /// Emit every rule of `path` into `to`, dispatching on the protocol.
    pub fn process(
        &mut self,
        matrix: &InputPathMatrix,
        path: &InputPath,
        to: &mut dyn ChartParserCallback,
    ) -> Result<()> {
        match self {
            RuleLookupManager::WholeSpan(m) => {
                m.lookup(matrix, path, to);
                Ok(())
            }
            RuleLookupManager::Incremental(m) if path.span().len() == 1 => m.init(matrix, path, to),
            RuleLookupManager::Incremental(m) => m.extend(matrix, path, to),
        }
    }
}

impl fmt::Debug for RuleLookupManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RuleLookupManager").field(&self.protocol()).finish()
    }
}

/// A translation rule table.
///
/// Implementations must keep shared state immutable during decoding; any
/// sentence-specific cache belongs in the managers they create.
pub trait RuleTable: Send + Sync {
    fn name(&self) -> &str;

    fn supports(&self, protocol: LookupProtocol) -> bool;

    /// Create the manager serving one sentence.
    fn create_lookup_manager(
        &self,
        protocol: LookupProtocol,
        matrix: &InputPathMatrix,
        config: &Config,
    ) -> Result<RuleLookupManager>;

    /// Hook run before a sentence is parsed.
    fn initialize_for_input(&self, _input: &dyn InputSource) {}

    /// Hook run once the sentence's parser is dropped.
    fn clean_up_after_sentence(&self, _translation_id: u64) {}
}
