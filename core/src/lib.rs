//! cykplus-core
//!
//! Chart-parsing core of a hierarchical (syntax-based) translation decoder:
//! for every span of an input sentence it gathers the translation rules of
//! all configured rule tables, and synthesizes fallback rules for words no
//! table covers. Hypothesis search consumes the rules through a callback.
//!
//! Public API:
//! - `ChartParser` - per-sentence orchestrator
//! - `InputPathMatrix` / `InputPath` - one precomputed node per span
//! - `RuleTable` / `RuleLookupManager` - rule sources and their two lookup
//!   protocols (whole span, incremental CYK+)
//! - `MemoryRuleTable` - trie-backed table serving both protocols
//! - `UnknownWordHandler` - out-of-vocabulary fallback
//! - `Config` - decode graphs, unknown-word policy, cache sizes
use serde::{Deserialize, Serialize};

pub mod callback;
pub use callback::{ChartParserCallback, RuleCollector};

pub mod cyk_plus;
pub use cyk_plus::IncrementalRuleLookup;

pub mod decode_graph;
pub use decode_graph::{DecodeGraph, DecodeGraphConfig, DecodeGraphList};

pub mod error;
pub use error::{ChartError, Result};

pub mod input;
pub use input::{InputSource, Sentence, TreeInput};

pub mod input_path;
pub use input_path::{InputPath, InputPathMatrix};

pub mod lookup;
pub use lookup::{IncrementalLookup, LookupProtocol, RuleLookupManager, RuleTable, WholeSpanLookup};

pub mod observer;
pub use observer::{ChartObserver, NoopObserver, TracingObserver};

pub mod parser;
pub use parser::ChartParser;

pub mod phrase_table;
pub use phrase_table::MemoryRuleTable;

pub mod rule;
pub use rule::{Alignment, ChartRule, Gap, RuleOrigin, TargetPhrase};

pub mod score;
pub use score::{floor_score, transform_score, LogScore, ScoreBreakdown, ScoreTransform, LOWEST_SCORE};

pub mod span;
pub use span::Span;

pub mod span_lookup;
pub use span_lookup::WholeSpanRuleLookup;

pub mod trie;
pub use trie::RuleTrie;

pub mod unknown;
pub use unknown::UnknownWordHandler;

pub mod word;
pub use word::{Label, LabelSet, Phrase, Word};

/// Left-hand side offered to unknown words, with its probability.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UnknownLhs {
    pub label: String,
    pub probability: f32,
}

/// Decoder configuration consumed by the chart parser.
///
/// Replaces process-wide settings: every parser receives the value it should
/// use, so different sentences may run with different configurations.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Labels (and probabilities) of the rules synthesized for unknown words.
    pub unknown_lhs: Vec<UnknownLhs>,

    /// Delete unknown words instead of passing them through. Words holding
    /// digits are always passed through.
    pub drop_unknown: bool,

    /// Run the unknown-word fallback for every interior single word, even
    /// when a table already produced rules for it.
    pub always_create_direct_translation_option: bool,

    /// Label carried by every span of a plain sentence.
    pub default_non_terminal: String,

    /// One entry per rule table, in table order.
    pub decode_graphs: Vec<DecodeGraphConfig>,

    /// Capacity of each whole-span lookup manager's per-span result cache.
    pub rule_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unknown_lhs: vec![UnknownLhs {
                label: "X".to_string(),
                probability: 1.0,
            }],
            drop_unknown: false,
            always_create_direct_translation_option: false,
            default_non_terminal: "X".to_string(),
            decode_graphs: Vec::new(),
            rule_cache_size: 1000,
        }
    }
}

impl Config {
    /// Default configuration with one unbounded whole-span graph per table name.
    pub fn with_tables(names: &[&str]) -> Self {
        Self {
            decode_graphs: names
                .iter()
                .map(|n| DecodeGraphConfig::new(*n, 0, LookupProtocol::WholeSpan))
                .collect(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Label of plain-sentence spans.
    pub fn default_label(&self) -> Label {
        Label::new(self.default_non_terminal.clone())
    }

    /// Reject settings that would corrupt the chart.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ChartError::InvalidConfig(msg));
        if self.default_non_terminal.trim().is_empty() {
            return invalid("default_non_terminal is empty".to_string());
        }
        if self.unknown_lhs.is_empty() {
            return invalid("unknown_lhs needs at least one label".to_string());
        }
        for (i, lhs) in self.unknown_lhs.iter().enumerate() {
            if lhs.label.trim().is_empty() {
                return invalid(format!("unknown_lhs[{i}] has no label"));
            }
            if !(lhs.probability >= 0.0 && lhs.probability <= 1.0) {
                return invalid(format!(
                    "unknown_lhs[{i}] probability {} outside [0, 1]",
                    lhs.probability
                ));
            }
        }
        for (i, graph) in self.decode_graphs.iter().enumerate() {
            if graph.table.trim().is_empty() {
                return invalid(format!("decode_graphs[{i}] names no table"));
            }
        }
        Ok(())
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn toml_round_trip() {
        let mut cfg = Config::with_tables(&["tm", "glue"]);
        cfg.decode_graphs[0].max_chart_span = 10;
        cfg.decode_graphs[1].lookup = LookupProtocol::Incremental;
        cfg.drop_unknown = true;
        let text = cfg.to_toml_string().expect("serialize");
        let back = Config::from_toml_str(&text).expect("parse");
        assert_eq!(back, cfg);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let text = r#"
            always_create_direct_translation_option = true

            [[decode_graphs]]
            table = "tm"
            max_chart_span = 5
            lookup = "incremental"

            [[decode_graphs]]
            table = "glue"
        "#;
        let cfg = Config::from_toml_str(text).expect("parse");
        assert!(cfg.always_create_direct_translation_option);
        assert_eq!(cfg.default_non_terminal, "X");
        assert_eq!(cfg.decode_graphs.len(), 2);
        assert_eq!(cfg.decode_graphs[0].lookup, LookupProtocol::Incremental);
        assert_eq!(cfg.decode_graphs[1].max_chart_span, 0);
        assert_eq!(cfg.decode_graphs[1].lookup, LookupProtocol::WholeSpan);
    }

    #[test]
    fn toml_file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chart.toml");
        let cfg = Config::with_tables(&["tm"]);
        cfg.save_toml(&path).expect("save");
        assert_eq!(Config::load_toml(&path).expect("load"), cfg);
    }

    #[test]
    fn missing_labels_are_rejected() {
        let mut cfg = Config::default();
        cfg.unknown_lhs[0].label = String::new();
        assert!(matches!(cfg.validate(), Err(ChartError::InvalidConfig(_))));

        let mut cfg = Config::default();
        cfg.unknown_lhs.clear();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.default_non_terminal = " ".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.unknown_lhs[0].probability = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn nfc_normalisation() {
        assert_eq!(utils::normalize(" Cafe\u{301} "), "Caf\u{e9}");
    }
}
