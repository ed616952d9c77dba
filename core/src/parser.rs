// core/src/parser.rs
//
// Sentence-scoped chart parser: owns the input path matrix and one lookup
// manager per decode graph, and fills a callback with the rules of each span
// the search asks for.

use crate::callback::ChartParserCallback;
use crate::decode_graph::DecodeGraphList;
use crate::error::{ChartError, Result};
use crate::input::InputSource;
use crate::input_path::{InputPath, InputPathMatrix};
use crate::lookup::{RuleLookupManager, RuleTable};
use crate::observer::{ChartObserver, NoopObserver};
use crate::score::{LogScore, ScoreTransform};
use crate::span::Span;
use crate::unknown::UnknownWordHandler;
use crate::Config;
use std::sync::Arc;

/// Chart parser for one sentence.
///
/// Construction runs each table's `initialize_for_input`; dropping the parser
/// runs `clean_up_after_sentence` on the same tables, so the parser value is
/// the per-sentence scope.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use cykplus_core::{ChartParser, Config, Label, MemoryRuleTable, RuleCollector, RuleTable, Sentence, Span};
///
/// let x = Label::new("X");
/// let mut table = MemoryRuleTable::new("tm");
/// table.insert_phrase("kleines haus", "small house", 0.5, &x);
///
/// let config = Config::with_tables(&["tm"]);
/// let tables: Vec<Arc<dyn RuleTable>> = vec![Arc::new(table)];
/// let input = Sentence::parse("ein kleines haus .", x);
///
/// let mut parser = ChartParser::new(&input, &tables, &config).unwrap();
/// let mut chart = RuleCollector::new();
/// parser.parse_all(&mut chart).unwrap();
///
/// assert_eq!(chart.rules(Span::new(1, 2)).len(), 1);
/// assert!(chart.rules(Span::single(0)).is_empty());
/// ```
pub struct ChartParser {
    matrix: InputPathMatrix,
    decode_graphs: DecodeGraphList,
    tables: Vec<Arc<dyn RuleTable>>,
    managers: Vec<RuleLookupManager>,
    unknown: UnknownWordHandler,
    always_create_direct_translation_option: bool,
    observer: Arc<dyn ChartObserver>,
    translation_id: u64,
}

impl ChartParser {
    /// Parser with log scoring and no observer.
    pub fn new(input: &dyn InputSource, tables: &[Arc<dyn RuleTable>], config: &Config) -> Result<Self> {
        Self::with_hooks(input, tables, config, Arc::new(LogScore), Arc::new(NoopObserver))
    }

    /// Parser with explicit scoring functions and observer.
    ///
    /// `tables[i]` is bound to `config.decode_graphs[i]`; counts and names
    /// must agree and every table must support its graph's protocol.
    pub fn with_hooks(
        input: &dyn InputSource,
        tables: &[Arc<dyn RuleTable>],
        config: &Config,
        scoring: Arc<dyn ScoreTransform>,
        observer: Arc<dyn ChartObserver>,
    ) -> Result<Self> {
        config.validate()?;
        if tables.len() != config.decode_graphs.len() {
            return Err(ChartError::TableCountMismatch {
                tables: tables.len(),
                decode_graphs: config.decode_graphs.len(),
            });
        }
        for (index, (table, graph)) in tables.iter().zip(&config.decode_graphs).enumerate() {
            if table.name() != graph.table {
                return Err(ChartError::TableNameMismatch {
                    index,
                    expected: graph.table.clone(),
                    found: table.name().to_string(),
                });
            }
            if !table.supports(graph.lookup) {
                return Err(ChartError::UnsupportedProtocol {
                    table: table.name().to_string(),
                    protocol: graph.lookup,
                });
            }
        }

        for table in tables {
            table.initialize_for_input(input);
        }

        let matrix = InputPathMatrix::build(input, observer.as_ref());
        let mut parser = Self {
            matrix,
            decode_graphs: DecodeGraphList::from_config(&config.decode_graphs),
            tables: tables.to_vec(),
            managers: Vec::with_capacity(tables.len()),
            unknown: UnknownWordHandler::new(&config.unknown_lhs, config.drop_unknown, scoring),
            always_create_direct_translation_option: config.always_create_direct_translation_option,
            observer,
            translation_id: input.translation_id(),
        };
        // on error the partially built parser is dropped and still cleans up the tables
        for (table, graph) in tables.iter().zip(parser.decode_graphs.iter()) {
            let manager = table.create_lookup_manager(graph.lookup(), &parser.matrix, config)?;
            tracing::debug!(
                table = table.name(),
                protocol = %graph.lookup(),
                max_chart_span = graph.max_chart_span(),
                "lookup manager created"
            );
            parser.managers.push(manager);
        }

        tracing::debug!(
            translation_id = parser.translation_id,
            words = parser.matrix.len(),
            paths = parser.matrix.path_count(),
            tables = parser.tables.len(),
            "chart parser ready"
        );
        Ok(parser)
    }

    /// Emit every rule applicable to `span` into `to`.
    ///
    /// Spans sharing a start must be requested by increasing end when any
    /// table runs incrementally; visiting all spans by increasing length
    /// satisfies this. Panics if `span` lies outside the sentence.
    pub fn create(&mut self, span: Span, to: &mut dyn ChartParserCallback) -> Result<()> {
        let path = self.matrix.path(span);

        for ((graph, manager), table) in self
            .decode_graphs
            .iter()
            .zip(self.managers.iter_mut())
            .zip(&self.tables)
        {
            if !graph.admits(span) {
                continue;
            }
            self.observer.on_lookup(table.name(), graph.lookup(), span);
            manager.process(&self.matrix, path, to)?;
        }

        let size = self.matrix.len();
        if span.len() == 1 && span.start() != 0 && span.start() != size - 1 {
            if to.is_empty(span) || self.always_create_direct_translation_option {
                let word = path.last_word();
                let emitted = self.unknown.process(word, span, to);
                self.observer.on_unknown(span, emitted);
            }
        }
        Ok(())
    }

    /// Drive `create` over every span, shortest first.
    pub fn parse_all(&mut self, to: &mut dyn ChartParserCallback) -> Result<()> {
        let spans: Vec<Span> = self.matrix.iter_bottom_up().map(InputPath::span).collect();
        for span in spans {
            self.create(span, to)?;
        }
        Ok(())
    }

    /// Sentence length.
    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    pub fn input_path(&self, span: Span) -> &InputPath {
        self.matrix.path(span)
    }

    pub fn matrix(&self) -> &InputPathMatrix {
        &self.matrix
    }

    pub fn translation_id(&self) -> u64 {
        self.translation_id
    }

    /// Unknown-word source phrases synthesized so far.
    pub fn unknown_word_count(&self) -> usize {
        self.unknown.synthesized().len()
    }

    /// End the sentence scope now instead of at the end of the enclosing block.
    pub fn finish(self) {}
}

impl Drop for ChartParser {
    fn drop(&mut self) {
        for table in &self.tables {
            table.clean_up_after_sentence(self.translation_id);
        }
        tracing::trace!(translation_id = self.translation_id, "chart parser released");
    }
}
