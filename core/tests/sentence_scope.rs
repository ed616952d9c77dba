// core/tests/sentence_scope.rs
//
// Per-sentence lifetime of the chart parser:
// - table hooks run once per sentence, including on failed construction
// - one shared table serves parsers on several threads

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cykplus_core::{
    ChartObserver, ChartParser, Config, InputPath, InputPathMatrix, InputSource, Label, LogScore,
    LookupProtocol, MemoryRuleTable, Result, RuleCollector, RuleLookupManager, RuleTable, Sentence, Span,
};

fn x() -> Label {
    Label::new("X")
}

/// Wraps a memory table and counts hook calls.
struct CountingTable {
    inner: MemoryRuleTable,
    inits: AtomicUsize,
    cleanups: Mutex<Vec<u64>>,
}

impl CountingTable {
    fn new(inner: MemoryRuleTable) -> Self {
        Self {
            inner,
            inits: AtomicUsize::new(0),
            cleanups: Mutex::new(Vec::new()),
        }
    }
}

impl RuleTable for CountingTable {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn supports(&self, protocol: LookupProtocol) -> bool {
        self.inner.supports(protocol)
    }

    fn create_lookup_manager(
        &self,
        protocol: LookupProtocol,
        matrix: &InputPathMatrix,
        config: &Config,
    ) -> Result<RuleLookupManager> {
        self.inner.create_lookup_manager(protocol, matrix, config)
    }

    fn initialize_for_input(&self, _input: &dyn InputSource) {
        self.inits.fetch_add(1, Ordering::SeqCst);
    }

    fn clean_up_after_sentence(&self, translation_id: u64) {
        self.cleanups.lock().unwrap().push(translation_id);
    }
}

#[test]
fn hooks_bracket_each_sentence() {
    let mut tm = MemoryRuleTable::new("tm");
    tm.insert_phrase("b", "B", 0.5, &x());
    let counting = Arc::new(CountingTable::new(tm));
    let tables: Vec<Arc<dyn RuleTable>> = vec![counting.clone()];
    let config = Config::with_tables(&["tm"]);

    for id in 0..3u64 {
        let mut input = Sentence::parse("a b c", x());
        input.set_translation_id(id);
        let mut parser = ChartParser::new(&input, &tables, &config).expect("parser");
        parser.parse_all(&mut RuleCollector::new()).expect("parse");
        assert_eq!(counting.cleanups.lock().unwrap().len(), id as usize);
        parser.finish();
    }

    assert_eq!(counting.inits.load(Ordering::SeqCst), 3);
    assert_eq!(*counting.cleanups.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn failed_manager_creation_still_cleans_up() {
    struct Broken;
    impl RuleTable for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn supports(&self, _protocol: LookupProtocol) -> bool {
            true
        }
        fn create_lookup_manager(
            &self,
            _protocol: LookupProtocol,
            _matrix: &InputPathMatrix,
            _config: &Config,
        ) -> Result<RuleLookupManager> {
            Err(cykplus_core::ChartError::InvalidConfig("no backing store".into()))
        }
    }

    let counting = Arc::new(CountingTable::new(MemoryRuleTable::new("tm")));
    let tables: Vec<Arc<dyn RuleTable>> = vec![counting.clone(), Arc::new(Broken)];
    let config = Config::with_tables(&["tm", "broken"]);
    let input = Sentence::parse("a b", x());

    assert!(ChartParser::new(&input, &tables, &config).is_err());
    assert_eq!(counting.inits.load(Ordering::SeqCst), 1);
    assert_eq!(counting.cleanups.lock().unwrap().len(), 1);
}

#[derive(Default)]
struct PathCounter {
    paths: AtomicUsize,
    unknown: AtomicUsize,
}

impl ChartObserver for PathCounter {
    fn on_input_path(&self, _path: &InputPath) {
        self.paths.fetch_add(1, Ordering::Relaxed);
    }

    fn on_unknown(&self, _span: Span, rules: usize) {
        self.unknown.fetch_add(rules, Ordering::Relaxed);
    }
}

#[test]
fn observer_sees_paths_and_fallbacks() {
    let tables: Vec<Arc<dyn RuleTable>> = vec![Arc::new(MemoryRuleTable::new("tm"))];
    let config = Config::with_tables(&["tm"]);
    let observer = Arc::new(PathCounter::default());
    let input = Sentence::parse("<s> a b </s>", x());

    let mut parser =
        ChartParser::with_hooks(&input, &tables, &config, Arc::new(LogScore), observer.clone()).expect("parser");
    parser.parse_all(&mut RuleCollector::new()).expect("parse");

    assert_eq!(observer.paths.load(Ordering::Relaxed), 10);
    assert_eq!(observer.unknown.load(Ordering::Relaxed), 2);
}

#[test]
fn parallel_sentences_share_one_table() {
    let mut tm = MemoryRuleTable::new("tm");
    tm.insert_phrase("das haus", "the house", 0.8, &x());
    tm.insert_phrase("haus", "house", 0.6, &x());
    let tables: Vec<Arc<dyn RuleTable>> = vec![Arc::new(tm)];
    let mut config = Config::with_tables(&["tm"]);
    config.decode_graphs[0].lookup = LookupProtocol::Incremental;

    let sentences = [
        "<s> das haus </s>",
        "<s> ein haus </s>",
        "<s> das rote haus </s>",
        "<s> haus das haus </s>",
    ];

    let counts: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = sentences
            .iter()
            .enumerate()
            .map(|(id, text)| {
                let tables = &tables;
                let config = &config;
                scope.spawn(move || {
                    let mut input = Sentence::parse(text, x());
                    input.set_translation_id(id as u64);
                    let mut parser = ChartParser::new(&input, tables, config).expect("parser");
                    let mut chart = RuleCollector::new();
                    parser.parse_all(&mut chart).expect("parse");
                    chart.len()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("worker")).collect()
    });

    // table rules plus one fallback per uncovered interior word
    assert_eq!(counts, vec![3, 2, 3, 4]);
}
