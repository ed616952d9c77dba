use anyhow::{Context, Result};
use cykplus_core::{
    ChartParser, ChartRule, Config, LogScore, RuleCollector, RuleTable, Sentence, Span, TracingObserver,
};
use serde::Serialize;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::compile::load_table;

pub struct Options {
    pub boundaries: bool,
    pub json: bool,
}

#[derive(Serialize)]
struct SpanRules<'a> {
    sentence: u64,
    span: Span,
    text: String,
    rules: &'a [ChartRule],
}

pub fn run(rule_paths: &[PathBuf], config: Option<&Path>, sentences: &[String], opts: &Options) -> Result<()> {
    let mut config = match config {
        Some(path) => Config::load_toml(path).with_context(|| format!("reading config {}", path.display()))?,
        None => Config::default(),
    };

    let default_lhs = config.default_label();
    let mut tables: Vec<Arc<dyn RuleTable>> = Vec::with_capacity(rule_paths.len());
    for path in rule_paths {
        tables.push(Arc::new(load_table(path, &default_lhs)?));
    }
    if config.decode_graphs.is_empty() {
        let names: Vec<&str> = tables.iter().map(|t| t.name()).collect();
        config.decode_graphs = Config::with_tables(&names).decode_graphs;
    }

    let lines: Vec<String> = if sentences.is_empty() {
        io::stdin().lock().lines().collect::<io::Result<_>>()?
    } else {
        sentences.to_vec()
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let observer = Arc::new(TracingObserver);

    for (id, line) in lines.iter().enumerate() {
        let mut sentence = if opts.boundaries {
            Sentence::with_boundaries(line, default_lhs.clone())
        } else {
            Sentence::parse(line, default_lhs.clone())
        };
        sentence.set_translation_id(id as u64);

        let mut parser = ChartParser::with_hooks(&sentence, &tables, &config, Arc::new(LogScore), observer.clone())
            .with_context(|| format!("sentence {id}"))?;
        let mut chart = RuleCollector::new();
        parser
            .parse_all(&mut chart)
            .with_context(|| format!("sentence {id}"))?;

        for span in chart.spans() {
            let text = parser.input_path(span).phrase().to_string();
            let rules = chart.rules(span);
            if opts.json {
                let record = SpanRules {
                    sentence: id as u64,
                    span,
                    text,
                    rules,
                };
                serde_json::to_writer(&mut out, &record)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{id} {span} {text}")?;
                for rule in rules {
                    writeln!(out, "    {rule}")?;
                }
            }
        }
        parser.finish();
    }
    out.flush()?;
    Ok(())
}
