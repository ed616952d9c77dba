//! In-memory rule table.
//!
//! Stores phrase pairs and hierarchical rules in a `RuleTrie` and serves
//! both lookup protocols from it. The trie sits behind an `Arc`, so one
//! loaded table can back any number of concurrent sentence parsers.
//!
//! Text format, one rule per line:
//!
//! ```text
//! source ||| target ||| probabilities ||| alignment
//! ```
//!
//! - Non-terminals are written `[X]`, or `[SRC][TGT]` with separate source
//!   and target labels; the source side uses the first label, the target
//!   side the second.
//! - When both sides end with a single `[LHS]` token, those tokens are the
//!   left-hand side (source one ignored, target one kept). Otherwise the
//!   rule gets the default label.
//! - Probabilities are optional and stored as floored log scores under the
//!   table's name. The alignment field is optional.

use crate::cyk_plus::IncrementalRuleLookup;
use crate::error::{ChartError, Result};
use crate::input_path::InputPathMatrix;
use crate::lookup::{LookupProtocol, RuleLookupManager, RuleTable};
use crate::rule::{Alignment, ChartRule, Gap, RuleOrigin, TargetPhrase};
use crate::score::{floor_score, transform_score};
use crate::span_lookup::WholeSpanRuleLookup;
use crate::trie::{NodeId, RuleTrie};
use crate::word::{Label, Phrase, Word};
use crate::Config;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

/// Rule table held entirely in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRuleTable {
    name: Arc<str>,
    trie: Arc<RuleTrie>,
}

impl MemoryRuleTable {
    /// Create an empty table.
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            trie: Arc::new(RuleTrie::new()),
        }
    }

    /// Insert a rule with source symbols `source`.
    pub fn insert(&mut self, source: &[Word], target: TargetPhrase) {
        Arc::make_mut(&mut self.trie).insert(source, target);
    }

    /// Convenience for plain phrase pairs: whitespace separated source and
    /// target words and a single probability.
    pub fn insert_phrase(&mut self, source: &str, target: &str, prob: f32, lhs: &Label) {
        let src: Vec<Word> = source.split_whitespace().map(Word::terminal).collect();
        let tgt: Phrase = target
            .split_whitespace()
            .map(Word::terminal)
            .collect::<Vec<_>>()
            .into();
        let mut tp = TargetPhrase::new(tgt, lhs.clone());
        tp.scores
            .assign(self.name.to_string(), floor_score(transform_score(prob)));
        self.insert(&src, tp);
    }

    pub fn trie(&self) -> &RuleTrie {
        &self.trie
    }

    /// Number of stored rules.
    pub fn len(&self) -> usize {
        self.trie.rule_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse the text format from `reader`.
    pub fn load_text<R: BufRead>(name: &str, reader: R, default_lhs: &Label) -> Result<Self> {
        let mut table = Self::new(name);
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let (source, target) = parse_rule_line(&line, idx + 1, name, default_lhs)?;
            table.insert(&source, target);
        }
        tracing::debug!(table = name, rules = table.len(), "loaded text rule table");
        Ok(table)
    }

    /// Load a text rule table; the table is named after the file stem.
    pub fn load_text_file<P: AsRef<Path>>(path: P, default_lhs: &Label) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("table")
            .to_string();
        let file = File::open(path)?;
        Self::load_text(&name, BufReader::new(file), default_lhs)
    }

    /// Save the table using bincode serialization.
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Load a table written by `save_bincode`.
    pub fn load_bincode<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let table: Self = bincode::deserialize_from(reader)?;
        Ok(table)
    }
}

impl RuleTable for MemoryRuleTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, _protocol: LookupProtocol) -> bool {
        true
    }

    fn create_lookup_manager(
        &self,
        protocol: LookupProtocol,
        matrix: &InputPathMatrix,
        config: &Config,
    ) -> Result<RuleLookupManager> {
        Ok(match protocol {
            LookupProtocol::WholeSpan => RuleLookupManager::WholeSpan(Box::new(WholeSpanRuleLookup::new(
                self.name.clone(),
                self.trie.clone(),
                config.rule_cache_size,
            ))),
            LookupProtocol::Incremental => RuleLookupManager::Incremental(Box::new(
                IncrementalRuleLookup::new(self.name.clone(), self.trie.clone(), matrix),
            )),
        })
    }
}

/// Build the rules stored at `node` for a completed match.
pub(crate) fn rules_at<'a>(
    trie: &'a RuleTrie,
    node: NodeId,
    table: &Arc<str>,
    source: &[Word],
    gaps: &[Gap],
) -> impl Iterator<Item = ChartRule> + 'a {
    let source: Phrase = source.to_vec().into();
    let gaps = gaps.to_vec();
    let origin = RuleOrigin::Table(table.clone());
    trie.targets(node).iter().map(move |target| ChartRule {
        source: source.clone(),
        target: target.clone(),
        gaps: gaps.clone(),
        origin: origin.clone(),
    })
}

/// Split `[A]` / `[A][B]` into its labels.
fn parse_non_terminal(tok: &str) -> Option<(&str, Option<&str>)> {
    let inner = tok.strip_prefix('[')?.strip_suffix(']')?;
    match inner.split_once("][") {
        Some((a, b)) if !a.is_empty() && !b.is_empty() => Some((a, Some(b))),
        Some(_) => None,
        None if !inner.is_empty() && !inner.contains(['[', ']']) => Some((inner, None)),
        None => None,
    }
}

fn is_lhs_marker(tok: &str) -> bool {
    matches!(parse_non_terminal(tok), Some((_, None)))
}

fn parse_rule_line(
    line: &str,
    line_no: usize,
    table: &str,
    default_lhs: &Label,
) -> Result<(Vec<Word>, TargetPhrase)> {
    let invalid = |message: String| ChartError::InvalidRule {
        line: line_no,
        message,
    };
    let fields: Vec<&str> = line.split("|||").map(str::trim).collect();
    if fields.len() < 2 {
        return Err(invalid("expected 'source ||| target'".to_string()));
    }

    let mut src_toks: Vec<&str> = fields[0].split_whitespace().collect();
    let mut tgt_toks: Vec<&str> = fields[1].split_whitespace().collect();

    let mut lhs = default_lhs.clone();
    let both_marked = matches!((src_toks.last(), tgt_toks.last()), (Some(s), Some(t)) if is_lhs_marker(s) && is_lhs_marker(t));
    // a lone "[X] ||| [X]" is a unary rule, not two LHS markers
    if both_marked && src_toks.len() > 1 {
        src_toks.pop();
        if let Some((label, _)) = tgt_toks.pop().and_then(parse_non_terminal) {
            lhs = Label::new(label);
        }
    }
    if src_toks.is_empty() {
        return Err(invalid("empty source side".to_string()));
    }

    let source: Vec<Word> = src_toks
        .iter()
        .map(|tok| match parse_non_terminal(tok) {
            Some((label, _)) => Word::non_terminal(&Label::new(label)),
            None => Word::terminal(*tok),
        })
        .collect();
    let target: Vec<Word> = tgt_toks
        .iter()
        .map(|tok| match parse_non_terminal(tok) {
            Some((first, second)) => Word::non_terminal(&Label::new(second.unwrap_or(first))),
            None => Word::terminal(*tok),
        })
        .collect();

    let mut tp = TargetPhrase::new(target.into(), lhs);

    if let Some(scores) = fields.get(2).filter(|f| !f.is_empty()) {
        let probs = scores
            .split_whitespace()
            .map(|s| s.parse::<f32>())
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| invalid(format!("bad score: {e}")))?;
        let scores: Vec<f32> = probs
            .into_iter()
            .map(|p| floor_score(transform_score(p)))
            .collect();
        tp.scores.assign_all(table, scores);
    }

    if let Some(align) = fields.get(3).filter(|f| !f.is_empty()) {
        tp.alignment =
            Alignment::parse(align).ok_or_else(|| invalid(format!("bad alignment '{align}'")))?;
    }

    Ok((source, tp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::LOWEST_SCORE;
    use std::io::Cursor;

    fn x() -> Label {
        Label::new("X")
    }

    #[test]
    fn parses_phrase_pair() {
        let (src, tp) = parse_rule_line("das haus ||| the house ||| 0.5 1 ||| 0-0 1-1", 1, "tm", &x())
            .expect("parse");
        assert_eq!(src, vec![Word::terminal("das"), Word::terminal("haus")]);
        assert_eq!(tp.words.to_string(), "the house");
        assert_eq!(tp.lhs, x());
        let scores = tp.scores.get("tm").expect("scores");
        assert!((scores[0] - 0.5_f32.ln()).abs() < 1e-6);
        assert_eq!(scores[1], 0.0);
        assert_eq!(tp.alignment.pairs(), &[(0, 0), (1, 1)]);
    }

    #[test]
    fn parses_hierarchical_rule_with_lhs() {
        let (src, tp) = parse_rule_line(
            "das [X][NP] [S] ||| the [X][NP] [S] ||| 0 ||| 1-1",
            3,
            "tm",
            &x(),
        )
        .expect("parse");
        assert_eq!(src.len(), 2);
        assert!(src[1].non_terminal);
        assert_eq!(src[1].text, "X");
        assert_eq!(tp.words.word(1).text, "NP");
        assert_eq!(tp.lhs, Label::new("S"));
        assert_eq!(tp.scores.get("tm"), Some(&[LOWEST_SCORE][..]));
    }

    #[test]
    fn unary_rule_keeps_its_symbol() {
        let (src, tp) = parse_rule_line("[X] ||| [X]", 1, "tm", &x()).expect("parse");
        assert_eq!(src, vec![Word::non_terminal(&x())]);
        assert_eq!(tp.words.len(), 1);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(matches!(
            parse_rule_line("only source", 7, "tm", &x()),
            Err(ChartError::InvalidRule { line: 7, .. })
        ));
        assert!(parse_rule_line("a ||| b ||| nope", 1, "tm", &x()).is_err());
        assert!(parse_rule_line("a ||| b ||| 1 ||| 0_0", 1, "tm", &x()).is_err());
        assert!(parse_rule_line(" ||| b", 1, "tm", &x()).is_err());
    }

    #[test]
    fn load_text_skips_blank_and_comment_lines() {
        let text = "# comment\n\nein ||| a ||| 0.4\nein ||| one ||| 0.6\nhaus ||| house\n";
        let table = MemoryRuleTable::load_text("tm", Cursor::new(text), &x()).expect("load");
        assert_eq!(table.len(), 3);
        assert_eq!(table.name(), "tm");
        let node = table.trie().find(&[Word::terminal("ein")]).expect("ein");
        assert_eq!(table.trie().targets(node).len(), 2);
    }

    #[test]
    fn bincode_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tm.bin");
        let mut table = MemoryRuleTable::new("tm");
        table.insert_phrase("das haus", "the house", 0.8, &x());
        table.save_bincode(&path).expect("save");

        let loaded = MemoryRuleTable::load_bincode(&path).expect("load");
        assert_eq!(loaded.name(), "tm");
        assert_eq!(loaded.len(), 1);
        let node = loaded
            .trie()
            .find(&[Word::terminal("das"), Word::terminal("haus")])
            .expect("rule");
        assert_eq!(loaded.trie().targets(node)[0].words.to_string(), "the house");
    }

    #[test]
    fn clones_share_rules_until_written() {
        let mut a = MemoryRuleTable::new("tm");
        a.insert_phrase("a", "A", 1.0, &x());
        let mut b = a.clone();
        b.insert_phrase("b", "B", 1.0, &x());
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 2);
    }
}
