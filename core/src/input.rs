//! Input sentences as seen by the chart parser.
//!
//! The parser only needs four things from its input: the length, the word
//! at a position, the words of a span and the non-terminal labels a span
//! may carry. `Sentence` covers plain text; `TreeInput` adds labels taken
//! from a source-side parse.

use crate::span::Span;
use crate::word::{Label, LabelSet, Phrase, Word};
use ahash::AHashMap;

pub const BOS: &str = "<s>";
pub const EOS: &str = "</s>";

/// Read-only view of one input sentence.
pub trait InputSource {
    /// Number of tokens.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Word at `pos`. Panics if `pos >= len()`.
    fn word_at(&self, pos: usize) -> &Word;

    /// Words covered by `start..=end`.
    fn sub_phrase(&self, start: usize, end: usize) -> Phrase;

    /// Non-terminal labels the span `start..=end` may be rewritten from.
    fn label_set(&self, start: usize, end: usize) -> LabelSet;

    /// Identifier used for per-sentence setup and cleanup in rule tables.
    fn translation_id(&self) -> u64 {
        0
    }
}

/// Plain tokenised sentence. Every span carries the default label.
#[derive(Debug, Clone)]
pub struct Sentence {
    words: Phrase,
    default_label: Label,
    translation_id: u64,
}

impl Sentence {
    /// Split `text` on whitespace after NFC normalisation.
    pub fn parse(text: &str, default_label: Label) -> Self {
        let normalized = crate::utils::normalize(text);
        let words: Vec<Word> = normalized.split_whitespace().map(Word::terminal).collect();
        Self {
            words: words.into(),
            default_label,
            translation_id: 0,
        }
    }

    /// Like `parse`, but wraps the tokens in `<s>` and `</s>`.
    pub fn with_boundaries(text: &str, default_label: Label) -> Self {
        let mut sentence = Self::parse(text, default_label);
        let mut words = Phrase::new();
        words.push(Word::terminal(BOS));
        for w in sentence.words.words() {
            words.push(w.clone());
        }
        words.push(Word::terminal(EOS));
        sentence.words = words;
        sentence
    }

    pub fn set_translation_id(&mut self, id: u64) {
        self.translation_id = id;
    }

    pub fn words(&self) -> &Phrase {
        &self.words
    }
}

impl InputSource for Sentence {
    fn len(&self) -> usize {
        self.words.len()
    }

    fn word_at(&self, pos: usize) -> &Word {
        self.words.word(pos)
    }

    fn sub_phrase(&self, start: usize, end: usize) -> Phrase {
        self.words.sub_phrase(start, end)
    }

    fn label_set(&self, _start: usize, _end: usize) -> LabelSet {
        std::iter::once(self.default_label.clone()).collect()
    }

    fn translation_id(&self) -> u64 {
        self.translation_id
    }
}

/// Sentence annotated with syntactic labels over some spans.
///
/// Unannotated spans fall back to the default label only, so hierarchical
/// rules with the default non-terminal still apply everywhere.
#[derive(Debug, Clone)]
pub struct TreeInput {
    sentence: Sentence,
    labels: AHashMap<Span, LabelSet>,
}

impl TreeInput {
    pub fn new(sentence: Sentence) -> Self {
        Self {
            sentence,
            labels: AHashMap::new(),
        }
    }

    /// Annotate `span` with `label`. Panics if the span lies outside the sentence.
    pub fn add_label(&mut self, span: Span, label: Label) {
        assert!(
            span.end() < self.sentence.len(),
            "label span {span} outside sentence of length {}",
            self.sentence.len()
        );
        self.labels.entry(span).or_default().insert(label);
    }
}

impl InputSource for TreeInput {
    fn len(&self) -> usize {
        self.sentence.len()
    }

    fn word_at(&self, pos: usize) -> &Word {
        self.sentence.word_at(pos)
    }

    fn sub_phrase(&self, start: usize, end: usize) -> Phrase {
        self.sentence.sub_phrase(start, end)
    }

    fn label_set(&self, start: usize, end: usize) -> LabelSet {
        let mut set = self.sentence.label_set(start, end);
        if let Some(extra) = self.labels.get(&Span::new(start, end)) {
            for l in extra.iter() {
                set.insert(l.clone());
            }
        }
        set
    }

    fn translation_id(&self) -> u64 {
        self.sentence.translation_id()
    }
}
