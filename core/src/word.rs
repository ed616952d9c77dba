//! Words, non-terminal labels and phrases.
//!
//! A `Word` doubles as a source-side symbol in rule tables: terminals carry
//! surface text, non-terminals carry the label name with `non_terminal` set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Non-terminal label (e.g. `X`, `NP`, `S`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label(String);

impl Label {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// Ordered, deduplicated set of labels attached to one span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet(BTreeSet<Label>);

impl LabelSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, label: Label) -> bool {
        self.0.insert(label)
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.0.contains(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A single source or target word.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    /// True when the word stands for a non-terminal gap named `text`.
    pub non_terminal: bool,
    /// True for words synthesized by the unknown-word fallback.
    pub oov: bool,
}

impl Word {
    pub fn terminal<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            non_terminal: false,
            oov: false,
        }
    }

    pub fn non_terminal(label: &Label) -> Self {
        Self {
            text: label.as_str().to_string(),
            non_terminal: true,
            oov: false,
        }
    }

    /// Target word for an untranslatable source word: same surface, flagged OOV.
    pub fn unknown_from(source: &Word) -> Self {
        Self {
            text: source.text.clone(),
            non_terminal: false,
            oov: true,
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.non_terminal {
            write!(f, "[{}]", self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}

/// Ordered sequence of words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phrase {
    words: Vec<Word>,
}

impl Phrase {
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    pub fn push(&mut self, word: Word) {
        self.words.push(word);
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, pos: usize) -> &Word {
        &self.words[pos]
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn word_mut(&mut self, pos: usize) -> &mut Word {
        &mut self.words[pos]
    }

    /// Copy of the words at `start..=end`.
    pub fn sub_phrase(&self, start: usize, end: usize) -> Phrase {
        Phrase {
            words: self.words[start..=end].to_vec(),
        }
    }
}

impl From<Vec<Word>> for Phrase {
    fn from(words: Vec<Word>) -> Self {
        Self { words }
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, w) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{w}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_word_keeps_surface() {
        let src = Word::terminal("Haus");
        let unk = Word::unknown_from(&src);
        assert_eq!(unk.text, "Haus");
        assert!(unk.oov);
        assert!(!unk.non_terminal);
    }

    #[test]
    fn label_set_deduplicates() {
        let set: LabelSet = vec![Label::new("X"), Label::new("NP"), Label::new("X")]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        let names: Vec<&str> = set.iter().map(|l| l.as_str()).collect();
        assert_eq!(names, vec!["NP", "X"]);
    }

    #[test]
    fn phrase_display_and_sub_phrase() {
        let p: Phrase = vec![
            Word::terminal("das"),
            Word::non_terminal(&Label::new("X")),
            Word::terminal("haus"),
        ]
        .into();
        assert_eq!(p.to_string(), "das [X] haus");
        assert_eq!(p.sub_phrase(1, 2).to_string(), "[X] haus");
    }
}
