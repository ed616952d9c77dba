//! Precomputed span matrix for one sentence.
//!
//! One `InputPath` exists per `(start, end)` pair. Paths live in an arena
//! indexed by `[start][end - start]`; the prefix and postfix links are
//! stored as spans and resolved through the matrix.

use crate::input::InputSource;
use crate::observer::ChartObserver;
use crate::span::Span;
use crate::word::{LabelSet, Phrase, Word};

/// Node of the matrix: the words and labels of one span plus its links.
#[derive(Debug, Clone)]
pub struct InputPath {
    phrase: Phrase,
    labels: LabelSet,
    span: Span,
    prefix: Option<Span>,
    /// Spans `(s', end)` with `s' > start`, in increasing `s'`.
    postfixes: Vec<Span>,
}

impl InputPath {
    pub fn phrase(&self) -> &Phrase {
        &self.phrase
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Span with the same start and one token fewer.
    pub fn prefix(&self) -> Option<Span> {
        self.prefix
    }

    pub fn postfixes(&self) -> &[Span] {
        &self.postfixes
    }

    /// Rightmost word of the span.
    pub fn last_word(&self) -> &Word {
        self.phrase.word(self.phrase.len() - 1)
    }
}

/// All input paths of a sentence.
#[derive(Debug, Clone, Default)]
pub struct InputPathMatrix {
    paths: Vec<Vec<InputPath>>,
}

impl InputPathMatrix {
    /// Build every path by increasing length, then link postfixes.
    pub fn build(input: &dyn InputSource, observer: &dyn ChartObserver) -> Self {
        let size = input.len();
        let mut paths: Vec<Vec<InputPath>> = (0..size)
            .map(|start| Vec::with_capacity(size - start))
            .collect();

        for phrase_size in 1..=size {
            for start in 0..=(size - phrase_size) {
                let end = start + phrase_size - 1;
                let span = Span::new(start, end);
                // the shorter path at this start was pushed on the previous round
                debug_assert_eq!(paths[start].len(), phrase_size - 1);
                paths[start].push(InputPath {
                    phrase: input.sub_phrase(start, end),
                    labels: input.label_set(start, end),
                    span,
                    prefix: span.prefix(),
                    postfixes: Vec::new(),
                });
            }
        }

        let mut matrix = Self { paths };
        for start in 0..size {
            for end in start..size {
                let postfixes: Vec<Span> = ((start + 1)..=end).map(|s| Span::new(s, end)).collect();
                let path = matrix.get_mut(start, end);
                path.postfixes = postfixes;
                observer.on_input_path(path);
            }
        }
        matrix
    }

    /// Sentence length.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Total number of paths, `n(n+1)/2`.
    pub fn path_count(&self) -> usize {
        self.paths.iter().map(Vec::len).sum()
    }

    /// Path for `start..=end`. Panics outside the sentence.
    pub fn get(&self, start: usize, end: usize) -> &InputPath {
        assert!(start <= end, "path start {start} is after end {end}");
        let offset = end - start;
        assert!(
            offset < self.paths[start].len(),
            "path {start}..={end} outside sentence of length {}",
            self.len()
        );
        &self.paths[start][offset]
    }

    pub fn path(&self, span: Span) -> &InputPath {
        self.get(span.start(), span.end())
    }

    /// Checked variant of `path`.
    pub fn try_path(&self, span: Span) -> Option<&InputPath> {
        self.paths
            .get(span.start())
            .and_then(|row| row.get(span.end() - span.start()))
    }

    fn get_mut(&mut self, start: usize, end: usize) -> &mut InputPath {
        &mut self.paths[start][end - start]
    }

    /// Iterate paths in bottom-up order: by length, then start.
    pub fn iter_bottom_up(&self) -> impl Iterator<Item = &InputPath> + '_ {
        let size = self.len();
        (1..=size).flat_map(move |len| (0..=(size - len)).map(move |start| self.get(start, start + len - 1)))
    }
}
