//! Contiguous range of input token positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A span of input tokens. Both `start` and `end` are inclusive.
///
/// # Example
/// ```
/// use cykplus_core::Span;
///
/// let span = Span::new(1, 3);
/// assert_eq!(span.len(), 3);
/// assert_eq!(span.prefix(), Some(Span::new(1, 2)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a span covering `start..=end`.
    ///
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "span start {start} is after end {end}");
        Self { start, end }
    }

    /// Single-token span at `pos`.
    pub fn single(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of tokens covered.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Same start, one token shorter. `None` for single-token spans.
    pub fn prefix(&self) -> Option<Span> {
        (self.end > self.start).then(|| Span::new(self.start, self.end - 1))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]", self.start, self.end)
    }
}
