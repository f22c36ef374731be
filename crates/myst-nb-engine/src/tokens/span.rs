use serde::{Deserialize, Serialize};

/// A line range `[start, end)` into the source document.
///
/// Line numbers are 0-based, matching the indices of `str::lines()`. The end
/// line is exclusive, so a block occupying only line 3 has the span `3..4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct LineSpan {
    /// Inclusive start line.
    pub start: usize,
    /// Exclusive end line.
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the number of lines covered. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span covers no lines (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// The 1-based line number of the first line, as shown to humans.
    #[must_use]
    pub fn first_line_number(self) -> usize {
        self.start + 1
    }
}
