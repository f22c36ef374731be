use std::ops::Range;

use super::span::LineSpan;

/// Maps byte offsets in a document to 0-based line numbers.
///
/// Line boundaries are `\n` characters, so `\r\n` documents index the same way
/// as `str::lines()` splits them.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset at which each line starts. Always contains at least `0`.
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .filter(|&start| start < text.len() || start == 0)
            .collect();
        Self {
            starts,
            len: text.len(),
        }
    }

    /// Number of lines, counted like `str::lines()`.
    pub fn line_count(&self) -> usize {
        if self.len == 0 { 0 } else { self.starts.len() }
    }

    /// Returns the line containing the byte at `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset).saturating_sub(1)
    }

    /// Byte offset at which `line` starts, or the document length past the end.
    pub fn line_start(&self, line: usize) -> usize {
        self.starts.get(line).copied().unwrap_or(self.len)
    }

    /// Converts a byte range into the lines it touches.
    ///
    /// The end line is the line after the last byte of the range, so a range
    /// that includes its trailing newline does not spill into the next line.
    pub fn span_of(&self, range: &Range<usize>) -> LineSpan {
        let start = self.line_of(range.start);
        let end = if range.end > range.start {
            self.line_of(range.end - 1) + 1
        } else {
            start
        };
        LineSpan { start, end }
    }
}
