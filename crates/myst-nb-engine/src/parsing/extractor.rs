//! # Cell Extraction
//!
//! Walks the block token stream and cuts the document into cells:
//!
//! ````markdown
//! # Intro                  ┐
//! Some prose.              ┘ markdown cell
//!
//! ```{code-cell} python    ┐
//! print("hi")              │ code cell
//! ```                      ┘
//!
//! +++ {"tags": ["note"]}   ← block break, metadata for the next markdown cell
//!
//! More prose.              ] markdown cell with tags
//! ````
//!
//! Only tokens at nesting level zero are considered. A fence inside a list item
//! or block quote belongs to the surrounding markdown, whatever its info string.
//!
//! Everything between two structural tokens is copied from the source lines,
//! not rebuilt from tokens, so markdown cells keep their exact text.

use super::ConvertOptions;
use super::cell_metadata::read_cell_metadata;
use super::directive::{CELL_DIRECTIVE, parse_directive_text};
use super::error::MetadataParsingError;
use crate::models::{Cell, CellKind, Metadata};
use crate::tokens::{LineSpan, Token, TokenKind};

/// Conversion state carried from one token to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractorState {
    /// Running sum of token nesting deltas.
    pub nesting_level: i32,
    /// First source line of the markdown run not yet flushed.
    pub markdown_start_line: usize,
    /// Metadata from the last block break, waiting for its markdown cell.
    pub pending_metadata: Metadata,
    pub cells: Vec<Cell>,
}

impl ExtractorState {
    pub fn new(markdown_start_line: usize) -> Self {
        Self {
            markdown_start_line,
            ..Self::default()
        }
    }
}

/// Turns tokens into cells for one document.
pub struct Extractor<'a> {
    lines: Vec<&'a str>,
    options: &'a ConvertOptions,
}

impl<'a> Extractor<'a> {
    pub fn new(text: &'a str, options: &'a ConvertOptions) -> Self {
        Self {
            lines: text.lines().collect(),
            options,
        }
    }

    /// Applies one token to the state.
    pub fn step(
        &self,
        mut state: ExtractorState,
        token: &Token,
    ) -> Result<ExtractorState, MetadataParsingError> {
        state.nesting_level += i32::from(token.nesting);

        if state.nesting_level != 0 {
            if token.kind == TokenKind::Fence && self.cell_kind(token).is_some() {
                log::debug!(
                    "Ignoring nested `{}` fence at line {}",
                    token.info,
                    token.lines.first_line_number()
                );
            }
            return Ok(state);
        }

        match token.kind {
            TokenKind::Fence => {
                let Some(kind) = self.cell_kind(token) else {
                    return Ok(state);
                };
                self.flush(&mut state, Some(token));
                let cell = self.read_fenced_cell(token, kind, state.cells.len())?;
                state.cells.push(cell);
                state.pending_metadata = Metadata::new();
                state.markdown_start_line = token.lines.end;
            }
            TokenKind::BlockBreak => {
                self.flush(&mut state, Some(token));
                state.pending_metadata = read_cell_metadata(
                    &token.content,
                    state.cells.len(),
                    token.lines.first_line_number(),
                )?;
                state.markdown_start_line = token.lines.end;
            }
            TokenKind::FrontMatter | TokenKind::Other => {}
        }
        Ok(state)
    }

    /// Flushes the markdown after the last token and returns the cells.
    pub fn finish(&self, mut state: ExtractorState) -> Vec<Cell> {
        self.flush(&mut state, None);
        state.cells
    }

    /// Builds the markdown cell for the lines from `start_line` up to `until`
    /// (or the end of the document).
    ///
    /// Returns `None` when those lines hold nothing but whitespace.
    pub fn flush_markdown(
        &self,
        start_line: usize,
        until: Option<&Token>,
        metadata: Metadata,
    ) -> Option<Cell> {
        let end_line = until.map_or(self.lines.len(), |token| token.lines.start);
        let end = end_line.min(self.lines.len());
        let start = start_line.min(end);

        let text = self.lines[start..end].join("\n");
        let source = strip_blank_lines(&text);
        if source.is_empty() {
            return None;
        }

        let cell = Cell::markdown(source).with_metadata(metadata);
        Some(if self.options.store_line_numbers {
            cell.with_source_lines(LineSpan::new(start_line, end_line))
        } else {
            cell
        })
    }

    fn flush(&self, state: &mut ExtractorState, until: Option<&Token>) {
        let metadata = std::mem::take(&mut state.pending_metadata);
        if let Some(cell) = self.flush_markdown(state.markdown_start_line, until, metadata) {
            state.cells.push(cell);
        }
    }

    /// Which cell a fence opens, going by its info string.
    fn cell_kind(&self, token: &Token) -> Option<CellKind> {
        if token.info.starts_with(&self.options.code_directive) {
            Some(CellKind::Code)
        } else if token.info.starts_with(&self.options.raw_directive) {
            Some(CellKind::Raw)
        } else {
            None
        }
    }

    fn read_fenced_cell(
        &self,
        token: &Token,
        kind: CellKind,
        index: usize,
    ) -> Result<Cell, MetadataParsingError> {
        let directive = parse_directive_text(&CELL_DIRECTIVE, "", &token.content).map_err(
            |source| MetadataParsingError::FencedCell {
                cell_type: kind,
                index,
                line: token.lines.first_line_number(),
                source,
            },
        )?;

        let cell =
            Cell::new(kind, directive.body_lines.join("\n")).with_metadata(directive.options);
        Ok(if self.options.store_line_numbers {
            // the opening fence line is not part of the cell
            cell.with_source_lines(LineSpan::new(token.lines.start + 1, token.lines.end))
        } else {
            cell
        })
    }
}

/// Drops trailing whitespace and leading blank lines.
///
/// Indentation on the first non-blank line is kept.
pub fn strip_blank_lines(text: &str) -> &str {
    let mut text = text.trim_end();
    while let Some((first, rest)) = text.split_once('\n') {
        if !first.trim().is_empty() {
            break;
        }
        text = rest;
    }
    text
}
