//! # Block Tokens
//!
//! The cell extractor does not look at markdown text directly. It consumes a flat
//! stream of block-level [`Token`]s, each carrying a nesting delta so the
//! extractor can tell top-level constructs from ones nested in lists or quotes.
//!
//! ## Modules
//!
//! - **`span`**: `LineSpan`, a 0-based `[start, end)` line range
//! - **`lines`**: `LineIndex` for turning byte ranges into line spans
//! - **`cmark`**: `CmarkTokenizer`, the default tokenizer built on pulldown-cmark
//!
//! ## Nesting
//!
//! Containers (block quotes, lists, list items, footnote definitions) open with a
//! `+1` token and close with a `-1` token. Leaf blocks (paragraphs, fences,
//! headings, ...) are single `0` tokens. A running sum of `nesting` is therefore
//! zero exactly when a leaf block sits at the top level of the document.

pub mod cmark;
pub mod lines;
pub mod span;

pub use cmark::CmarkTokenizer;
pub use lines::LineIndex;
pub use span::LineSpan;

/// What a block token represents, as far as cell extraction cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A leading `---` delimited metadata block.
    FrontMatter,
    /// A fenced code block. `info` holds the text after the opening fence.
    Fence,
    /// A `+++` line marking a cell boundary. `content` holds the text after it.
    BlockBreak,
    /// Any other block: paragraphs, headings, containers, html, tables...
    Other,
}

/// A block-level token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// `+1` opens a container, `-1` closes one, `0` for leaf blocks.
    pub nesting: i8,
    /// Raw info string of a fence (empty for other kinds).
    pub info: String,
    /// Raw inner content (fence body, front matter body, block break metadata).
    pub content: String,
    /// Source lines covered by the token.
    pub lines: LineSpan,
}

impl Token {
    pub fn new(kind: TokenKind, nesting: i8, lines: LineSpan) -> Self {
        Self {
            kind,
            nesting,
            info: String::new(),
            content: String::new(),
            lines,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// Splits a document into block-level tokens.
///
/// Implementations must emit tokens in source order, with balanced nesting.
pub trait BlockTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}
