//! # MyST Notebook Parsing
//!
//! Converts MyST markdown text into a [`Notebook`].
//!
//! ## Modules
//!
//! - **`front_matter`**: finds the YAML header and decides whether a document
//!   is a MyST notebook at all
//! - **`extractor`**: folds the block token stream into cells
//! - **`directive`**: splits a fenced cell into options and body
//! - **`cell_metadata`**: reads the JSON that follows a `+++` block break
//! - **`yaml`**: YAML to metadata conversion
//! - **`error`**: `MetadataParsingError`
//!
//! ## Flow
//!
//! ```text
//! text ─▶ BlockTokenizer ─▶ [Token] ─▶ front matter ─▶ Extractor::step (fold) ─▶ Notebook
//! ```

pub mod cell_metadata;
pub mod directive;
pub mod error;
pub mod extractor;
pub mod front_matter;
pub mod yaml;

pub use cell_metadata::read_cell_metadata;
pub use directive::{
    CELL_DIRECTIVE, DirectiveParsingError, DirectiveSpec, ParsedDirective, parse_directive_text,
};
pub use error::MetadataParsingError;
pub use extractor::{Extractor, ExtractorState, strip_blank_lines};
pub use front_matter::{MYST_FORMAT_NAME, is_myst_notebook, parse_front_matter, split_front_matter};

use serde::{Deserialize, Serialize};

use crate::models::{Metadata, Notebook};
use crate::tokens::{BlockTokenizer, CmarkTokenizer, TokenKind};

/// Fence info prefix that marks a code cell.
pub const CODE_DIRECTIVE: &str = "{code-cell}";
/// Fence info prefix that marks a raw cell.
pub const RAW_DIRECTIVE: &str = "{raw-cell}";

/// Settings for a single conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    pub code_directive: String,
    pub raw_directive: String,
    /// Record the source lines of every cell in `Cell::source_lines`.
    pub store_line_numbers: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            code_directive: CODE_DIRECTIVE.to_string(),
            raw_directive: RAW_DIRECTIVE.to_string(),
            store_line_numbers: false,
        }
    }
}

/// Converts MyST text to a notebook using the default tokenizer.
pub fn myst_to_notebook(
    text: &str,
    options: &ConvertOptions,
) -> Result<Notebook, MetadataParsingError> {
    myst_to_notebook_with(text, options, &CmarkTokenizer)
}

/// Converts MyST text to a notebook using `tokenizer`.
///
/// Directives are only recognised at the top level of the document; fences
/// nested in lists, quotes or other containers stay part of the markdown.
pub fn myst_to_notebook_with(
    text: &str,
    options: &ConvertOptions,
    tokenizer: &impl BlockTokenizer,
) -> Result<Notebook, MetadataParsingError> {
    let tokens = tokenizer.tokenize(text);

    let (metadata, body_tokens, start_line) = match tokens.split_first() {
        Some((first, rest)) if first.kind == TokenKind::FrontMatter => {
            (parse_front_matter(first)?, rest, first.lines.end)
        }
        _ => (Metadata::new(), tokens.as_slice(), 0),
    };

    let extractor = Extractor::new(text, options);
    let state = body_tokens
        .iter()
        .try_fold(ExtractorState::new(start_line), |state, token| {
            extractor.step(state, token)
        })?;
    let cells = extractor.finish(state);

    log::debug!("Converted MyST text into {} cells", cells.len());
    Ok(Notebook::new(metadata, cells))
}
