pub mod interchange;
pub mod io;
pub mod models;
pub mod parsing;
pub mod tokens;


// Re-export key types for easier usage
pub use interchange::{from_ipynb_str, to_ipynb_string};
pub use io::*;
pub use models::{Cell, CellKind, Metadata, Notebook};
pub use parsing::{
    ConvertOptions, MetadataParsingError, is_myst_notebook, myst_to_notebook,
    myst_to_notebook_with,
};
pub use tokens::{BlockTokenizer, CmarkTokenizer, LineSpan, Token, TokenKind};
