pub mod notebook;

pub use notebook::{Cell, CellKind, Metadata, Notebook};
