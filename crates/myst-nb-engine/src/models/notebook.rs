use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tokens::LineSpan;

/// Schema-less metadata attached to notebooks and cells.
///
/// Keys are strings; values may be any JSON value. Consumers read the keys
/// they care about and ignore the rest.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// The type of a notebook cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Markdown,
    Code,
    Raw,
}

impl CellKind {
    /// The `cell_type` used by the interchange format.
    pub fn as_str(self) -> &'static str {
        match self {
            CellKind::Markdown => "markdown",
            CellKind::Code => "code",
            CellKind::Raw => "raw",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellKind::Markdown => "Markdown",
            CellKind::Code => "Code",
            CellKind::Raw => "Raw",
        };
        f.write_str(name)
    }
}

/// A single notebook cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub kind: CellKind,
    /// The cell body, exactly as reconstructed from the source.
    pub source: String,
    pub metadata: Metadata,
    /// Source lines the cell was read from, when line tracking is enabled.
    pub source_lines: Option<LineSpan>,
}

impl Cell {
    pub fn new(kind: CellKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            metadata: Metadata::new(),
            source_lines: None,
        }
    }

    pub fn markdown(source: impl Into<String>) -> Self {
        Self::new(CellKind::Markdown, source)
    }

    pub fn code(source: impl Into<String>) -> Self {
        Self::new(CellKind::Code, source)
    }

    pub fn raw(source: impl Into<String>) -> Self {
        Self::new(CellKind::Raw, source)
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_source_lines(mut self, lines: LineSpan) -> Self {
        self.source_lines = Some(lines);
        self
    }
}

/// A notebook: document metadata plus an ordered list of cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notebook {
    pub metadata: Metadata,
    pub cells: Vec<Cell>,
}

impl Notebook {
    pub fn new(metadata: Metadata, cells: Vec<Cell>) -> Self {
        Self { metadata, cells }
    }

    /// Get the number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the notebook has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over the cells of one kind, in order
    pub fn cells_of(&self, kind: CellKind) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |cell| cell.kind == kind)
    }

    /// The kernel name from `kernelspec.name`, if present
    pub fn kernel_name(&self) -> Option<&str> {
        self.metadata
            .get("kernelspec")
            .and_then(|spec| spec.get("name"))
            .and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cell_kind_names() {
        assert_eq!(CellKind::Code.as_str(), "code");
        assert_eq!(CellKind::Raw.to_string(), "Raw");
        assert_eq!(
            serde_json::to_value(CellKind::Markdown).unwrap(),
            json!("markdown")
        );
    }

    #[test]
    fn new_notebook_is_empty() {
        let nb = Notebook::default();
        assert!(nb.is_empty());
        assert_eq!(nb.len(), 0);
        assert_eq!(nb.kernel_name(), None);
    }

    #[test]
    fn cells_of_filters_in_order() {
        let nb = Notebook::new(
            Metadata::new(),
            vec![
                Cell::code("a = 1"),
                Cell::markdown("text"),
                Cell::code("b = 2"),
            ],
        );
        let sources: Vec<_> = nb.cells_of(CellKind::Code).map(|c| c.source.as_str()).collect();
        assert_eq!(sources, vec!["a = 1", "b = 2"]);
    }

    #[test]
    fn kernel_name_reads_kernelspec() {
        let metadata = json!({"kernelspec": {"name": "python3", "display_name": "Python 3"}});
        let nb = Notebook::new(metadata.as_object().unwrap().clone(), vec![]);
        assert_eq!(nb.kernel_name(), Some("python3"));
    }
}
