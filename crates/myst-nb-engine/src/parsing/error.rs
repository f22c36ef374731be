use thiserror::Error;

use super::directive::DirectiveParsingError;
use crate::models::CellKind;

/// Raised when notebook or cell metadata in a MyST document cannot be read.
///
/// Line numbers are 1-based. Cell indices count the cells produced before the
/// failing one, so they match the position the cell would have taken.
#[derive(Debug, Error)]
pub enum MetadataParsingError {
    #[error("{cell_type} cell {index} at line {line} could not be read: {source}")]
    FencedCell {
        cell_type: CellKind,
        index: usize,
        line: usize,
        source: DirectiveParsingError,
    },

    #[error("Markdown cell {index} at line {line} could not be read: {message}")]
    CellMetadata {
        index: usize,
        line: usize,
        message: String,
    },

    #[error("Markdown cell {index} at line {line} is not a dict")]
    NotAnObject { index: usize, line: usize },

    #[error("Notebook metadata: {message}")]
    FrontMatter { line: Option<usize>, message: String },

    #[error("A myst notebook text-representation requires kernelspec/{field} metadata")]
    MissingKernelspec { field: &'static str, line: usize },
}

impl MetadataParsingError {
    /// Position of the offending cell among the cells produced so far.
    pub fn cell_index(&self) -> Option<usize> {
        match self {
            Self::FencedCell { index, .. }
            | Self::CellMetadata { index, .. }
            | Self::NotAnObject { index, .. } => Some(*index),
            Self::FrontMatter { .. } | Self::MissingKernelspec { .. } => None,
        }
    }

    /// Type of the offending cell, if a cell was involved.
    pub fn cell_type(&self) -> Option<CellKind> {
        match self {
            Self::FencedCell { cell_type, .. } => Some(*cell_type),
            Self::CellMetadata { .. } | Self::NotAnObject { .. } => Some(CellKind::Markdown),
            Self::FrontMatter { .. } | Self::MissingKernelspec { .. } => None,
        }
    }

    /// 1-based source line that triggered the error, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::FencedCell { line, .. }
            | Self::CellMetadata { line, .. }
            | Self::NotAnObject { line, .. }
            | Self::MissingKernelspec { line, .. } => Some(*line),
            Self::FrontMatter { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_cell_message_names_type_index_and_line() {
        let err = MetadataParsingError::FencedCell {
            cell_type: CellKind::Raw,
            index: 2,
            line: 14,
            source: DirectiveParsingError::ContentNotPermitted,
        };
        assert_eq!(
            err.to_string(),
            "Raw cell 2 at line 14 could not be read: No content permitted"
        );
        assert_eq!(err.cell_index(), Some(2));
        assert_eq!(err.cell_type(), Some(CellKind::Raw));
        assert_eq!(err.line(), Some(14));
    }

    #[test]
    fn missing_kernelspec_has_no_cell() {
        let err = MetadataParsingError::MissingKernelspec {
            field: "display_name",
            line: 1,
        };
        assert_eq!(
            err.to_string(),
            "A myst notebook text-representation requires kernelspec/display_name metadata"
        );
        assert_eq!(err.cell_index(), None);
        assert_eq!(err.line(), Some(1));
    }
}
