use serde_json::Value;

use super::error::MetadataParsingError;
use crate::models::Metadata;

/// Reads the JSON object that may follow a `+++` block break.
///
/// `index` is the position the next cell will take and `line` the 1-based line
/// of the break, both used only for error reporting.
pub fn read_cell_metadata(
    content: &str,
    index: usize,
    line: usize,
) -> Result<Metadata, MetadataParsingError> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(Metadata::new());
    }

    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(metadata)) => Ok(metadata),
        Ok(_) => Err(MetadataParsingError::NotAnObject { index, line }),
        Err(err) => Err(MetadataParsingError::CellMetadata {
            index,
            line,
            message: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n")]
    fn blank_content_is_empty_metadata(#[case] content: &str) {
        assert_eq!(read_cell_metadata(content, 0, 1).unwrap(), Metadata::new());
    }

    #[test]
    fn object_is_returned() {
        let metadata = read_cell_metadata(r#" {"tags": ["hide"], "n": 1} "#, 0, 1).unwrap();
        assert_eq!(Value::Object(metadata), json!({"tags": ["hide"], "n": 1}));
    }

    #[test]
    fn malformed_json_names_cell_and_line() {
        let err = read_cell_metadata("{not json}", 3, 12).unwrap_err();
        assert_eq!(err.cell_index(), Some(3));
        assert_eq!(err.line(), Some(12));
        assert!(
            err.to_string()
                .starts_with("Markdown cell 3 at line 12 could not be read: ")
        );
    }

    #[rstest]
    #[case("[1, 2]")]
    #[case("\"text\"")]
    #[case("42")]
    #[case("null")]
    fn non_object_is_rejected(#[case] content: &str) {
        let err = read_cell_metadata(content, 1, 5).unwrap_err();
        assert_eq!(err.to_string(), "Markdown cell 1 at line 5 is not a dict");
    }
}
