//! Front matter: the YAML block at the top of a document.
//!
//! ```markdown
//! ---
//! jupytext:
//!   text_representation:
//!     format_name: myst
//! kernelspec:
//!   name: python3
//!   display_name: Python 3
//! ---
//! ```

use serde_json::Value;

use super::error::MetadataParsingError;
use super::yaml::parse_yaml;
use crate::models::Metadata;
use crate::tokens::{LineSpan, Token};

/// The `format_name` that marks a document as a MyST notebook.
pub const MYST_FORMAT_NAME: &str = "myst";

/// A front matter block split off the top of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatterBlock {
    /// Text between the delimiters.
    pub body: String,
    /// From the opening delimiter up to and including the closing one.
    pub lines: LineSpan,
}

/// Finds the front matter block, if the document starts with one.
///
/// The first non-blank line must be `---`; the block runs to the next line
/// that is `---` or `...`, or to the end of the document when unclosed.
pub fn split_front_matter(text: &str) -> Option<FrontMatterBlock> {
    let mut lines = text.lines().enumerate().skip_while(|(_, line)| line.trim().is_empty());

    let (open, first) = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }

    let mut body = Vec::new();
    let mut end = open + 1;
    for (number, line) in lines {
        end = number + 1;
        let line_end = line.trim_end();
        if line_end == "---" || line_end == "..." {
            break;
        }
        body.push(line);
    }
    Some(FrontMatterBlock {
        body: body.join("\n"),
        lines: LineSpan::new(open, end),
    })
}

/// Whether `text` is a MyST notebook rather than plain markdown.
///
/// Documents are only treated as notebooks when their front matter declares
/// `jupytext.text_representation.format_name: myst`. Such documents must then
/// also name a kernel, and an error is returned when they do not.
pub fn is_myst_notebook(text: &str) -> Result<bool, MetadataParsingError> {
    let Some(front_matter) = split_front_matter(text) else {
        return Ok(false);
    };
    let Ok(Value::Object(metadata)) = parse_yaml(&front_matter.body) else {
        return Ok(false);
    };

    let format_name = metadata
        .get("jupytext")
        .and_then(|jupytext| jupytext.get("text_representation"))
        .and_then(|representation| representation.get("format_name"))
        .and_then(Value::as_str);
    if format_name != Some(MYST_FORMAT_NAME) {
        return Ok(false);
    }

    let kernelspec = metadata.get("kernelspec").and_then(Value::as_object);
    for field in ["name", "display_name"] {
        if !kernelspec.is_some_and(|spec| spec.contains_key(field)) {
            return Err(MetadataParsingError::MissingKernelspec {
                field,
                line: front_matter.lines.first_line_number(),
            });
        }
    }
    Ok(true)
}

/// Reads the notebook metadata held by a front matter token.
pub fn parse_front_matter(token: &Token) -> Result<Metadata, MetadataParsingError> {
    if token.content.trim().is_empty() {
        return Ok(Metadata::new());
    }

    match parse_yaml(&token.content) {
        Ok(Value::Object(metadata)) => Ok(metadata),
        Ok(Value::Null) => Ok(Metadata::new()),
        Ok(other) => Err(MetadataParsingError::FrontMatter {
            line: Some(token.lines.first_line_number()),
            message: format!("expected a mapping, found {other}"),
        }),
        Err(err) => Err(MetadataParsingError::FrontMatter {
            // the body starts on the line after the opening delimiter
            line: err
                .location()
                .map(|location| token.lines.start + 1 + location.line()),
            message: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    const HEADER: &str = "---\njupytext:\n  text_representation:\n    format_name: myst\nkernelspec:\n  name: python3\n  display_name: Python 3\n---\n# Title\n";

    fn front_matter_token(body: &str, lines: LineSpan) -> Token {
        Token::new(TokenKind::FrontMatter, 0, lines).with_content(body)
    }

    #[test]
    fn split_finds_block() {
        let block = split_front_matter("---\na: 1\nb: 2\n---\ntext\n").unwrap();
        assert_eq!(block.body, "a: 1\nb: 2");
        assert_eq!(block.lines, LineSpan::new(0, 4));
    }

    #[test]
    fn split_skips_leading_blank_lines_and_accepts_dots() {
        let block = split_front_matter("\n  \n---\na: 1\n...\n").unwrap();
        assert_eq!(block.body, "a: 1");
        assert_eq!(block.lines, LineSpan::new(2, 5));
    }

    #[test]
    fn unclosed_block_runs_to_end_of_document() {
        let block = split_front_matter("---\na: 1\nb: 2\n").unwrap();
        assert_eq!(block.body, "a: 1\nb: 2");
        assert_eq!(block.lines, LineSpan::new(0, 3));

        let block = split_front_matter("---").unwrap();
        assert_eq!(block.body, "");
        assert_eq!(block.lines, LineSpan::new(0, 1));
    }

    #[rstest]
    #[case::empty("")]
    #[case::no_delimiter("# Title\n")]
    #[case::text_after_dashes("--- title\na: 1\n---\n")]
    #[case::not_first("text\n---\na: 1\n---\n")]
    fn split_rejects(#[case] text: &str) {
        assert_eq!(split_front_matter(text), None);
    }

    #[test]
    fn myst_notebook_is_detected() {
        assert!(is_myst_notebook(HEADER).unwrap());
    }

    #[rstest]
    #[case::plain_markdown("# Just markdown\n")]
    #[case::other_format("---\njupytext:\n  text_representation:\n    format_name: markdown\n---\n")]
    #[case::no_jupytext("---\ntitle: Post\n---\n")]
    #[case::malformed_yaml("---\na: [1\n---\n")]
    #[case::scalar("---\njust text\n---\n")]
    fn other_documents_are_not_notebooks(#[case] text: &str) {
        assert!(!is_myst_notebook(text).unwrap());
    }

    #[test]
    fn unclosed_myst_header_is_still_detected() {
        let text = HEADER.replacen("---\n# Title\n", "", 1);
        assert!(!text.contains("\n---"));
        assert!(is_myst_notebook(&text).unwrap());
    }

    #[rstest]
    #[case::no_kernelspec("", "name")]
    #[case::no_name("kernelspec:\n  display_name: Python 3\n", "name")]
    #[case::no_display_name("kernelspec:\n  name: python3\n", "display_name")]
    #[case::kernelspec_not_a_map("kernelspec: python3\n", "name")]
    fn myst_notebook_requires_kernelspec(#[case] extra: &str, #[case] missing: &str) {
        let text = format!(
            "---\njupytext:\n  text_representation:\n    format_name: myst\n{extra}---\n"
        );
        let err = is_myst_notebook(&text).unwrap_err();
        assert!(matches!(
            err,
            MetadataParsingError::MissingKernelspec { field, line: 1 } if field == missing
        ));
    }

    #[test]
    fn parse_front_matter_returns_mapping() {
        let token = front_matter_token("kernelspec:\n  name: python3", LineSpan::new(0, 4));
        let metadata = parse_front_matter(&token).unwrap();
        assert_eq!(Value::Object(metadata), json!({"kernelspec": {"name": "python3"}}));
    }

    #[rstest]
    #[case("")]
    #[case("  \n")]
    #[case("~")]
    fn empty_front_matter_gives_empty_metadata(#[case] body: &str) {
        let token = front_matter_token(body, LineSpan::new(0, 2));
        assert_eq!(parse_front_matter(&token).unwrap(), Metadata::new());
    }

    #[test]
    fn invalid_front_matter_is_an_error() {
        let token = front_matter_token("a: 1\nb: [unclosed", LineSpan::new(0, 4));
        let err = parse_front_matter(&token).unwrap_err();
        assert!(matches!(err, MetadataParsingError::FrontMatter { .. }));
        assert!(err.to_string().starts_with("Notebook metadata: "));
    }

    #[test]
    fn non_mapping_front_matter_is_an_error() {
        let token = front_matter_token("- a\n- b", LineSpan::new(0, 4));
        let err = parse_front_matter(&token).unwrap_err();
        assert_eq!(err.line(), Some(1));
    }
}
