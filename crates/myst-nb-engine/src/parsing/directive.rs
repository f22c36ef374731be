//! # Directive Option Parsing
//!
//! Fenced cells are written as MyST directives. The fence body may start with an
//! option block, given either as YAML between `---` lines:
//!
//! ```text
//! ---
//! tags: [hide-input]
//! ---
//! print("hello")
//! ```
//!
//! or as `:key: value` lines:
//!
//! ```text
//! :tags: [hide-input]
//! print("hello")
//! ```
//!
//! Everything after the option block is the directive body.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use super::yaml::{is_falsy, parse_yaml};
use crate::models::Metadata;

/// The shape of a directive: how many arguments it takes and whether it
/// accepts options and body content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveSpec {
    pub required_arguments: usize,
    pub optional_arguments: usize,
    /// Whether the last argument may contain whitespace.
    pub final_argument_whitespace: bool,
    pub has_content: bool,
    pub accepts_options: bool,
}

/// The directive shape used for `{code-cell}` and `{raw-cell}` fences.
pub const CELL_DIRECTIVE: DirectiveSpec = DirectiveSpec {
    required_arguments: 0,
    optional_arguments: 1,
    final_argument_whitespace: false,
    has_content: true,
    accepts_options: true,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveParsingError {
    #[error("Invalid options YAML: {0}")]
    InvalidYaml(String),

    #[error("Invalid options (not dict): {0}")]
    NotAMapping(String),

    #[error("{required} argument(s) required, {supplied} supplied")]
    MissingArguments { required: usize, supplied: usize },

    #[error("maximum {allowed} argument(s) allowed, {supplied} supplied")]
    TooManyArguments { allowed: usize, supplied: usize },

    #[error("No content permitted")]
    ContentNotPermitted,
}

/// A directive split into its parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDirective {
    pub arguments: Vec<String>,
    pub options: Metadata,
    pub body_lines: Vec<String>,
}

/// Parses the text of a directive against `spec`.
///
/// `argument_str` is the text following the directive name; `content` is
/// everything inside the fence.
pub fn parse_directive_text(
    spec: &DirectiveSpec,
    argument_str: &str,
    content: &str,
) -> Result<ParsedDirective, DirectiveParsingError> {
    let (body, options) = if spec.accepts_options {
        parse_directive_options(content)?
    } else {
        (content.to_string(), Metadata::new())
    };
    let mut body_lines: Vec<String> = body.lines().map(str::to_string).collect();

    // With no arguments or options possible, text on the directive line is body.
    let mut argument_str = argument_str;
    if spec.required_arguments == 0
        && spec.optional_arguments == 0
        && options.is_empty()
        && !argument_str.is_empty()
    {
        body_lines.insert(0, argument_str.to_string());
        argument_str = "";
    }

    let arguments = parse_directive_arguments(spec, argument_str)?;

    // A blank line may separate the options from the body.
    if body_lines.first().is_some_and(|line| line.trim().is_empty()) {
        body_lines.remove(0);
    }

    if !body_lines.is_empty() && !spec.has_content {
        return Err(DirectiveParsingError::ContentNotPermitted);
    }

    Ok(ParsedDirective {
        arguments,
        options,
        body_lines,
    })
}

/// Splits a leading option block off `content`, returning `(body, options)`.
pub fn parse_directive_options(
    content: &str,
) -> Result<(String, Metadata), DirectiveParsingError> {
    let (yaml_block, body) = if content.starts_with("---") {
        let rest = content.split_once('\n').map_or("", |(_, rest)| rest);
        match option_block_end().find(rest) {
            Some(delimiter) => {
                // Skip the rest of the delimiter line, i.e. its newline.
                let mut after = rest[delimiter.end()..].chars();
                after.next();
                (dedent(&rest[..delimiter.start()]), after.as_str().to_string())
            }
            None => (dedent(rest), String::new()),
        }
    } else if content.trim_start().starts_with(':') {
        let mut lines = content.lines().peekable();
        let mut yaml_lines = Vec::new();
        while let Some(line) = lines.next_if(|line| line.trim_start().starts_with(':')) {
            yaml_lines.push(&line.trim_start()[1..]);
        }
        (yaml_lines.join("\n"), lines.collect::<Vec<_>>().join("\n"))
    } else {
        return Ok((content.to_string(), Metadata::new()));
    };

    if yaml_block.trim().is_empty() {
        return Ok((body, Metadata::new()));
    }

    match parse_yaml(&yaml_block) {
        Ok(Value::Object(options)) => Ok((body, options)),
        Ok(value) if is_falsy(&value) => Ok((body, Metadata::new())),
        Ok(value) => Err(DirectiveParsingError::NotAMapping(value.to_string())),
        Err(err) => Err(DirectiveParsingError::InvalidYaml(err.to_string())),
    }
}

fn option_block_end() -> &'static Regex {
    static OPTION_BLOCK_END: OnceLock<Regex> = OnceLock::new();
    OPTION_BLOCK_END
        .get_or_init(|| Regex::new(r"(?m)^-{3,}").expect("Invalid option block regex"))
}

fn parse_directive_arguments(
    spec: &DirectiveSpec,
    argument_str: &str,
) -> Result<Vec<String>, DirectiveParsingError> {
    let supplied = argument_str.split_whitespace().count();
    let allowed = spec.required_arguments + spec.optional_arguments;

    if supplied < spec.required_arguments {
        return Err(DirectiveParsingError::MissingArguments {
            required: spec.required_arguments,
            supplied,
        });
    }
    if supplied <= allowed {
        return Ok(argument_str.split_whitespace().map(str::to_string).collect());
    }
    if !spec.final_argument_whitespace || allowed == 0 {
        return Err(DirectiveParsingError::TooManyArguments { allowed, supplied });
    }

    // Fold the surplus into the last argument.
    let mut arguments = Vec::with_capacity(allowed);
    let mut rest = argument_str.trim_start();
    while arguments.len() + 1 < allowed {
        match rest.split_once(char::is_whitespace) {
            Some((head, tail)) => {
                arguments.push(head.to_string());
                rest = tail.trim_start();
            }
            None => break,
        }
    }
    if !rest.is_empty() {
        arguments.push(rest.to_string());
    }
    Ok(arguments)
}

/// Removes the indentation common to all non-blank lines.
fn dedent(text: &str) -> String {
    let indent = |line: &str| line.len() - line.trim_start_matches([' ', '\t']).len();
    let margin = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(indent)
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                &line[margin..]
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
