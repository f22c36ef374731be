//! # Notebook Interchange (`.ipynb`)
//!
//! Reads and writes the nbformat v4 JSON document format:
//!
//! ```json
//! {
//!  "cells": [
//!   {
//!    "cell_type": "code",
//!    "execution_count": null,
//!    "metadata": {},
//!    "outputs": [],
//!    "source": [
//!     "print(1)"
//!    ]
//!   }
//!  ],
//!  "metadata": {},
//!  "nbformat": 4,
//!  "nbformat_minor": 4
//! }
//! ```
//!
//! Keys are written in sorted order with a one space indent, the same layout
//! Jupyter produces. Cell line tracking is stored in the cell metadata under
//! [`SOURCE_LINES_KEY`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Cell, CellKind, Metadata, Notebook};
use crate::tokens::LineSpan;

pub const NBFORMAT: u32 = 4;
pub const NBFORMAT_MINOR: u32 = 4;

/// Cell metadata key holding `[start, end)` source lines.
pub const SOURCE_LINES_KEY: &str = "_source_lines";

#[derive(Debug, Serialize, Deserialize)]
struct IpynbNotebook {
    cells: Vec<IpynbCell>,
    #[serde(default)]
    metadata: Metadata,
    nbformat: u32,
    #[serde(default)]
    nbformat_minor: u32,
}

/// Fields are declared in key order.
#[derive(Debug, Serialize, Deserialize)]
struct IpynbCell {
    cell_type: CellKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    execution_count: Option<Option<u64>>,
    #[serde(default)]
    metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outputs: Option<Vec<Value>>,
    source: Source,
}

/// Cell source: either one string or a list of lines to concatenate.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Source {
    Text(String),
    Lines(Vec<String>),
}

impl Source {
    fn into_string(self) -> String {
        match self {
            Source::Text(text) => text,
            Source::Lines(lines) => lines.concat(),
        }
    }
}

impl From<&Cell> for IpynbCell {
    fn from(cell: &Cell) -> Self {
        let mut metadata = cell.metadata.clone();
        if let Some(lines) = cell.source_lines {
            metadata.insert(
                SOURCE_LINES_KEY.to_string(),
                Value::from(vec![lines.start, lines.end]),
            );
        }

        let is_code = cell.kind == CellKind::Code;
        Self {
            cell_type: cell.kind,
            execution_count: is_code.then_some(None),
            metadata,
            outputs: is_code.then(Vec::new),
            source: Source::Lines(
                cell.source
                    .split_inclusive('\n')
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }
}

impl From<IpynbCell> for Cell {
    fn from(cell: IpynbCell) -> Self {
        let mut metadata = cell.metadata;
        let source_lines = take_source_lines(&mut metadata);

        let cell = Cell::new(cell.cell_type, cell.source.into_string()).with_metadata(metadata);
        match source_lines {
            Some(lines) => cell.with_source_lines(lines),
            None => cell,
        }
    }
}

/// Removes a well formed `_source_lines` entry from `metadata`.
fn take_source_lines(metadata: &mut Metadata) -> Option<LineSpan> {
    let lines = match metadata.get(SOURCE_LINES_KEY)?.as_array()?.as_slice() {
        [start, end] => LineSpan::new(
            usize::try_from(start.as_u64()?).ok()?,
            usize::try_from(end.as_u64()?).ok()?,
        ),
        _ => return None,
    };
    metadata.remove(SOURCE_LINES_KEY);
    Some(lines)
}

/// Serializes a notebook as nbformat v4 JSON.
pub fn to_ipynb_string(notebook: &Notebook) -> serde_json::Result<String> {
    let document = IpynbNotebook {
        cells: notebook.cells.iter().map(IpynbCell::from).collect(),
        metadata: notebook.metadata.clone(),
        nbformat: NBFORMAT,
        nbformat_minor: NBFORMAT_MINOR,
    };

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)
        .map_err(<serde_json::Error as serde::ser::Error>::custom)?;
    json.push('\n');
    Ok(json)
}

/// Parses nbformat v4 JSON. Outputs and execution counts are dropped.
pub fn from_ipynb_str(json: &str) -> serde_json::Result<Notebook> {
    let document: IpynbNotebook = serde_json::from_str(json)?;
    if document.nbformat != NBFORMAT {
        return Err(<serde_json::Error as serde::de::Error>::custom(format!(
            "unsupported nbformat version {}",
            document.nbformat
        )));
    }

    Ok(Notebook::new(
        document.metadata,
        document.cells.into_iter().map(Cell::from).collect(),
    ))
}
