use crate::error::{NotebookError, Result};
use crate::layout::Layout;
use crate::source::{join_fragments, split_fragments};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// A Jupyter notebook document
///
/// Only the parts a formatter touches are typed: the ordered cell list and
/// the source of code cells. Every other field is kept as read, in its
/// original order, and written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Notebook {
    cells: Vec<Cell>,
    /// Top-level fields; the `cells` entry is a placeholder holding its position
    fields: Map<String, Value>,
    layout: Layout,
}

/// Individual notebook cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Executable code cell
    Code(CodeCell),
    /// Any other cell (markdown, raw, ...), passed through untouched
    Other(Value),
}

/// How a cell's `source` field was stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SourceShape {
    /// A list of line fragments (what nbformat writes)
    #[default]
    Lines,
    /// A single string (also legal nbformat)
    Text,
}

/// A code cell: its source fragments plus every other field of the cell object
#[derive(Debug, Clone, PartialEq)]
pub struct CodeCell {
    fragments: Vec<String>,
    shape: SourceShape,
    /// Cell fields; the `source` entry is a placeholder holding its position
    fields: Map<String, Value>,
}

impl CodeCell {
    /// The cell's source text (fragments joined).
    #[inline]
    #[must_use]
    pub fn source(&self) -> String {
        join_fragments(&self.fragments)
    }

    /// The cell's source fragments as stored.
    #[inline]
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    #[inline]
    #[must_use]
    pub const fn shape(&self) -> SourceShape {
        self.shape
    }

    /// Replace the cell's source, re-deriving the fragment list from `text`.
    pub fn set_source(&mut self, text: &str) {
        self.fragments = split_fragments(text);
    }

    /// The nbformat 4.5+ cell id, if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    fn from_fields(index: usize, mut fields: Map<String, Value>) -> Result<Self> {
        let source = fields.get_mut("source").map(Value::take).ok_or_else(|| {
            NotebookError::InvalidFormat(format!("code cell {index} has no `source` field"))
        })?;

        let (fragments, shape) = match source {
            Value::String(text) => (split_fragments(&text), SourceShape::Text),
            Value::Array(items) => {
                let fragments = items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s),
                        other => Err(NotebookError::InvalidFormat(format!(
                            "code cell {index} has a non-string source line: {other}"
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                (fragments, SourceShape::Lines)
            }
            other => {
                return Err(NotebookError::InvalidFormat(format!(
                    "code cell {index} has an invalid `source` field: {other}"
                )))
            }
        };

        Ok(Self {
            fragments,
            shape,
            fields,
        })
    }

    fn to_value(&self) -> Value {
        let source = match self.shape {
            SourceShape::Lines => Value::Array(
                self.fragments
                    .iter()
                    .map(|fragment| Value::String(fragment.clone()))
                    .collect(),
            ),
            SourceShape::Text => Value::String(self.source()),
        };
        let mut fields = self.fields.clone();
        // The placeholder keeps `source` at its original position.
        fields.insert("source".to_string(), source);
        Value::Object(fields)
    }
}

impl Cell {
    fn from_value(index: usize, value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(NotebookError::InvalidFormat(format!(
                "cell {index} is not a JSON object"
            )));
        };

        let is_code = match fields.get("cell_type") {
            Some(Value::String(cell_type)) => cell_type == "code",
            Some(other) => {
                return Err(NotebookError::InvalidFormat(format!(
                    "cell {index} has an invalid `cell_type`: {other}"
                )))
            }
            None => {
                return Err(NotebookError::InvalidFormat(format!(
                    "cell {index} has no `cell_type` field"
                )))
            }
        };

        if is_code {
            Ok(Self::Code(CodeCell::from_fields(index, fields)?))
        } else {
            Ok(Self::Other(Value::Object(fields)))
        }
    }

    /// The cell's `cell_type` tag.
    #[must_use]
    pub fn cell_type(&self) -> &str {
        match self {
            Self::Code(_) => "code",
            Self::Other(value) => value
                .get("cell_type")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_code(&self) -> Option<&CodeCell> {
        match self {
            Self::Code(cell) => Some(cell),
            Self::Other(_) => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Code(cell) => cell.to_value(),
            Self::Other(value) => value.clone(),
        }
    }
}

impl Notebook {
    /// All cells in document order.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Code cells in document order.
    pub fn code_cells(&self) -> impl Iterator<Item = &CodeCell> {
        self.cells.iter().filter_map(Cell::as_code)
    }

    /// Mutable code cells in document order.
    pub fn code_cells_mut(&mut self) -> impl Iterator<Item = &mut CodeCell> {
        self.cells.iter_mut().filter_map(|cell| match cell {
            Cell::Code(code) => Some(code),
            Cell::Other(_) => None,
        })
    }

    /// The layout the document was read with.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The document as a JSON tree, fields in original order.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut fields = self.fields.clone();
        fields.insert(
            "cells".to_string(),
            Value::Array(self.cells.iter().map(Cell::to_value).collect()),
        );
        Value::Object(fields)
    }

    /// Serialize the document back to text using its original layout.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        if self.layout.bom {
            buf.extend_from_slice("\u{feff}".as_bytes());
        }
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, self.layout.formatter());
        self.to_value().serialize(&mut serializer)?;
        if self.layout.trailing_newline {
            buf.extend_from_slice(self.layout.line_ending.as_bytes());
        }
        Ok(String::from_utf8(buf)?)
    }
}

impl FromStr for Notebook {
    type Err = NotebookError;

    fn from_str(content: &str) -> Result<Self> {
        parse_notebook_from_str(content)
    }
}

/// Parse a Jupyter Notebook from a file path
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read (I/O error)
/// - The file is not valid UTF-8
/// - The notebook JSON is malformed or lacks the expected structure
#[must_use = "this function returns a parsed notebook that should be processed"]
pub fn parse_notebook<P: AsRef<Path>>(path: P) -> Result<Notebook> {
    let content = String::from_utf8(fs::read(path)?)?;
    parse_notebook_from_str(&content)
}

/// Parse a Jupyter Notebook from a string
///
/// # Errors
///
/// Returns an error if the JSON is malformed, has no `cells` list, or a
/// cell lacks `cell_type` (or `source`, for code cells).
#[must_use = "this function returns a parsed notebook that should be processed"]
pub fn parse_notebook_from_str(content: &str) -> Result<Notebook> {
    let layout = Layout::detect(content);
    let body = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Value::Object(mut fields) = serde_json::from_str(body)? else {
        return Err(NotebookError::InvalidFormat(
            "top-level value is not a JSON object".to_string(),
        ));
    };

    let raw_cells = match fields.get_mut("cells").map(Value::take) {
        Some(Value::Array(cells)) => cells,
        Some(_) => {
            return Err(NotebookError::InvalidFormat(
                "`cells` is not a list".to_string(),
            ))
        }
        None => {
            return Err(NotebookError::InvalidFormat(
                "notebook has no `cells` field".to_string(),
            ))
        }
    };

    let cells = raw_cells
        .into_iter()
        .enumerate()
        .map(|(index, value)| Cell::from_value(index, value))
        .collect::<Result<Vec<_>>>()?;

    Ok(Notebook {
        cells,
        fields,
        layout,
    })
}
