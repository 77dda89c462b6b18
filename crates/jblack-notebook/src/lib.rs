//! # jblack-notebook
//!
//! Lossless Jupyter Notebook (.ipynb) document model for jblack.
//!
//! This crate parses notebook files into an ordered list of cells, exposes
//! the source of code cells as editable text, and writes the document back
//! in the exact textual layout it was read with:
//! - Code cells (source fragments, editable)
//! - Other cells (markdown, raw), passed through untouched
//! - Every other field of the document and of each cell, in original order
//!
//! ## Example
//!
//! ```no_run
//! use jblack_notebook::parse_notebook;
//!
//! let mut notebook = parse_notebook("example.ipynb")?;
//! for cell in notebook.code_cells_mut() {
//!     let upper = cell.source().to_uppercase();
//!     cell.set_source(&upper);
//! }
//! std::fs::write("example.ipynb", notebook.to_json_string()?)?;
//! # Ok::<(), jblack_notebook::NotebookError>(())
//! ```

/// Error types for notebook parsing
pub mod error;
/// Jupyter notebook (ipynb) document model
pub mod ipynb;
/// Textual layout detection and reproduction
pub mod layout;
/// Source fragment join/split
pub mod source;

pub use error::{NotebookError, Result};
pub use ipynb::{
    parse_notebook, parse_notebook_from_str, Cell, CodeCell, Notebook, SourceShape,
};
pub use layout::Layout;
pub use source::{join_fragments, split_fragments};
