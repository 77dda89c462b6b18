//! # jblack-core
//!
//! Black formatting for the code cells of Jupyter notebooks.
//!
//! - [`black`]: the `black` executable behind the [`CodeFormatter`] trait
//! - [`rewrite`]: per-cell formatting, with IPython magics kept in place and
//!   unparseable code left as it was
//! - [`notebook_file`]: format or check one notebook, with atomic writes
//! - [`targets`]: expand command-line paths into notebook files
//! - [`batch`]: process many notebooks, sequentially or on a thread pool
//!
//! ## Example
//!
//! ```no_run
//! use jblack_core::{discover, run_batch, BatchOptions, BlackFormatter};
//! use std::sync::atomic::AtomicBool;
//!
//! let files = discover(&["notebooks/"])?;
//! let formatter = BlackFormatter::new();
//! let report = run_batch(&files, &formatter, &BatchOptions::default(), &AtomicBool::new(false), |_| {})?;
//! for file in report.reports() {
//!     println!("{} {}", file.status, file.path.display());
//! }
//! # Ok::<(), jblack_core::JblackError>(())
//! ```

pub mod batch;
pub mod black;
/// Error types for formatting runs
pub mod error;
pub mod formatter;
pub mod magic;
/// Formatting options passed through to the formatter
pub mod mode;
pub mod notebook_file;
pub mod rewrite;
pub mod targets;

#[cfg(test)]
mod testing;

pub use batch::{load_all, run_batch, BatchOptions, BatchReport, FileOutcome};
pub use black::BlackFormatter;
pub use error::{FormatterError, JblackError, Result};
pub use formatter::CodeFormatter;
pub use magic::{is_magic_line, Segments, MAGIC_PREFIXES};
pub use mode::{Mode, TargetVersion, DEFAULT_LINE_LENGTH};
pub use notebook_file::{
    check_notebook, format_notebook, write_atomically, Action, FileReport, FileStatus, NotebookFile,
};
pub use rewrite::{CellRewriter, InvalidCode};
pub use targets::{discover, is_notebook, NOTEBOOK_EXTENSION};

pub use jblack_notebook;
