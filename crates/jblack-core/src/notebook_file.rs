//! Format and check operations on whole notebooks

use crate::error::{FormatterError, JblackError, Result};
use crate::formatter::CodeFormatter;
use crate::mode::Mode;
use crate::rewrite::{CellRewriter, InvalidCode};
use jblack_notebook::{parse_notebook, split_fragments, Notebook};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::NamedTempFile;

/// What to do with each notebook
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Action {
    /// Rewrite notebooks in place
    #[default]
    Format,
    /// Only report whether notebooks are formatted
    Check,
}

/// Outcome for one notebook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    /// At least one code cell changed and the file was rewritten
    Reformatted,
    /// Check mode: at least one code cell is not formatted
    WouldReformat,
    /// Every code cell is already formatted
    Unchanged,
}

impl fmt::Display for FileStatus {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reformatted => "reformatted",
            Self::WouldReformat => "would reformat",
            Self::Unchanged => "unchanged",
        };
        write!(f, "{s}")
    }
}

/// Result of formatting or checking one notebook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    /// Code the formatter could not parse, left as it was
    pub invalid_code: InvalidCode,
}

/// A notebook loaded from disk, ready to be formatted or checked
#[derive(Debug, Clone, PartialEq)]
pub struct NotebookFile {
    path: PathBuf,
    notebook: Notebook,
}

impl NotebookFile {
    /// Read and parse the notebook at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`JblackError::Notebook`] if the file cannot be read or is not a notebook.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let notebook = parse_notebook(&path).map_err(|source| JblackError::Notebook {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, notebook })
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    #[must_use]
    pub const fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    /// Run `action` on this notebook.
    ///
    /// # Errors
    ///
    /// See [`NotebookFile::format`] and [`NotebookFile::check`].
    pub fn process<F: CodeFormatter + ?Sized>(
        self,
        action: Action,
        formatter: &F,
        mode: &Mode,
        cancel: &AtomicBool,
    ) -> Result<FileReport> {
        match action {
            Action::Format => self.format(formatter, mode, cancel),
            Action::Check => self.check(formatter, mode, cancel),
        }
    }

    /// Format every code cell and write the notebook back if anything changed.
    ///
    /// The file is replaced atomically; an interrupted or failed run leaves
    /// it as it was.
    ///
    /// # Errors
    ///
    /// Returns [`JblackError::Cancelled`] if `cancel` is raised before the
    /// last cell is done, [`JblackError::Formatter`] if the formatter fails,
    /// and [`JblackError::Write`] if the file cannot be replaced.
    pub fn format<F: CodeFormatter + ?Sized>(
        mut self,
        formatter: &F,
        mode: &Mode,
        cancel: &AtomicBool,
    ) -> Result<FileReport> {
        log::debug!("formatting {}", self.path.display());
        let (changed, invalid_code) = format_notebook(&mut self.notebook, formatter, mode, cancel)
            .map_err(|e| file_error(&self.path, e))?;

        let status = if changed {
            let contents = self.notebook.to_json_string().map_err(|source| JblackError::Notebook {
                path: self.path.clone(),
                source,
            })?;
            if cancel.load(Ordering::SeqCst) {
                return Err(JblackError::Cancelled);
            }
            write_atomically(&self.path, &contents).map_err(|source| JblackError::Write {
                path: self.path.clone(),
                source,
            })?;
            FileStatus::Reformatted
        } else {
            FileStatus::Unchanged
        };

        Ok(FileReport {
            path: self.path,
            status,
            invalid_code,
        })
    }

    /// Check whether every code cell is already formatted. Never writes.
    ///
    /// # Errors
    ///
    /// Returns [`JblackError::Cancelled`] or [`JblackError::Formatter`] as
    /// [`NotebookFile::format`] does.
    pub fn check<F: CodeFormatter + ?Sized>(
        &self,
        formatter: &F,
        mode: &Mode,
        cancel: &AtomicBool,
    ) -> Result<FileReport> {
        log::debug!("checking {}", self.path.display());
        let (formatted, invalid_code) = check_notebook(&self.notebook, formatter, mode, cancel)
            .map_err(|e| file_error(&self.path, e))?;

        Ok(FileReport {
            path: self.path.clone(),
            status: if formatted {
                FileStatus::Unchanged
            } else {
                FileStatus::WouldReformat
            },
            invalid_code,
        })
    }
}

fn file_error(path: &Path, error: FormatterError) -> JblackError {
    match error {
        FormatterError::Interrupted => JblackError::Cancelled,
        source => JblackError::Formatter {
            path: path.to_path_buf(),
            source,
        },
    }
}

/// Format every code cell of `notebook` in place.
///
/// A cell whose formatted text splits into exactly its current fragments is
/// left untouched.
/// Returns whether any cell changed, and the code that could not be parsed.
///
/// # Errors
///
/// Returns [`FormatterError::Interrupted`] as soon as `cancel` is raised,
/// and any formatter failure other than unparseable input.
pub fn format_notebook<F: CodeFormatter + ?Sized>(
    notebook: &mut Notebook,
    formatter: &F,
    mode: &Mode,
    cancel: &AtomicBool,
) -> std::result::Result<(bool, InvalidCode), FormatterError> {
    let rewriter = CellRewriter::new(formatter, mode);
    let mut invalid = InvalidCode::new();
    let mut changed = false;

    for cell in notebook.code_cells_mut() {
        if cancel.load(Ordering::SeqCst) {
            return Err(FormatterError::Interrupted);
        }
        let original = cell.source();
        let formatted = rewriter.format_cell(&original, &mut invalid)?;
        if split_fragments(&formatted) != cell.fragments() {
            log::debug!(
                "reformatting code cell {} ({:?} source)",
                cell.id().unwrap_or("without id"),
                cell.shape()
            );
            cell.set_source(&formatted);
            changed = true;
        }
    }

    Ok((changed, invalid))
}

/// Check whether every code cell of `notebook` is already formatted.
///
/// Stops at the first cell that is not; when all are, every cell has been
/// visited and all unparseable code is reported.
///
/// # Errors
///
/// As [`format_notebook`].
pub fn check_notebook<F: CodeFormatter + ?Sized>(
    notebook: &Notebook,
    formatter: &F,
    mode: &Mode,
    cancel: &AtomicBool,
) -> std::result::Result<(bool, InvalidCode), FormatterError> {
    let rewriter = CellRewriter::new(formatter, mode);
    let mut invalid = InvalidCode::new();

    for cell in notebook.code_cells() {
        if cancel.load(Ordering::SeqCst) {
            return Err(FormatterError::Interrupted);
        }
        let original = cell.source();
        let formatted = rewriter.format_cell(&original, &mut invalid)?;
        if split_fragments(&formatted) != cell.fragments() {
            return Ok((false, invalid));
        }
    }

    Ok((true, invalid))
}

/// Replace `path` with `contents` in one rename.
///
/// The temporary file is created next to `path` so the rename stays on one
/// filesystem; the original file's permissions are carried over.
///
/// # Errors
///
/// Returns any I/O error from creating, writing or renaming the temporary file.
pub fn write_atomically(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), metadata.permissions())?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
