//! Formatting or checking many notebooks in one run
//!
//! Every notebook is loaded and parsed before any of them is touched, so a
//! malformed file aborts the run with nothing written. The notebooks are
//! then processed in the calling thread or on a dedicated rayon pool; either
//! way outcomes come back in input order.

use crate::error::{JblackError, Result};
use crate::formatter::CodeFormatter;
use crate::mode::Mode;
use crate::notebook_file::{Action, FileReport, FileStatus, NotebookFile};
use crate::rewrite::InvalidCode;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome of one file: its report, or the error that stopped it
pub type FileOutcome = Result<FileReport>;

/// Options shared by every file of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub action: Action,
    /// Number of files processed concurrently; 0 and 1 both mean sequential
    pub workers: usize,
    pub mode: Mode,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            action: Action::Format,
            workers: 1,
            mode: Mode::default(),
        }
    }
}

/// Outcomes of a run, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Vec<FileOutcome>,
    cancelled: bool,
}

impl BatchReport {
    /// Outcomes of the files that were processed to completion.
    #[must_use]
    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    /// Whether the run was interrupted before every file was processed.
    #[inline]
    #[must_use]
    pub const fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// Reports of files that completed.
    pub fn reports(&self) -> impl Iterator<Item = &FileReport> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    /// Errors of files that failed.
    pub fn failures(&self) -> impl Iterator<Item = &JblackError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    /// Number of completed files with `status`.
    #[must_use]
    pub fn count(&self, status: FileStatus) -> usize {
        self.reports().filter(|r| r.status == status).count()
    }

    /// Unparseable code across all files.
    #[must_use]
    pub fn invalid_code(&self) -> InvalidCode {
        let mut all = InvalidCode::new();
        for report in self.reports() {
            all.extend(report.invalid_code.clone());
        }
        all
    }

    /// No file failed and, in check mode, none would be reformatted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.cancelled && self.failures().next().is_none() && self.count(FileStatus::WouldReformat) == 0
    }
}

/// Load and parse every file.
///
/// # Errors
///
/// Returns [`JblackError::Notebook`] for the first file that cannot be read
/// or parsed.
pub fn load_all<P: AsRef<Path>>(files: &[P]) -> Result<Vec<NotebookFile>> {
    files.iter().map(NotebookFile::load).collect()
}

/// Format or check `files` as `options` say.
///
/// `on_done` is called once per completed file, from the worker that
/// processed it. Files not started when `cancel` is raised, and files that
/// notice it mid-way, are left out of the report and are not written.
///
/// # Errors
///
/// Returns [`JblackError::Notebook`] if any file cannot be loaded (before
/// anything is written) and [`JblackError::ThreadPool`] if the worker pool
/// cannot be built. Per-file failures are reported in the [`BatchReport`].
pub fn run_batch<F, C>(
    files: &[PathBuf],
    formatter: &F,
    options: &BatchOptions,
    cancel: &AtomicBool,
    on_done: C,
) -> Result<BatchReport>
where
    F: CodeFormatter + ?Sized,
    C: Fn(&FileOutcome) + Sync,
{
    let notebooks = load_all(files)?;
    log::debug!(
        "{} notebook(s) loaded, processing with {} worker(s)",
        notebooks.len(),
        options.workers.max(1)
    );

    let process = |file: NotebookFile| -> Option<FileOutcome> {
        if cancel.load(Ordering::SeqCst) {
            return None;
        }
        let path = file.path().to_path_buf();
        let outcome = file.process(options.action, formatter, &options.mode, cancel);
        match &outcome {
            Err(JblackError::Cancelled) => {
                log::debug!("{} interrupted", path.display());
                return None;
            }
            Err(e) => log::debug!("{} failed: {e}", path.display()),
            Ok(report) => log::debug!("{} {}", path.display(), report.status),
        }
        on_done(&outcome);
        Some(outcome)
    };

    let outcomes: Vec<Option<FileOutcome>> = if options.workers <= 1 {
        notebooks.into_iter().map(process).collect()
    } else {
        let pool = ThreadPoolBuilder::new().num_threads(options.workers).build()?;
        pool.install(|| notebooks.into_par_iter().map(process).collect())
    };

    Ok(BatchReport {
        outcomes: outcomes.into_iter().flatten().collect(),
        cancelled: cancel.load(Ordering::SeqCst),
    })
}
