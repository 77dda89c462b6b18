use jblack_notebook::NotebookError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by a code formatter for a single unit of source text
#[derive(Error, Debug)]
pub enum FormatterError {
    /// The formatter could not parse the input
    ///
    /// `line` is the offending source line as quoted by the formatter, when it
    /// reports one.
    #[error("{message}")]
    CannotParse {
        /// Formatter's message, e.g. `Cannot parse: 1:0: %matplotlib inline`
        message: String,
        /// Offending source line
        line: Option<String>,
    },

    /// The formatter executable could not be started
    #[error("Formatter `{program}` not found. Please install Black: <https://black.readthedocs.io>")]
    NotFound {
        /// Program that was looked up
        program: String,
    },

    /// The formatter exited with an unexpected status
    #[error("Formatter failed (exit code {code:?}): {stderr}")]
    Failed {
        /// Exit code, `None` when unavailable
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The formatter was stopped by a signal (e.g. Ctrl-C)
    #[error("Formatter was interrupted")]
    Interrupted,

    /// I/O error while talking to the formatter
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Formatter output is not valid UTF-8
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl FormatterError {
    /// Whether the input was rejected as unparseable (as opposed to the
    /// formatter itself failing).
    #[inline]
    #[must_use]
    pub const fn is_cannot_parse(&self) -> bool {
        matches!(self, Self::CannotParse { .. })
    }
}

/// Errors that abort formatting of a file or of a whole run
#[derive(Error, Debug)]
pub enum JblackError {
    /// One or more targets do not exist
    #[error("Paths {} do not exist", display_paths(.0))]
    MissingTargets(Vec<PathBuf>),

    /// A target file does not have the `.ipynb` extension
    #[error("File {} does not have extension .ipynb", .0.display())]
    InvalidExtension(PathBuf),

    /// Directory expansion failed
    #[error("Failed to expand directory {}: {message}", path.display())]
    Glob {
        /// Directory being expanded
        path: PathBuf,
        /// Underlying error
        message: String,
    },

    /// A notebook could not be read or parsed
    #[error("Cannot read notebook {}: {source}", path.display())]
    Notebook {
        /// Notebook path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: NotebookError,
    },

    /// The formatter failed for reasons other than unparseable input
    #[error("Cannot format {}: {source}", path.display())]
    Formatter {
        /// Notebook path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: FormatterError,
    },

    /// Writing the formatted notebook failed
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        /// Notebook path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Work was cancelled before it completed
    #[error("Cancelled")]
    Cancelled,

    /// The worker pool could not be created
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

fn display_paths(paths: &[PathBuf]) -> String {
    let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    format!("[{}]", names.join(", "))
}

/// Result type alias for jblack operations
pub type Result<T> = std::result::Result<T, JblackError>;
