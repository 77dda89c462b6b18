//! Black, run as a subprocess
//!
//! Each call pipes one unit of source through `black -q -` and reads the
//! formatted text back from stdout. Black exits with status 123 when it
//! cannot parse its input and reports the offending line on stderr:
//!
//! ```text
//! error: cannot format -: Cannot parse: 1:0: %matplotlib inline
//! error: cannot format -: Cannot parse for target version Python 3.12: 2:4:     !ls
//! ```

use crate::error::FormatterError;
use crate::formatter::CodeFormatter;
use crate::mode::Mode;
use regex::Regex;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::LazyLock;
use std::thread;

/// Exit status Black uses for "cannot format"
const EXIT_CANNOT_FORMAT: i32 = 123;

static RE_CANNOT_PARSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Cannot parse(?: for target version [^:]+)?: \d+:\d+: ?(.*)")
        .expect("valid cannot-parse regex")
});
static RE_ERROR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^error: cannot format [^:]*: ").expect("valid prefix regex"));

/// Formatter backed by the `black` executable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlackFormatter {
    program: PathBuf,
}

impl Default for BlackFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl BlackFormatter {
    /// Use `black` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("black"),
        }
    }

    /// Use a specific Black executable.
    #[must_use]
    pub fn with_program<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check that Black can be run, returning its version line.
    ///
    /// # Errors
    ///
    /// Returns [`FormatterError::NotFound`] if the executable cannot be
    /// started or does not report a version.
    #[must_use = "this function returns the Black version string that should be used or logged"]
    pub fn probe(&self) -> Result<String, FormatterError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .map_err(|_| self.not_found())?;

        if !output.status.success() {
            return Err(self.not_found());
        }

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("unknown")
            .to_string();
        log::debug!("using {version} from {}", self.program.display());
        Ok(version)
    }

    fn not_found(&self) -> FormatterError {
        FormatterError::NotFound {
            program: self.program.display().to_string(),
        }
    }

    fn run(&self, source: &str, mode: &Mode) -> Result<Output, FormatterError> {
        let mut child = Command::new(&self.program)
            .args(mode_args(mode))
            .arg("-q")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => self.not_found(),
                _ => FormatterError::Io(e),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("formatter stdin unavailable"))?;

        // Feed stdin from a separate thread so a large cell cannot deadlock
        // against a full stdout pipe.
        thread::scope(|scope| -> Result<Output, FormatterError> {
            let writer = scope.spawn(move || stdin.write_all(source.as_bytes()));
            let output = child.wait_with_output();
            match writer.join() {
                Ok(Err(e)) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
                Err(_) => return Err(io::Error::other("formatter stdin writer panicked").into()),
                _ => {}
            }
            Ok(output?)
        })
    }
}

impl CodeFormatter for BlackFormatter {
    fn format_code(&self, source: &str, mode: &Mode) -> Result<String, FormatterError> {
        let output = self.run(source, mode)?;

        match output.status.code() {
            Some(0) => Ok(String::from_utf8(output.stdout)?),
            Some(EXIT_CANNOT_FORMAT) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(classify_failure(&stderr).unwrap_or_else(|| FormatterError::Failed {
                    code: Some(EXIT_CANNOT_FORMAT),
                    stderr: stderr.trim().to_string(),
                }))
            }
            None => Err(FormatterError::Interrupted),
            code => Err(FormatterError::Failed {
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

/// Command-line options passing `mode` to Black.
fn mode_args(mode: &Mode) -> Vec<String> {
    let mut args = vec!["--line-length".to_string(), mode.line_length.to_string()];
    if !mode.string_normalization {
        args.push("--skip-string-normalization".to_string());
    }
    for version in &mode.target_versions {
        args.push("--target-version".to_string());
        args.push(version.to_string());
    }
    if mode.is_pyi {
        args.push("--pyi".to_string());
    }
    args
}

/// Turn Black's stderr into a [`FormatterError::CannotParse`], if it is one.
fn classify_failure(stderr: &str) -> Option<FormatterError> {
    stderr.lines().find_map(|line| {
        let captures = RE_CANNOT_PARSE.captures(line)?;
        let message = RE_ERROR_PREFIX.replace(line.trim(), "").into_owned();
        let offending = captures.get(1).map(|m| m.as_str().to_string());
        Some(FormatterError::CannotParse {
            message,
            line: offending,
        })
    })
}
