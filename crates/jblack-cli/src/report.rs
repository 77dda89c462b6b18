//! Console output for a formatting run

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use jblack_core::{Action, BatchReport, FileStatus, InvalidCode};

/// Verbosity level for output control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verbosity {
    /// Suppress all output except errors
    Quiet,
    /// Normal output (default)
    Normal,
    /// Verbose output with extra details
    Verbose,
}

impl Verbosity {
    /// Create from CLI flags
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Check if output should be shown (not quiet)
    pub const fn should_show_output(self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Check if verbose output is requested
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Default `env_logger` filter for this level
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Verbose => "debug",
            Self::Quiet | Self::Normal => "error",
        }
    }
}

/// Progress bar for multi-file runs, hidden otherwise
pub fn progress_bar(total_files: usize, verbosity: Verbosity) -> ProgressBar {
    if total_files > 1 && verbosity.should_show_output() {
        let pb = ProgressBar::new(total_files as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .expect("template is compile-time constant")
                .progress_chars("█▓▒░  "),
        );
        pb
    } else {
        ProgressBar::hidden()
    }
}

/// Print per-file results, unparseable code and the closing summary.
pub fn print_report(report: &BatchReport, action: Action, verbosity: Verbosity, show_invalid_code: bool) {
    for outcome in report.outcomes() {
        match outcome {
            Ok(file) => match file.status {
                FileStatus::Reformatted if verbosity.should_show_output() => {
                    eprintln!("{} {}", "reformatted".bold(), file.path.display());
                }
                FileStatus::WouldReformat => {
                    eprintln!("{} {}", "would reformat".bold(), file.path.display());
                }
                FileStatus::Unchanged if verbosity.is_verbose() => {
                    eprintln!("{} {}", "unchanged".dimmed(), file.path.display());
                }
                _ => {}
            },
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
    }

    print_invalid_code(&report.invalid_code(), verbosity, show_invalid_code);

    if report.cancelled() {
        eprintln!("{} Caught keyboard interrupt from user", "Warning:".yellow().bold());
    }

    if verbosity.should_show_output() {
        let headline = if report.is_clean() {
            "All done! ✨ 🍰 ✨".bold()
        } else {
            "Oh no! 💥 💔 💥".bold()
        };
        eprintln!("{headline}");
        eprintln!("{}", summary(report, action));
    }
}

fn print_invalid_code(invalid: &InvalidCode, verbosity: Verbosity, show_invalid_code: bool) {
    if invalid.is_empty() {
        return;
    }

    if show_invalid_code {
        for (code, message) in invalid.iter() {
            eprintln!("{} {}", "Invalid code:".yellow().bold(), message);
            for line in code.lines() {
                eprintln!("    {line}");
            }
        }
    } else if verbosity.should_show_output() {
        eprintln!(
            "{} {} left unchanged because it could not be parsed; rerun with --show-invalid-code for details",
            "Warning:".yellow().bold(),
            plural(invalid.len(), "code block", "code blocks")
        );
    }
}

/// One-line tally of the run, e.g. `1 file reformatted, 2 files left unchanged.`
pub fn summary(report: &BatchReport, action: Action) -> String {
    let changed = report.count(FileStatus::Reformatted) + report.count(FileStatus::WouldReformat);
    let unchanged = report.count(FileStatus::Unchanged);
    let failed = report.failures().count();

    let (changed_verb, unchanged_verb, failed_verb) = match action {
        Action::Format => ("reformatted", "left unchanged", "failed to reformat"),
        Action::Check => (
            "would be reformatted",
            "would be left unchanged",
            "would fail to reformat",
        ),
    };

    let mut parts = Vec::new();
    if changed > 0 {
        parts.push(format!("{} {changed_verb}", plural(changed, "file", "files")));
    }
    if unchanged > 0 {
        parts.push(format!("{} {unchanged_verb}", plural(unchanged, "file", "files")));
    }
    if failed > 0 {
        parts.push(format!("{} {failed_verb}", plural(failed, "file", "files")));
    }

    if parts.is_empty() {
        "No notebooks were processed.".to_string()
    } else {
        format!("{}.", parts.join(", "))
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{count} {}", if count == 1 { one } else { many })
}
