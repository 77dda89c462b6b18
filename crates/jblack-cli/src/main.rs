//! jblack - Black for Jupyter notebooks
//!
//! Formats the code cells of `.ipynb` files with Black, leaving every other
//! part of the notebook exactly as it was.

mod config;
mod report;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use config::{Config, FormatConfig};
use jblack_core::{
    discover, run_batch, Action, BatchOptions, BlackFormatter, FormatterError, JblackError, Mode,
    TargetVersion, DEFAULT_LINE_LENGTH,
};
use report::Verbosity;
use signal_hook::consts::SIGINT;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Exit status when `--check` finds files to reformat or a file fails
const EXIT_FAILURE: u8 = 1;
/// Exit status for a target that does not exist
const EXIT_MISSING_TARGET: u8 = 3;
/// Exit status for a target without the `.ipynb` extension
const EXIT_INVALID_EXTENSION: u8 = 4;
/// Exit status for a malformed notebook or an unavailable formatter
const EXIT_UNUSABLE_INPUT: u8 = 5;
/// Exit status after Ctrl-C (128 + SIGINT)
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(
    name = "jblack",
    about = "Format Jupyter notebooks with Black",
    long_about = "Format the code cells of Jupyter notebooks (.ipynb) with Black.\n\
                  \n\
                  Directories are searched recursively for notebooks. IPython magics\n\
                  and shell escapes are left in place; cells Black cannot parse are\n\
                  left unchanged.",
    after_help = "Defaults can be set under [format] in ./.jblack.toml or ~/.jblack.toml.",
    version
)]
struct Args {
    /// Notebook files or directories to format
    #[arg(value_name = "TARGETS", required = true)]
    targets: Vec<PathBuf>,

    /// Don't write the files back, just report which ones would change
    #[arg(long)]
    check: bool,

    /// How many characters per line to allow [default: 88]
    #[arg(short, long, value_name = "N")]
    line_length: Option<usize>,

    /// Don't normalize string quotes or prefixes
    #[arg(short = 'S', short_alias = 's', long)]
    skip_string_normalization: bool,

    /// Python versions that should be supported by Black's output (repeatable)
    #[arg(short = 't', long = "target-version", value_name = "VERSION")]
    target_versions: Vec<TargetVersion>,

    /// Format all input as typing stubs (.pyi), regardless of extension
    #[arg(long)]
    pyi: bool,

    /// Number of notebooks to format in parallel [default: 1]
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Print every code block Black could not parse
    #[arg(long)]
    show_invalid_code: bool,

    /// Black executable to run [default: black]
    #[arg(long, value_name = "PATH")]
    black: Option<PathBuf>,

    /// Only print errors and, with --check, the files that would change
    #[arg(short, long)]
    quiet: bool,

    /// Show detailed processing information
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
}

/// Settings for one run, with CLI arguments applied over the config file
#[derive(Debug)]
struct RunSettings {
    options: BatchOptions,
    black: PathBuf,
    show_invalid_code: bool,
}

impl RunSettings {
    fn resolve(args: &Args, config: FormatConfig) -> Result<Self> {
        let target_versions: BTreeSet<TargetVersion> = if args.target_versions.is_empty() {
            config
                .target_versions
                .unwrap_or_default()
                .iter()
                .map(|v| {
                    v.parse::<TargetVersion>()
                        .map_err(|e| anyhow::anyhow!("Invalid target_versions in config: {e}"))
                })
                .collect::<Result<_>>()?
        } else {
            args.target_versions.iter().copied().collect()
        };

        let mode = Mode {
            line_length: args
                .line_length
                .or(config.line_length)
                .unwrap_or(DEFAULT_LINE_LENGTH),
            string_normalization: !(args.skip_string_normalization
                || config.skip_string_normalization.unwrap_or(false)),
            target_versions,
            is_pyi: args.pyi || config.pyi.unwrap_or(false),
        };

        Ok(Self {
            options: BatchOptions {
                action: if args.check { Action::Check } else { Action::Format },
                workers: args.workers.or(config.workers).unwrap_or(1).max(1),
                mode,
            },
            black: args
                .black
                .clone()
                .or(config.black)
                .unwrap_or_else(|| PathBuf::from("black")),
            show_invalid_code: args.show_invalid_code || config.show_invalid_code.unwrap_or(false),
        })
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(verbosity.log_filter()))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::discover();

    match run(&args, config, verbosity) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if matches!(
                e.downcast_ref::<JblackError>(),
                Some(JblackError::MissingTargets(_) | JblackError::InvalidExtension(_))
            ) {
                eprintln!();
                eprintln!("Try 'jblack --help' for help.");
            }
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn run(args: &Args, config: Config, verbosity: Verbosity) -> Result<ExitCode> {
    let settings = RunSettings::resolve(args, config.format.unwrap_or_default())?;
    log::debug!("{settings:?}");

    let files = discover(&args.targets)?;
    if files.is_empty() {
        if verbosity.should_show_output() {
            eprintln!("{} No notebooks found", "Warning:".yellow().bold());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let formatter = BlackFormatter::with_program(&settings.black);
    let version = formatter.probe()?;
    if verbosity.is_verbose() {
        eprintln!(
            "{} {} on {} notebook(s) with {} worker(s)",
            "Info:".blue().bold(),
            version,
            files.len().to_string().cyan(),
            settings.options.workers
        );
    }

    let cancel = Arc::new(AtomicBool::new(false));
    // A second Ctrl-C exits immediately.
    signal_hook::flag::register_conditional_shutdown(SIGINT, i32::from(EXIT_INTERRUPTED), Arc::clone(&cancel))
        .and_then(|_| signal_hook::flag::register(SIGINT, Arc::clone(&cancel)))
        .map_err(|e| anyhow::anyhow!("Failed to install Ctrl-C handler: {e}"))?;

    let progress = report::progress_bar(files.len(), verbosity);
    let batch = run_batch(&files, &formatter, &settings.options, &cancel, |_| progress.inc(1))?;
    progress.finish_and_clear();

    report::print_report(&batch, settings.options.action, verbosity, settings.show_invalid_code);

    Ok(if batch.cancelled() {
        ExitCode::from(EXIT_INTERRUPTED)
    } else if batch.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILURE)
    })
}

fn exit_code_for(error: &anyhow::Error) -> u8 {
    if let Some(e) = error.downcast_ref::<JblackError>() {
        return match e {
            JblackError::MissingTargets(_) => EXIT_MISSING_TARGET,
            JblackError::InvalidExtension(_) => EXIT_INVALID_EXTENSION,
            JblackError::Notebook { .. } => EXIT_UNUSABLE_INPUT,
            JblackError::Cancelled => EXIT_INTERRUPTED,
            _ => EXIT_FAILURE,
        };
    }
    match error.downcast_ref::<FormatterError>() {
        Some(FormatterError::NotFound { .. }) => EXIT_UNUSABLE_INPUT,
        Some(FormatterError::Interrupted) => EXIT_INTERRUPTED,
        _ => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = parse(&["jblack", "-l", "70", "--check", "-t", "py39", "-t", "py38", "nb.ipynb"]);
        let config = FormatConfig {
            line_length: Some(100),
            target_versions: Some(vec!["py311".to_string()]),
            workers: Some(3),
            ..FormatConfig::default()
        };

        let settings = RunSettings::resolve(&args, config).unwrap();
        assert_eq!(settings.options.action, Action::Check);
        assert_eq!(settings.options.workers, 3);
        assert_eq!(settings.options.mode.line_length, 70);
        assert_eq!(
            settings.options.mode.target_versions.into_iter().collect::<Vec<_>>(),
            [TargetVersion::Py38, TargetVersion::Py39]
        );
    }

    #[test]
    fn test_defaults_without_config() {
        let settings = RunSettings::resolve(&parse(&["jblack", "nb.ipynb"]), FormatConfig::default()).unwrap();
        assert_eq!(settings.options, BatchOptions::default());
        assert_eq!(settings.black, PathBuf::from("black"));
        assert!(!settings.show_invalid_code);
    }

    #[test]
    fn test_config_flags_apply() {
        let config = FormatConfig {
            skip_string_normalization: Some(true),
            pyi: Some(true),
            black: Some(PathBuf::from("/opt/black")),
            show_invalid_code: Some(true),
            ..FormatConfig::default()
        };
        let settings = RunSettings::resolve(&parse(&["jblack", "nb.ipynb"]), config).unwrap();
        assert!(!settings.options.mode.string_normalization);
        assert!(settings.options.mode.is_pyi);
        assert_eq!(settings.black, PathBuf::from("/opt/black"));
        assert!(settings.show_invalid_code);
    }

    #[test]
    fn test_bad_config_target_version() {
        let config = FormatConfig {
            target_versions: Some(vec!["py27".to_string()]),
            ..FormatConfig::default()
        };
        assert!(RunSettings::resolve(&parse(&["jblack", "nb.ipynb"]), config).is_err());
    }

    #[test]
    fn test_zero_workers_means_one() {
        let settings = RunSettings::resolve(&parse(&["jblack", "-w", "0", "nb.ipynb"]), FormatConfig::default()).unwrap();
        assert_eq!(settings.options.workers, 1);
    }

    #[test]
    fn test_exit_codes() {
        let missing = anyhow::Error::from(JblackError::MissingTargets(vec![PathBuf::from("x")]));
        assert_eq!(exit_code_for(&missing), EXIT_MISSING_TARGET);
        let extension = anyhow::Error::from(JblackError::InvalidExtension(PathBuf::from("x.py")));
        assert_eq!(exit_code_for(&extension), EXIT_INVALID_EXTENSION);
        let not_found = anyhow::Error::from(FormatterError::NotFound {
            program: "black".to_string(),
        });
        assert_eq!(exit_code_for(&not_found), EXIT_UNUSABLE_INPUT);
        assert_eq!(exit_code_for(&anyhow::anyhow!("other")), EXIT_FAILURE);
    }

    #[test]
    fn test_skip_string_normalization_short_flags() {
        for flag in ["-S", "-s", "--skip-string-normalization"] {
            let settings = RunSettings::resolve(&parse(&["jblack", flag, "nb.ipynb"]), FormatConfig::default()).unwrap();
            assert!(!settings.options.mode.string_normalization, "{flag}");
        }
    }

    #[test]
    fn test_unknown_target_version_rejected() {
        assert!(Args::try_parse_from(["jblack", "-t", "py27", "nb.ipynb"]).is_err());
    }
}
