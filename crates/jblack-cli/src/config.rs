//! Configuration file support
//!
//! Precedence order (highest to lowest):
//! 1. Command-line arguments
//! 2. Project config (./.jblack.toml)
//! 3. User config (~/.jblack.toml)
//! 4. Built-in defaults

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file, in the project and home directories
pub const CONFIG_FILE_NAME: &str = ".jblack.toml";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for formatting runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Maximum line length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_length: Option<usize>,

    /// Leave string quotes and prefixes alone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_string_normalization: Option<bool>,

    /// Python versions to target, e.g. `["py38", "py39"]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_versions: Option<Vec<String>>,

    /// Format as a `.pyi` stub
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pyi: Option<bool>,

    /// Number of notebooks processed concurrently
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Black executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub black: Option<PathBuf>,

    /// Print every unparseable cell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_invalid_code: Option<bool>,
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            eprintln!(
                "{} Failed to parse config file: {}",
                "Error:".red().bold(),
                path.display()
            );
            eprintln!("{} {}", "Parse error:".yellow().bold(), e);
            eprintln!();
            eprintln!("{} Configuration file syntax:", "Help:".cyan().bold());
            eprintln!("  [format]");
            eprintln!("  line_length = 100");
            eprintln!("  target_versions = [\"py310\", \"py311\"]");
            eprintln!("  workers = 4");
            anyhow::anyhow!("Failed to parse config file: {e}")
        })?;

        Ok(config)
    }

    /// Find and load configuration files, merged
    pub fn discover() -> Self {
        let user = dirs::home_dir().and_then(|home| Self::load_optional(&home.join(CONFIG_FILE_NAME), "user"));
        let project = Self::load_optional(Path::new(CONFIG_FILE_NAME), "project");
        Self::merge(user, project)
    }

    fn load_optional(path: &Path, kind: &str) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => {
                log::debug!("loaded {kind} config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                eprintln!(
                    "{} Failed to load {kind} config from {}: {}",
                    "Warning:".yellow().bold(),
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// Merge configs: project settings override user settings key by key
    pub fn merge(user_config: Option<Self>, project_config: Option<Self>) -> Self {
        let user = user_config.and_then(|c| c.format);
        let project = project_config.and_then(|c| c.format);

        let format = match (user, project) {
            (None, None) => None,
            (Some(only), None) | (None, Some(only)) => Some(only),
            (Some(user), Some(project)) => Some(FormatConfig {
                line_length: project.line_length.or(user.line_length),
                skip_string_normalization: project
                    .skip_string_normalization
                    .or(user.skip_string_normalization),
                target_versions: project.target_versions.or(user.target_versions),
                pyi: project.pyi.or(user.pyi),
                workers: project.workers.or(user.workers),
                black: project.black.or(user.black),
                show_invalid_code: project.show_invalid_code.or(user.show_invalid_code),
            }),
        };

        Self { format }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_section() {
        let config: Config = toml::from_str(
            r#"
            [format]
            line_length = 100
            skip_string_normalization = true
            target_versions = ["py39", "py310"]
            workers = 4
            black = "/opt/black/bin/black"
            "#,
        )
        .unwrap();

        let format = config.format.unwrap();
        assert_eq!(format.line_length, Some(100));
        assert_eq!(format.skip_string_normalization, Some(true));
        assert_eq!(
            format.target_versions,
            Some(vec!["py39".to_string(), "py310".to_string()])
        );
        assert_eq!(format.workers, Some(4));
        assert_eq!(format.black, Some(PathBuf::from("/opt/black/bin/black")));
        assert_eq!(format.pyi, None);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_project_overrides_user_per_key() {
        let user = Config {
            format: Some(FormatConfig {
                line_length: Some(120),
                workers: Some(2),
                ..FormatConfig::default()
            }),
        };
        let project = Config {
            format: Some(FormatConfig {
                line_length: Some(79),
                pyi: Some(true),
                ..FormatConfig::default()
            }),
        };

        let format = Config::merge(Some(user), Some(project)).format.unwrap();
        assert_eq!(format.line_length, Some(79));
        assert_eq!(format.workers, Some(2));
        assert_eq!(format.pyi, Some(true));
    }

    #[test]
    fn test_merge_without_configs() {
        assert_eq!(Config::merge(None, None), Config::default());
    }

    #[test]
    fn test_load_from_file_rejects_bad_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[format\nline_length = ").unwrap();
        assert!(Config::load_from_file(&path).is_err());
    }
}
