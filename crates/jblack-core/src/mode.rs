//! Formatting configuration shared by every cell of a run

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Black's default maximum line length
pub const DEFAULT_LINE_LENGTH: usize = 88;

/// Python versions Black's output may be required to support
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetVersion {
    Py33,
    Py34,
    Py35,
    Py36,
    Py37,
    Py38,
    Py39,
    Py310,
    Py311,
    Py312,
    Py313,
}

impl TargetVersion {
    /// Every supported version, oldest first
    pub const ALL: [Self; 11] = [
        Self::Py33,
        Self::Py34,
        Self::Py35,
        Self::Py36,
        Self::Py37,
        Self::Py38,
        Self::Py39,
        Self::Py310,
        Self::Py311,
        Self::Py312,
        Self::Py313,
    ];

    /// Name as accepted by Black's `--target-version`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Py33 => "py33",
            Self::Py34 => "py34",
            Self::Py35 => "py35",
            Self::Py36 => "py36",
            Self::Py37 => "py37",
            Self::Py38 => "py38",
            Self::Py39 => "py39",
            Self::Py310 => "py310",
            Self::Py311 => "py311",
            Self::Py312 => "py312",
            Self::Py313 => "py313",
        }
    }
}

impl fmt::Display for TargetVersion {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|version| version.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                format!(
                    "Unknown target version '{s}'. Expected one of: {}",
                    names.join(", ")
                )
            })
    }
}

/// Formatter options applied uniformly to every code cell of a run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mode {
    /// Maximum line length
    pub line_length: usize,
    /// Normalize string quotes and prefixes
    pub string_normalization: bool,
    /// Versions the output must support; empty means per-cell auto-detection
    pub target_versions: BTreeSet<TargetVersion>,
    /// Format as a typing stub (`.pyi`)
    pub is_pyi: bool,
}

impl Default for Mode {
    fn default() -> Self {
        Self {
            line_length: DEFAULT_LINE_LENGTH,
            string_normalization: true,
            target_versions: BTreeSet::new(),
            is_pyi: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode() {
        let mode = Mode::default();
        assert_eq!(mode.line_length, 88);
        assert!(mode.string_normalization);
        assert!(mode.target_versions.is_empty());
        assert!(!mode.is_pyi);
    }

    #[test]
    fn test_target_version_from_str() {
        assert_eq!("py38".parse::<TargetVersion>().unwrap(), TargetVersion::Py38);
        assert_eq!("PY310".parse::<TargetVersion>().unwrap(), TargetVersion::Py310);
        assert!("py2".parse::<TargetVersion>().is_err());
    }

    #[test]
    fn test_target_version_roundtrip() {
        for version in TargetVersion::ALL {
            assert_eq!(version.to_string().parse::<TargetVersion>().unwrap(), version);
        }
    }

    #[test]
    fn test_target_versions_sort_oldest_first() {
        let set: BTreeSet<_> = [TargetVersion::Py311, TargetVersion::Py36, TargetVersion::Py39]
            .into_iter()
            .collect();
        let names: Vec<_> = set.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["py36", "py39", "py311"]);
    }
}
