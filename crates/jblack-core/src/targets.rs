//! Resolution of command-line targets to notebook files

use crate::error::{JblackError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Notebook file extension
pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Expand `targets` into the notebook files to process.
///
/// Directories expand to every `.ipynb` file beneath them; files must carry
/// the `.ipynb` extension. The result is canonical, deduplicated and sorted.
///
/// # Errors
///
/// Returns [`JblackError::MissingTargets`] naming every target that does not
/// exist, [`JblackError::InvalidExtension`] for the first explicitly named
/// file that is not a notebook, and [`JblackError::Glob`] if a directory
/// cannot be walked.
pub fn discover<P: AsRef<Path>>(targets: &[P]) -> Result<Vec<PathBuf>> {
    let missing: Vec<PathBuf> = targets
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| !t.exists())
        .map(Path::to_path_buf)
        .collect();
    if !missing.is_empty() {
        return Err(JblackError::MissingTargets(missing));
    }

    let mut files = BTreeSet::new();
    for target in targets {
        let target = target.as_ref();
        if target.is_dir() {
            for file in notebooks_in(target)? {
                files.insert(canonical(&file)?);
            }
        } else if is_notebook(target) {
            files.insert(canonical(target)?);
        } else {
            return Err(JblackError::InvalidExtension(target.to_path_buf()));
        }
    }

    log::debug!("discovered {} notebook(s)", files.len());
    Ok(files.into_iter().collect())
}

/// Whether `path` has the notebook extension.
#[inline]
#[must_use]
pub fn is_notebook(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == NOTEBOOK_EXTENSION)
}

fn notebooks_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let glob_error = |message: String| JblackError::Glob {
        path: dir.to_path_buf(),
        message,
    };

    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{escaped}/**/*.{NOTEBOOK_EXTENSION}");

    let mut files = Vec::new();
    for entry in glob::glob(&pattern).map_err(|e| glob_error(e.to_string()))? {
        let path = entry.map_err(|e| glob_error(e.to_string()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|source| JblackError::Notebook {
        path: path.to_path_buf(),
        source: source.into(),
    })
}
