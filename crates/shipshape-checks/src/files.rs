use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum FindError {
    #[error("directory not provided")]
    NoRoot,
    #[error("pattern not provided")]
    NoPattern,
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("{0}: no such file or directory")]
    Missing(Utf8PathBuf),
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

impl FindError {
    /// True when the search root itself does not exist.
    pub fn is_missing(&self) -> bool {
        matches!(self, FindError::Missing(_))
    }
}

fn compile(pattern: &str) -> Result<Regex, FindError> {
    Regex::new(pattern).map_err(|source| FindError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Files under `root` whose name matches `pattern`.
///
/// `exclude` (when non-empty) is matched against the full path. `skip_dirs`
/// are directories relative to `root` that are not descended into. Results
/// come back in file-name order within each directory.
pub fn find_files(
    root: &Utf8Path,
    pattern: &str,
    exclude: &str,
    skip_dirs: &[String],
) -> Result<Vec<Utf8PathBuf>, FindError> {
    if root.as_str().is_empty() {
        return Err(FindError::NoRoot);
    }
    if pattern.is_empty() {
        return Err(FindError::NoPattern);
    }
    let pattern = compile(pattern)?;
    let exclude = if exclude.is_empty() {
        None
    } else {
        Some(compile(exclude)?)
    };
    if !root.exists() {
        return Err(FindError::Missing(root.to_path_buf()));
    }

    let skipped: Vec<PathBuf> = skip_dirs
        .iter()
        .filter(|d| !d.is_empty())
        .map(|d| root.join(d).into_std_path_buf())
        .collect();

    let mut matches = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && skipped.iter().any(|s| e.path().starts_with(s))));

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.path().to_path_buf()) else {
            continue;
        };
        if exclude.as_ref().is_some_and(|re| re.is_match(path.as_str())) {
            continue;
        }
        if path.file_name().is_some_and(|name| pattern.is_match(name)) {
            matches.push(path);
        }
    }
    Ok(matches)
}
