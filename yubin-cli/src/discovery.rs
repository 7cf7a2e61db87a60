//! Registry CSV discovery
//!
//! `--path` takes a comma-separated list. Files are used as given;
//! directories are walked recursively for `*.csv` / `*.CSV`.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Discovery errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Listed path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Nothing to import under the listed paths
    #[error("No CSV files found in {0}")]
    NoInput(String),
}

/// Split a comma-separated path list, dropping blanks
pub fn split_path_list(list: &str) -> Vec<PathBuf> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Expand each listed path into CSV files
///
/// Result is sorted and deduplicated so runs are reproducible regardless of
/// directory iteration order.
pub fn discover(paths: &[PathBuf]) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(DiscoveryError::PathNotFound(path.clone()));
        }
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).follow_links(false) {
            match entry {
                Ok(entry) if is_csv(&entry) => files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Skipping unreadable entry"),
            }
        }
    }
    files.sort();
    files.dedup();

    if files.is_empty() {
        let listed: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        return Err(DiscoveryError::NoInput(listed.join(",")));
    }
    debug!(files = files.len(), "CSV files discovered");
    Ok(files)
}

fn is_csv(entry: &DirEntry) -> bool {
    entry.file_type().is_file() && has_csv_extension(entry.path())
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "csv" || ext == "CSV")
}
