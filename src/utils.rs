//! Utility functions for string manipulation and file system operations.
//!
//! - String truncation for logging
//! - Search-term file loading
//! - File system validation for output locations

use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number
/// of dropped bytes appended. Cuts always land on a char boundary, which
/// matters for accented Portuguese text.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// One search term per non-blank line, trimmed.
pub fn parse_search_terms(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read the search-term file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn load_search_terms(path: impl AsRef<Path>) -> Result<Vec<String>, Box<dyn Error>> {
    let text = fs::read_to_string(path.as_ref()).await?;
    let terms = parse_search_terms(&text);
    info!(count = terms.len(), "Loaded search terms");
    Ok(terms)
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Directory an output prefix will be written into (`.` for bare prefixes).
pub fn output_dir(prefix: &str) -> &Path {
    match Path::new(prefix).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
