//! JSON dump of collected records.
//!
//! Unlike the spreadsheet, the JSON keeps one object per article with the
//! municipalities still joined, which is handy for re-running the
//! post-processing or for feeding other tools.

use crate::models::NewsRecord;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `records` as a pretty-printed JSON array to `path`.
///
/// Parent directories are created when missing.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display(), count = records.len()))]
pub async fn write_records(
    records: &[NewsRecord],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn Error>> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(records)?;

    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!("Wrote JSON records");
    Ok(())
}
