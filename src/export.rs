//! Writes a search's filtered listings to a JSON file.
//!
//! Enabled by `[export].path`. The file is overwritten on every search.
//! Each write goes to a sibling temp file that is then renamed over the
//! target, so readers see one whole export. Concurrent searches share
//! the file: the last one to finish wins.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};

use product_scout_core::models::Listing;

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

fn tmp_path(path: &Path) -> PathBuf {
    let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.{}.tmp", std::process::id(), seq));
    path.with_file_name(name)
}

pub async fn export_listings(path: &Path, listings: &[Listing]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let json = serde_json::to_string_pretty(listings)?;

    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, json)
        .await
        .with_context(|| format!("Failed to write results file: {}", tmp.display()))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e)
            .with_context(|| format!("Failed to write results file: {}", path.display()));
    }
    Ok(())
}
