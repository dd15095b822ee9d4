//! Digest manifest writer.
//!
//! After execution, optionally writes one `<digest>  <path>` line per local
//! entry whose remote copy is known good (outcome Success or Skip), sorted
//! by path so an unchanged tree produces byte-identical output across runs.

use crate::error::StorageResult;
use crate::types::{LocalEntry, OutcomeStatus, SyncAction, SyncOutcome};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the manifest inside the synchronized directory. The scanner
/// always ignores this name.
pub const MANIFEST_FILE_NAME: &str = "md5.sums";

/// Renders the manifest body for the entries whose outcome was Success or
/// Skip. Failed keys and delete-only keys are left out.
pub fn manifest_lines(entries: &[LocalEntry], outcomes: &[SyncOutcome]) -> String {
    let synced: BTreeSet<&str> = outcomes
        .iter()
        .filter(|o| o.action != SyncAction::Delete)
        .filter(|o| matches!(o.status, OutcomeStatus::Success))
        .map(|o| o.key.as_str())
        .collect();

    let mut sorted: Vec<&LocalEntry> = entries
        .iter()
        .filter(|e| synced.contains(e.rel_path.as_str()))
        .collect();
    sorted.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

    let mut body = String::new();
    for entry in sorted {
        body.push_str(&entry.digest);
        body.push_str("  ");
        body.push_str(&entry.rel_path);
        body.push('\n');
    }
    body
}

/// Writes the manifest into the synchronized directory, returning its path.
pub async fn write_manifest(
    root: &Path,
    entries: &[LocalEntry],
    outcomes: &[SyncOutcome],
) -> StorageResult<PathBuf> {
    let body = manifest_lines(entries, outcomes);
    let path = root.join(MANIFEST_FILE_NAME);
    tokio::fs::write(&path, body.as_bytes()).await?;
    info!("wrote manifest {}", path.display());
    Ok(path)
}
