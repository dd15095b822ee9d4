//! Diff/plan builder.
//!
//! Pure function of the local snapshot, remote snapshot, and flags: the
//! same inputs always yield the same plan. Local state is authoritative;
//! the only action ever derived from remote-only state is deletion under
//! purge.

use crate::types::{LocalEntry, RemoteEntry, SyncAction, SyncPlan};
use std::collections::BTreeMap;

/// Computes the sync plan from the two listings.
///
/// `encrypted` marks a run with recipients configured: remote bodies are
/// ciphertext, so their digests say nothing about local plaintext and every
/// matched key is re-uploaded. Without encryption, equal md5 digests mean
/// Skip; a remote entry with no usable digest is re-uploaded.
pub fn build_plan(
    local: &[LocalEntry],
    remote: &[RemoteEntry],
    purge: bool,
    encrypted: bool,
) -> SyncPlan {
    let local_by_key: BTreeMap<&str, &LocalEntry> =
        local.iter().map(|e| (e.rel_path.as_str(), e)).collect();
    let remote_by_key: BTreeMap<&str, &RemoteEntry> =
        remote.iter().map(|e| (e.key.as_str(), e)).collect();

    let mut actions = BTreeMap::new();

    for (key, entry) in &local_by_key {
        let action = match remote_by_key.get(key) {
            None => SyncAction::Upload,
            Some(_) if encrypted => SyncAction::Upload,
            Some(remote_entry) => match remote_entry.md5.as_deref() {
                Some(md5) if md5 == entry.digest => SyncAction::Skip,
                _ => SyncAction::Upload,
            },
        };
        actions.insert((*key).to_string(), action);
    }

    if purge {
        for key in remote_by_key.keys() {
            if !local_by_key.contains_key(key) {
                actions.insert((*key).to_string(), SyncAction::Delete);
            }
        }
    }

    SyncPlan::new(actions)
}
