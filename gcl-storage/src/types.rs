//! Shared types for the synchronization engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A regular file found under the local sync root.
///
/// Produced fresh on every run, keyed by `rel_path`, never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEntry {
    /// Path relative to the sync root, forward-slash separated.
    pub rel_path: String,
    pub size: u64,
    /// Hex-encoded md5 of the file content.
    pub digest: String,
}

/// An object present in the remote bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub key: String,
    pub size: u64,
    /// Hex-encoded md5 of the stored bytes, when the store reports one.
    pub md5: Option<String>,
    pub etag: String,
    pub updated: DateTime<Utc>,
}

/// Action planned for one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Upload,
    Skip,
    Delete,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::Upload => "upload",
            SyncAction::Skip => "skip",
            SyncAction::Delete => "delete",
        }
    }
}

/// The immutable per-run plan: one action per key.
///
/// Backed by a `BTreeMap` so iteration order (and therefore logging and
/// outcome ordering) never depends on hash seeds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncPlan {
    actions: BTreeMap<String, SyncAction>,
}

impl SyncPlan {
    pub fn new(actions: BTreeMap<String, SyncAction>) -> Self {
        Self { actions }
    }

    pub fn get(&self, key: &str) -> Option<SyncAction> {
        self.actions.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.actions.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SyncAction)> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of planned actions of the given kind.
    pub fn count(&self, action: SyncAction) -> usize {
        self.actions.values().filter(|a| **a == action).count()
    }
}

/// Terminal status of one executed action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    Success,
    Failed(String),
}

/// Per-key execution result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub key: String,
    pub action: SyncAction,
    pub status: OutcomeStatus,
    pub attempts: u32,
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Success)
    }
}

/// Aggregate counts reported at the end of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SyncSummary {
    pub fn from_outcomes(outcomes: &[SyncOutcome]) -> Self {
        let mut summary = SyncSummary::default();
        for outcome in outcomes {
            match (&outcome.status, outcome.action) {
                (OutcomeStatus::Failed(_), _) => summary.failed += 1,
                (OutcomeStatus::Success, SyncAction::Skip) => summary.skipped += 1,
                (OutcomeStatus::Success, _) => summary.succeeded += 1,
            }
        }
        summary
    }
}

/// Full result of one engine run.
#[derive(Clone, Debug)]
pub struct SyncReport {
    pub outcomes: Vec<SyncOutcome>,
    pub summary: SyncSummary,
}

impl SyncReport {
    /// True iff every planned action succeeded.
    pub fn is_success(&self) -> bool {
        self.summary.failed == 0
    }
}
