//! Sync run configuration.

use crate::acl::AclPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one synchronization run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Target bucket name.
    pub bucket: String,

    /// Root of the local tree to synchronize.
    pub local_root: PathBuf,

    /// Predefined ACL applied to every uploaded object.
    pub acl: AclPolicy,

    /// GnuPG recipient identifiers; empty means no encryption.
    pub recipients: Vec<String>,

    /// Optional file of newline-separated exclusion regexes.
    pub exclude_file: Option<PathBuf>,

    /// Write an md5 manifest into the synchronized directory after the run.
    pub write_manifest: bool,

    /// Delete remote objects with no corresponding local file.
    pub purge: bool,

    /// Bound on concurrent per-key actions.
    pub concurrency: usize,

    /// Attempt cap for transient failures (first try included).
    pub transient_attempt_cap: u32,

    /// Base backoff between transient retries, doubled per attempt.
    pub backoff_base_ms: u64,

    /// Object store endpoint; overridable for tests.
    pub api_base_url: String,
}

impl SyncConfig {
    pub fn new(bucket: impl Into<String>, local_root: impl Into<PathBuf>) -> Self {
        Self {
            bucket: bucket.into(),
            local_root: local_root.into(),
            acl: AclPolicy::default(),
            recipients: Vec::new(),
            exclude_file: None,
            write_manifest: false,
            purge: false,
            concurrency: 8,
            transient_attempt_cap: 3,
            backoff_base_ms: 500,
            api_base_url: "https://storage.googleapis.com".to_string(),
        }
    }
}
