//! Plan executor: bounded worker pool with classified retries.
//!
//! Per-key actions are independent and run concurrently up to the configured
//! bound. The one globally-ordered event is token refresh, which goes
//! through the shared [`TokenGate`]. Failures are collected into outcomes,
//! never thrown; remaining keys keep going.

use crate::acl::AclPolicy;
use crate::cipher::Cipher;
use crate::config::SyncConfig;
use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;
use crate::token::TokenGate;
use crate::types::{OutcomeStatus, SyncAction, SyncOutcome, SyncPlan};
use futures::StreamExt;
use futures::stream;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Requests that the executor stop dispatching new actions.
///
/// Actions already in flight finish or fail naturally; keys never dispatched
/// are recorded as Failed so the outcome set still covers the whole plan.
#[derive(Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Executes an immutable [`SyncPlan`] against the object store.
pub struct PlanExecutor {
    store: Arc<dyn ObjectStore>,
    gate: Arc<TokenGate>,
    cipher: Arc<dyn Cipher>,
    recipients: Vec<String>,
    acl: AclPolicy,
    root: PathBuf,
    concurrency: usize,
    transient_attempt_cap: u32,
    backoff_base: Duration,
    cancelled: Arc<AtomicBool>,
}

impl PlanExecutor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        gate: Arc<TokenGate>,
        cipher: Arc<dyn Cipher>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            store,
            gate,
            cipher,
            recipients: config.recipients.clone(),
            acl: config.acl,
            root: config.local_root.clone(),
            concurrency: config.concurrency.max(1),
            transient_attempt_cap: config.transient_attempt_cap.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// Runs every planned action, returning one outcome per key, ordered by
    /// key regardless of completion order.
    pub async fn execute(&self, plan: &SyncPlan) -> Vec<SyncOutcome> {
        let mut outcomes: Vec<SyncOutcome> = stream::iter(plan.iter())
            .map(|(key, action)| self.run_one(key.clone(), *action))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        outcomes.sort_by(|a, b| a.key.cmp(&b.key));
        outcomes
    }

    async fn run_one(&self, key: String, action: SyncAction) -> SyncOutcome {
        // Skips reflect state already in sync: no network call, no attempt.
        if action == SyncAction::Skip {
            return SyncOutcome {
                key,
                action,
                status: OutcomeStatus::Success,
                attempts: 0,
            };
        }

        if self.cancelled.load(Ordering::SeqCst) {
            return SyncOutcome {
                key,
                action,
                status: OutcomeStatus::Failed("cancelled before dispatch".to_string()),
                attempts: 0,
            };
        }

        let (attempts, result) = self.attempt(&key, action).await;
        let status = match result {
            Ok(()) => OutcomeStatus::Success,
            Err(e) => {
                warn!("{} {key} failed after {attempts} attempt(s): {e}", action.as_str());
                OutcomeStatus::Failed(e.to_string())
            }
        };

        SyncOutcome {
            key,
            action,
            status,
            attempts,
        }
    }

    /// Drives one action to a terminal state, counting attempts.
    async fn attempt(&self, key: &str, action: SyncAction) -> (u32, StorageResult<()>) {
        // Payload is read and encrypted once; only the store call retries.
        let payload = match action {
            SyncAction::Upload => {
                let path = local_path(&self.root, key);
                let plaintext = match tokio::fs::read(&path).await {
                    Ok(bytes) => bytes,
                    Err(e) => return (0, Err(StorageError::Io(e))),
                };
                match self.cipher.encrypt(&plaintext, &self.recipients).await {
                    Ok(bytes) => Some(bytes),
                    Err(e) => return (0, Err(e)),
                }
            }
            _ => None,
        };

        let mut attempts = 0u32;
        let mut auth_retried = false;

        loop {
            attempts += 1;

            let (token, generation) = match self.gate.current().await {
                Ok(current) => current,
                Err(e) => return (attempts, Err(e)),
            };

            let result = match action {
                SyncAction::Upload => {
                    let body = payload.clone().unwrap_or_default();
                    self.store.put(&token, key, self.acl, body).await
                }
                SyncAction::Delete => self.store.delete(&token, key).await,
                SyncAction::Skip => unreachable!("skips never reach the attempt loop"),
            };

            match result {
                Ok(()) => return (attempts, Ok(())),
                Err(StorageError::AuthExpired) if !auth_retried => {
                    auth_retried = true;
                    debug!("auth expired on {key}, coordinating refresh");
                    if let Err(e) = self.gate.refreshed(generation).await {
                        return (attempts, Err(e));
                    }
                }
                Err(e) if e.is_transient() && attempts < self.transient_attempt_cap => {
                    let backoff = self.backoff_base * 2u32.pow(attempts - 1);
                    warn!("transient failure on {key}, retrying in {backoff:?}: {e}");
                    sleep(backoff).await;
                }
                Err(e) => return (attempts, Err(e)),
            }
        }
    }
}

/// Maps a forward-slash key back onto the local filesystem.
fn local_path(root: &Path, key: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in key.split('/') {
        path.push(part);
    }
    path
}
