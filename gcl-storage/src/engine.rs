//! Synchronization engine orchestration.
//!
//! One run: compile exclusions, scan the local tree, list the bucket,
//! build the plan, execute it, report per-key outcomes and a summary,
//! optionally write the manifest. Bucket-level failures abort before any
//! per-key action is dispatched.

use crate::cipher::{Cipher, PassthroughCipher};
use crate::config::SyncConfig;
use crate::error::{StorageError, StorageResult};
use crate::exclude::ExclusionSet;
use crate::executor::{CancelHandle, PlanExecutor};
use crate::manifest::write_manifest;
use crate::plan::build_plan;
use crate::scanner::scan_tree;
use crate::store::ObjectStore;
use crate::token::TokenGate;
use crate::types::{OutcomeStatus, RemoteEntry, SyncAction, SyncReport, SyncSummary};
use gcl_auth::TokenSupplier;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives one bucket synchronization run to completion.
pub struct SyncEngine {
    config: SyncConfig,
    store: Arc<dyn ObjectStore>,
    gate: Arc<TokenGate>,
    executor: PlanExecutor,
}

impl SyncEngine {
    /// Builds an engine. The cipher strategy is fixed here, once: the given
    /// cipher when recipients are configured, passthrough otherwise.
    pub fn new(
        config: SyncConfig,
        store: Arc<dyn ObjectStore>,
        supplier: Arc<dyn TokenSupplier>,
        cipher: Arc<dyn Cipher>,
    ) -> Self {
        let cipher: Arc<dyn Cipher> = if config.recipients.is_empty() {
            Arc::new(PassthroughCipher)
        } else {
            cipher
        };

        let gate = Arc::new(TokenGate::new(supplier));
        let executor = PlanExecutor::new(
            Arc::clone(&store),
            Arc::clone(&gate),
            Arc::clone(&cipher),
            &config,
        );

        Self {
            config,
            store,
            gate,
            executor,
        }
    }

    /// Handle for interrupt-driven cancellation: stops dispatching new
    /// actions while in-flight ones finish naturally.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.executor.cancel_handle()
    }

    /// Runs the full synchronization.
    pub async fn run(&self) -> StorageResult<SyncReport> {
        let excludes = match &self.config.exclude_file {
            Some(path) => ExclusionSet::from_file(path)?,
            None => ExclusionSet::default(),
        };
        if !excludes.is_empty() {
            debug!("{} exclusion pattern(s) active", excludes.len());
        }

        let root = self.config.local_root.clone();
        let local = tokio::task::spawn_blocking(move || scan_tree(&root, &excludes))
            .await
            .map_err(|e| StorageError::Permanent(format!("scan task panicked: {e}")))??;

        // Bucket-level errors (not found, permission) fail fast, before any
        // per-key dispatch.
        let remote = self.list_remote().await?;

        let encrypted = !self.config.recipients.is_empty();
        let plan = build_plan(&local, &remote, self.config.purge, encrypted);
        info!(
            "plan for gs://{}: {} upload, {} skip, {} delete",
            self.config.bucket,
            plan.count(SyncAction::Upload),
            plan.count(SyncAction::Skip),
            plan.count(SyncAction::Delete),
        );

        let outcomes = self.executor.execute(&plan).await;

        for outcome in &outcomes {
            match &outcome.status {
                OutcomeStatus::Success => {
                    info!("{:<6} {} ok", outcome.action.as_str(), outcome.key)
                }
                OutcomeStatus::Failed(reason) => {
                    warn!("{:<6} {} FAILED: {reason}", outcome.action.as_str(), outcome.key)
                }
            }
        }

        if self.config.write_manifest {
            write_manifest(&self.config.local_root, &local, &outcomes).await?;
        }

        let summary = SyncSummary::from_outcomes(&outcomes);
        info!(
            "sync finished: {} succeeded, {} failed, {} skipped",
            summary.succeeded, summary.failed, summary.skipped
        );

        Ok(SyncReport { outcomes, summary })
    }

    /// Lists the bucket with one coordinated auth retry.
    async fn list_remote(&self) -> StorageResult<Vec<RemoteEntry>> {
        let (token, generation) = self.gate.current().await?;
        match self.store.list(&token).await {
            Err(StorageError::AuthExpired) => {
                debug!("auth expired while listing, coordinating refresh");
                let (token, _) = self.gate.refreshed(generation).await?;
                self.store.list(&token).await
            }
            other => other,
        }
    }
}
