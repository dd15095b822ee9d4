//! Coordinated token refresh gate shared by all workers.
//!
//! The engine holds one current bearer token for the run. When concurrent
//! per-key operations all fail with `AuthExpired`, only the first one to
//! reach the gate performs a refresh; the others observe its result instead
//! of issuing their own. Detection uses a generation counter bumped on every
//! successful refresh, double-checked after acquiring the refresh lock.

use crate::error::{StorageError, StorageResult};
use gcl_auth::TokenSupplier;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

struct TokenState {
    token: String,
    generation: u64,
}

/// Single-owner token holder threaded through the executor.
pub struct TokenGate {
    supplier: Arc<dyn TokenSupplier>,
    state: RwLock<Option<TokenState>>,
    /// Serializes refreshes so concurrent expiry signals cause one call.
    refresh_lock: Mutex<()>,
}

impl TokenGate {
    pub fn new(supplier: Arc<dyn TokenSupplier>) -> Self {
        Self {
            supplier,
            state: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Returns the current bearer token and its generation.
    ///
    /// The generation must be passed back to [`refreshed`](Self::refreshed)
    /// when the token is rejected, so the gate can tell whether a concurrent
    /// refresh already replaced it.
    pub async fn current(&self) -> StorageResult<(String, u64)> {
        {
            let state = self.state.read().await;
            if let Some(ref s) = *state {
                return Ok((s.token.clone(), s.generation));
            }
        }

        // First use: fill the holder under the refresh lock.
        let _guard = self.refresh_lock.lock().await;
        {
            let state = self.state.read().await;
            if let Some(ref s) = *state {
                return Ok((s.token.clone(), s.generation));
            }
        }

        let token = self.supplier.current().await?;
        let mut state = self.state.write().await;
        *state = Some(TokenState {
            token: token.token.clone(),
            generation: 0,
        });
        Ok((token.token, 0))
    }

    /// Returns a token newer than `observed_generation`, refreshing at most
    /// once across all concurrent callers.
    pub async fn refreshed(&self, observed_generation: u64) -> StorageResult<(String, u64)> {
        let _guard = self.refresh_lock.lock().await;

        // Double-check: if the generation advanced while we waited, a
        // concurrent refresh already succeeded. Use its token.
        {
            let state = self.state.read().await;
            if let Some(ref s) = *state {
                if s.generation > observed_generation {
                    return Ok((s.token.clone(), s.generation));
                }
            }
        }

        let token = self.supplier.refresh().await.map_err(StorageError::Auth)?;
        let mut state = self.state.write().await;
        let generation = state.as_ref().map_or(1, |s| s.generation + 1);
        debug!("refreshed bearer token (generation {generation})");
        *state = Some(TokenState {
            token: token.token.clone(),
            generation,
        });

        Ok((token.token, generation))
    }
}
