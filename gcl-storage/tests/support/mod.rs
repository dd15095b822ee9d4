//! Shared test doubles: an in-memory object store with scriptable failures
//! and a token supplier that counts refreshes.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use gcl_auth::{AccessToken, AuthResult, TokenSupplier};
use gcl_storage::{AclPolicy, LocalEntry, ObjectStore, RemoteEntry, StorageError, StorageResult};
use md5::{Digest, Md5};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

pub fn local_entry(rel_path: &str, digest: &str) -> LocalEntry {
    LocalEntry {
        rel_path: rel_path.to_string(),
        size: 1,
        digest: digest.to_string(),
    }
}

pub fn remote_entry(key: &str, md5: Option<&str>) -> RemoteEntry {
    RemoteEntry {
        key: key.to_string(),
        size: 1,
        md5: md5.map(str::to_string),
        etag: format!("etag-{key}"),
        updated: Utc::now(),
    }
}

/// Token supplier that hands out `initial` until refreshed, then `fresh`,
/// counting every refresh call.
pub struct FakeSupplier {
    current: Mutex<String>,
    fresh: String,
    pub refresh_calls: AtomicU32,
}

impl FakeSupplier {
    pub fn new(initial: &str, fresh: &str) -> Self {
        Self {
            current: Mutex::new(initial.to_string()),
            fresh: fresh.to_string(),
            refresh_calls: AtomicU32::new(0),
        }
    }

    pub fn refresh_count(&self) -> u32 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn token(value: &str) -> AccessToken {
        AccessToken::new(value, Utc::now() + Duration::hours(1))
    }
}

#[async_trait]
impl TokenSupplier for FakeSupplier {
    async fn current(&self) -> AuthResult<AccessToken> {
        Ok(Self::token(&self.current.lock().unwrap().clone()))
    }

    async fn refresh(&self) -> AuthResult<AccessToken> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let mut current = self.current.lock().unwrap();
        *current = self.fresh.clone();
        Ok(Self::token(&current))
    }
}

/// List-call failure modes for [`MemoryStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListFailure {
    NotFound,
    Permanent,
}

/// In-memory object store. Rejects any token other than the valid one with
/// `AuthExpired`; per-key transient and permanent failures are scriptable.
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    valid_token: Mutex<String>,
    transient_remaining: Mutex<HashMap<String, u32>>,
    permanent_keys: Mutex<HashSet<String>>,
    list_failure: Mutex<Option<ListFailure>>,
    pub list_calls: AtomicU32,
    pub put_calls: AtomicU32,
    pub delete_calls: AtomicU32,
}

impl MemoryStore {
    pub fn new(valid_token: &str) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            valid_token: Mutex::new(valid_token.to_string()),
            transient_remaining: Mutex::new(HashMap::new()),
            permanent_keys: Mutex::new(HashSet::new()),
            list_failure: Mutex::new(None),
            list_calls: AtomicU32::new(0),
            put_calls: AtomicU32::new(0),
            delete_calls: AtomicU32::new(0),
        }
    }

    pub fn seed(&self, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), body.to_vec());
    }

    pub fn set_valid_token(&self, token: &str) {
        *self.valid_token.lock().unwrap() = token.to_string();
    }

    /// The next `count` attempts on `key` fail with `Transient`.
    pub fn fail_transient(&self, key: &str, count: u32) {
        self.transient_remaining
            .lock()
            .unwrap()
            .insert(key.to_string(), count);
    }

    /// Every attempt on `key` fails with `Permanent`.
    pub fn fail_permanent(&self, key: &str) {
        self.permanent_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_list(&self, failure: ListFailure) {
        *self.list_failure.lock().unwrap() = Some(failure);
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn body(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    fn check_token(&self, token: &str) -> StorageResult<()> {
        if *self.valid_token.lock().unwrap() != token {
            return Err(StorageError::AuthExpired);
        }
        Ok(())
    }

    fn scripted_failure(&self, key: &str) -> StorageResult<()> {
        if self.permanent_keys.lock().unwrap().contains(key) {
            return Err(StorageError::Permanent(format!("scripted failure on {key}")));
        }
        let mut transient = self.transient_remaining.lock().unwrap();
        if let Some(remaining) = transient.get_mut(key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(StorageError::Transient(format!(
                    "scripted transient failure on {key}"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, token: &str) -> StorageResult<Vec<RemoteEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_token(token)?;

        match *self.list_failure.lock().unwrap() {
            Some(ListFailure::NotFound) => {
                return Err(StorageError::NotFound("bucket missing".to_string()));
            }
            Some(ListFailure::Permanent) => {
                return Err(StorageError::Permanent("bucket forbidden".to_string()));
            }
            None => {}
        }

        let objects = self.objects.lock().unwrap();
        Ok(objects
            .iter()
            .map(|(key, body)| RemoteEntry {
                key: key.clone(),
                size: body.len() as u64,
                md5: Some(md5_hex(body)),
                etag: format!("etag-{key}"),
                updated: Utc::now(),
            })
            .collect())
    }

    async fn put(
        &self,
        token: &str,
        key: &str,
        _acl: AclPolicy,
        body: Vec<u8>,
    ) -> StorageResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.check_token(token)?;
        self.scripted_failure(key)?;
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }

    async fn delete(&self, token: &str, key: &str) -> StorageResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_token(token)?;
        self.scripted_failure(key)?;
        if self.objects.lock().unwrap().remove(key).is_none() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(())
    }
}
