//! Object store capability.

use crate::acl::AclPolicy;
use crate::error::StorageResult;
use crate::types::RemoteEntry;
use async_trait::async_trait;

/// Key-addressed object storage, authenticated per call with a bearer token.
///
/// Implementations classify every failure as `AuthExpired`, `Transient`,
/// `NotFound`, or `Permanent`; the executor's retry policy depends on it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists every object in the bucket.
    async fn list(&self, token: &str) -> StorageResult<Vec<RemoteEntry>>;

    /// Uploads `body` under `key` with the given predefined ACL.
    async fn put(
        &self,
        token: &str,
        key: &str,
        acl: AclPolicy,
        body: Vec<u8>,
    ) -> StorageResult<()>;

    /// Deletes the object under `key`.
    async fn delete(&self, token: &str, key: &str) -> StorageResult<()>;
}
