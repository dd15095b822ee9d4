//! Bucket synchronization engine for gcl.
//!
//! Reconciles a local directory tree against a remote object-storage bucket:
//! - Pure diff/plan computation (upload, skip, delete under purge)
//! - Bounded-concurrency plan execution with classified retries
//! - Optional GnuPG payload encryption chosen once per run
//! - Coordinated bearer-token refresh shared by all workers
//! - Reproducible md5 manifest of the synchronized tree

pub mod acl;
pub mod cipher;
pub mod config;
pub mod engine;
pub mod error;
pub mod exclude;
pub mod executor;
pub mod manifest;
pub mod plan;
pub mod scanner;
pub mod store;
pub mod token;
pub mod transport;
pub mod types;

pub use acl::AclPolicy;
pub use cipher::{Cipher, GpgCipher, PassthroughCipher};
pub use config::SyncConfig;
pub use engine::SyncEngine;
pub use error::{StorageError, StorageResult};
pub use exclude::ExclusionSet;
pub use executor::{CancelHandle, PlanExecutor};
pub use plan::build_plan;
pub use scanner::scan_tree;
pub use store::ObjectStore;
pub use token::TokenGate;
pub use transport::GcsClient;
pub use types::*;
