//! Predefined bucket ACL policies.
//!
//! The original interface passed ACLs around as free-form strings and let
//! the store reject bad ones; here unknown names fail at configuration time
//! as `StorageError::Config`, before any network call.

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of predefined ACLs accepted by the object store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AclPolicy {
    #[default]
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
}

impl AclPolicy {
    /// All accepted CLI names, for error messages.
    pub const NAMES: [&'static str; 6] = [
        "private",
        "public-read",
        "public-read-write",
        "authenticated-read",
        "bucket-owner-read",
        "bucket-owner-full-control",
    ];

    /// The `predefinedAcl` query value used by the JSON API.
    pub fn as_query_value(&self) -> &'static str {
        match self {
            AclPolicy::Private => "private",
            AclPolicy::PublicRead => "publicRead",
            AclPolicy::PublicReadWrite => "publicReadWrite",
            AclPolicy::AuthenticatedRead => "authenticatedRead",
            AclPolicy::BucketOwnerRead => "bucketOwnerRead",
            AclPolicy::BucketOwnerFullControl => "bucketOwnerFullControl",
        }
    }

    fn as_cli_name(&self) -> &'static str {
        match self {
            AclPolicy::Private => "private",
            AclPolicy::PublicRead => "public-read",
            AclPolicy::PublicReadWrite => "public-read-write",
            AclPolicy::AuthenticatedRead => "authenticated-read",
            AclPolicy::BucketOwnerRead => "bucket-owner-read",
            AclPolicy::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }
}

impl FromStr for AclPolicy {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(AclPolicy::Private),
            "public-read" => Ok(AclPolicy::PublicRead),
            "public-read-write" => Ok(AclPolicy::PublicReadWrite),
            "authenticated-read" => Ok(AclPolicy::AuthenticatedRead),
            "bucket-owner-read" => Ok(AclPolicy::BucketOwnerRead),
            "bucket-owner-full-control" => Ok(AclPolicy::BucketOwnerFullControl),
            other => Err(StorageError::Config(format!(
                "unknown ACL policy '{other}', expected one of: {}",
                Self::NAMES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for AclPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_cli_name())
    }
}
