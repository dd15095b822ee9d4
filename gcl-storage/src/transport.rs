//! Object store client over the GCS JSON API.
//!
//! Speaks `storage.googleapis.com` with bearer tokens: paginated bucket
//! listing, media upload with a predefined ACL, and object deletion. All
//! HTTP failures are classified at this boundary; connection-level errors
//! count as transient.

use crate::acl::AclPolicy;
use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;
use crate::types::RemoteEntry;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// HTTP client for one bucket.
pub struct GcsClient {
    client: Client,
    bucket: String,
    base_url: String,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<ObjectResource>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ObjectResource {
    name: String,
    #[serde(default, deserialize_with = "deserialize_u64_from_str_or_num")]
    size: u64,
    /// Base64-encoded 16-byte md5, absent for some object classes.
    #[serde(rename = "md5Hash")]
    md5_hash: Option<String>,
    #[serde(default)]
    etag: String,
    #[serde(default = "Utc::now")]
    updated: DateTime<Utc>,
}

/// The JSON API returns `size` as a string; accept either form.
fn deserialize_u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct U64Visitor;
    impl<'de> de::Visitor<'de> for U64Visitor {
        type Value = u64;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("an unsigned integer or string-encoded integer")
        }
        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }
        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(de::Error::custom)
        }
        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            v.parse().map_err(de::Error::custom)
        }
    }
    deserializer.deserialize_any(U64Visitor)
}

impl GcsClient {
    /// Creates a client for `bucket`; `base_url` overrides the production
    /// endpoint for tests.
    pub fn new(bucket: impl Into<String>, base_url: impl Into<String>) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| StorageError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            bucket: bucket.into(),
            base_url: base_url.into(),
        })
    }

    fn check(resp: &reqwest::Response, context: &str) -> StorageResult<()> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(StorageError::from_status(status, context))
        }
    }
}

fn transient(context: &str, e: reqwest::Error) -> StorageError {
    StorageError::Transient(format!("{context}: {e}"))
}

#[async_trait]
impl ObjectStore for GcsClient {
    async fn list(&self, token: &str) -> StorageResult<Vec<RemoteEntry>> {
        let url = format!("{}/storage/v1/b/{}/o", self.base_url, self.bucket);
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).bearer_auth(token);
            if let Some(ref pt) = page_token {
                request = request.query(&[("pageToken", pt.as_str())]);
            }

            let context = format!("list bucket {}", self.bucket);
            let resp = request.send().await.map_err(|e| transient(&context, e))?;
            Self::check(&resp, &context)?;

            let page: ListResponse = resp.json().await.map_err(|e| transient(&context, e))?;
            for item in page.items {
                // Normalize the base64 md5Hash to hex; an undecodable value
                // is treated as no digest, forcing re-upload.
                let md5 = item
                    .md5_hash
                    .as_deref()
                    .and_then(|b64| BASE64.decode(b64).ok())
                    .map(hex::encode);

                entries.push(RemoteEntry {
                    key: item.name,
                    size: item.size,
                    md5,
                    etag: item.etag,
                    updated: item.updated,
                });
            }

            match page.next_page_token {
                Some(pt) => page_token = Some(pt),
                None => break,
            }
        }

        debug!("listed {} objects in bucket {}", entries.len(), self.bucket);
        Ok(entries)
    }

    async fn put(
        &self,
        token: &str,
        key: &str,
        acl: AclPolicy,
        body: Vec<u8>,
    ) -> StorageResult<()> {
        let url = format!(
            "{}/upload/storage/v1/b/{}/o",
            self.base_url, self.bucket
        );
        let size = body.len();
        let context = format!("put {key}");

        let resp = self
            .client
            .post(&url)
            .query(&[
                ("uploadType", "media"),
                ("name", key),
                ("predefinedAcl", acl.as_query_value()),
            ])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await
            .map_err(|e| transient(&context, e))?;
        Self::check(&resp, &context)?;

        debug!("uploaded {size} bytes to gs://{}/{key}", self.bucket);
        Ok(())
    }

    async fn delete(&self, token: &str, key: &str) -> StorageResult<()> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}",
            self.base_url,
            self.bucket,
            urlencoding::encode(key)
        );
        let context = format!("delete {key}");

        let resp = self
            .client
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transient(&context, e))?;
        Self::check(&resp, &context)?;

        debug!("deleted gs://{}/{key}", self.bucket);
        Ok(())
    }
}
