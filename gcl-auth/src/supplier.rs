//! Token supplier capability and the OAuth2 refresh-grant implementation.
//!
//! The sync engine never talks to the token endpoint directly; it sees a
//! `TokenSupplier` it can ask for the current token or a fresh one.
//! Coordination of *when* to refresh (at most once per expiry event across
//! concurrent workers) lives in the storage crate's refresh gate.

use crate::error::{AuthError, AuthResult};
use crate::token::AccessToken;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Source of bearer tokens for authenticated requests.
#[async_trait]
pub trait TokenSupplier: Send + Sync {
    /// Returns the currently cached token.
    async fn current(&self) -> AuthResult<AccessToken>;

    /// Exchanges the refresh token for a new access token.
    async fn refresh(&self) -> AuthResult<AccessToken>;
}

/// OAuth2 client identity plus refresh token, as stored on disk after the
/// one-time authorization.
#[derive(Clone, Debug, Deserialize)]
pub struct OauthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Token endpoint; overridable for tests.
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// `TokenSupplier` backed by the OAuth2 refresh grant.
pub struct OauthSupplier {
    client: Client,
    config: OauthConfig,
    cached: RwLock<Option<AccessToken>>,
}

impl OauthSupplier {
    pub fn new(config: OauthConfig) -> AuthResult<Self> {
        if config.refresh_token.is_empty() {
            return Err(AuthError::Config("empty refresh token".to_string()));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            config,
            cached: RwLock::new(None),
        })
    }

    /// Seeds the cache with a pre-obtained access token.
    pub async fn set_token(&self, token: AccessToken) {
        let mut cached = self.cached.write().await;
        *cached = Some(token);
    }
}

#[async_trait]
impl TokenSupplier for OauthSupplier {
    async fn current(&self) -> AuthResult<AccessToken> {
        {
            let cached = self.cached.read().await;
            if let Some(ref token) = *cached {
                if !token.is_expired() {
                    return Ok(token.clone());
                }
                debug!("cached access token expired, refreshing");
            }
        }

        self.refresh().await
    }

    async fn refresh(&self) -> AuthResult<AccessToken> {
        let resp = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", self.config.refresh_token.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!("token refresh failed with {status}: {body}");
            return Err(AuthError::TokenRejected(format!("{status}: {body}")));
        }

        let resp: TokenResponse = resp.json().await?;
        let token = AccessToken::new(
            resp.access_token,
            Utc::now() + chrono::Duration::seconds(resp.expires_in),
        );

        debug!("refreshed access token, expires at {}", token.expires_at);

        let mut cached = self.cached.write().await;
        *cached = Some(token.clone());

        Ok(token)
    }
}
