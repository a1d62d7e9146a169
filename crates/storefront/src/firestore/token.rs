//! Access tokens for the Firestore REST API.
//!
//! Outside the emulator every request needs an OAuth bearer token. Tokens are
//! minted by the instance metadata server, live for about an hour, and are
//! cached until shortly before they expire.

use std::time::{Duration, Instant};

use secrecy::SecretString;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use super::FirestoreError;
use crate::config::FirestoreAuth;

/// Token endpoint of the default service account.
pub const METADATA_TOKEN_PATH: &str =
    "/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh this long before the reported expiry.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: SecretString,
    refresh_at: Instant,
}

/// Supplies bearer tokens, refreshing them as they age.
pub struct TokenSource {
    client: reqwest::Client,
    /// `None` for the emulator.
    token_url: Option<String>,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    /// Token source for the configured credentials.
    #[must_use]
    pub fn new(client: reqwest::Client, auth: &FirestoreAuth) -> Self {
        let token_url = match auth {
            FirestoreAuth::Emulator => None,
            FirestoreAuth::MetadataServer { host } => {
                Some(format!("http://{host}{METADATA_TOKEN_PATH}"))
            }
        };

        Self {
            client,
            token_url,
            cached: Mutex::new(None),
        }
    }

    /// Current bearer token, or `None` when requests go unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns `FirestoreError::Token` if the metadata server refuses, and
    /// `Http`/`Parse` if it cannot be reached or answers garbage.
    pub async fn bearer(&self) -> Result<Option<SecretString>, FirestoreError> {
        let Some(url) = &self.token_url else {
            return Ok(None);
        };

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.refresh_at) {
            return Ok(Some(token.value.clone()));
        }

        let token = self.fetch(url).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(Some(value))
    }

    async fn fetch(&self, url: &str) -> Result<CachedToken, FirestoreError> {
        let response = self
            .client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(FirestoreError::Token(format!(
                "metadata server returned {status}: {}",
                text.chars().take(200).collect::<String>()
            )));
        }

        let token: MetadataToken = serde_json::from_str(&text)?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
        debug!(expires_in = token.expires_in, "Fetched Firestore access token");

        Ok(CachedToken {
            value: SecretString::from(token.access_token),
            refresh_at: Instant::now() + lifetime,
        })
    }
}
