//! Identity provider client (OpenID Connect authorization code flow).
//!
//! The storefront delegates sign-in to an external provider (Auth0-compatible
//! endpoints). A successful sign-in yields a [`CurrentUser`] stored in the
//! session; the user's email keys their order history.
//!
//! # Flow
//!
//! 1. Redirect the browser to `authorization_url()`
//! 2. The provider redirects back with an authorization code
//! 3. `sign_in()` exchanges the code and fetches the user profile
//! 4. `logout_url()` ends the provider session on sign-out

mod error;

pub use error::AuthError;

use std::sync::Arc;

use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use voyager_core::Email;

use crate::config::AuthConfig;
use crate::models::CurrentUser;

/// Scopes requested on sign-in.
const SCOPES: &str = "openid profile email";

/// Token endpoint response; only the access token is used (for `/userinfo`).
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Standard OIDC userinfo claims used by the storefront.
#[derive(Debug, Deserialize)]
pub struct UserInfo {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl TryFrom<UserInfo> for CurrentUser {
    type Error = AuthError;

    fn try_from(info: UserInfo) -> Result<Self, Self::Error> {
        Ok(Self {
            email: Email::parse(&info.email)?,
            // Providers fall back to the email when no display name is set
            name: info.name.filter(|n| !n.is_empty() && *n != info.email),
            picture: info.picture,
        })
    }
}

/// Client for the identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    issuer_base_url: String,
    client_id: String,
    client_secret: SecretString,
}

impl IdentityClient {
    /// Create a new identity provider client.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            inner: Arc::new(IdentityClientInner {
                client: reqwest::Client::new(),
                issuer_base_url: config.issuer_base_url.trim_end_matches('/').to_string(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            }),
        }
    }

    /// Build the provider's authorization URL.
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - Callback URL registered with the provider
    /// * `state` - Random value stored in the session (CSRF protection)
    /// * `nonce` - Random value for `OpenID` Connect replay protection
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> String {
        format!(
            "{}/authorize?\
            response_type=code&\
            client_id={}&\
            redirect_uri={}&\
            scope={}&\
            state={}&\
            nonce={}",
            self.inner.issuer_base_url,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state),
            urlencoding::encode(nonce)
        )
    }

    /// Build the provider's logout URL.
    #[must_use]
    pub fn logout_url(&self, return_to: &str) -> String {
        format!(
            "{}/v2/logout?client_id={}&returnTo={}",
            self.inner.issuer_base_url,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(return_to)
        )
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Provider` if the provider rejects the code.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AuthError> {
        let url = format!("{}/oauth/token", self.inner.issuer_base_url);

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self.inner.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider { status, body });
        }

        Ok(response.json().await?)
    }

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Provider` if the access token is rejected.
    #[instrument(skip_all)]
    pub async fn user_info(&self, access_token: &str) -> Result<UserInfo, AuthError> {
        let url = format!("{}/userinfo", self.inner.issuer_base_url);

        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider { status, body });
        }

        Ok(response.json().await?)
    }

    /// Complete the sign-in: exchange the code, then load the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if either provider call fails or the profile has no
    /// valid email.
    pub async fn sign_in(&self, code: &str, redirect_uri: &str) -> Result<CurrentUser, AuthError> {
        let token = self.exchange_code(code, redirect_uri).await?;
        let info = self.user_info(&token.access_token).await?;
        CurrentUser::try_from(info)
    }
}

/// Generate a random alphanumeric string for OAuth `state` and `nonce`.
#[must_use]
pub fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET.get(idx).map_or('0', |&b| char::from(b))
        })
        .collect()
}

/// Reduce a requested post-login destination to a local path.
///
/// Only absolute paths on this site are honoured; anything else (other
/// hosts, protocol-relative URLs, empty input) falls back to `/`.
#[must_use]
pub fn sanitize_return_to(return_to: Option<&str>) -> String {
    match return_to {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}
