//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (session store)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `AUTH0_ISSUER_BASE_URL` - Identity provider tenant (e.g., `https://voyager.eu.auth0.com`)
//! - `AUTH0_CLIENT_ID` - OAuth client ID
//! - `AUTH0_CLIENT_SECRET` - OAuth client secret (high entropy)
//! - `FIRESTORE_PROJECT_ID` - Google Cloud project holding the order store
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `FIRESTORE_DATABASE` - Firestore database ID (default: `(default)`)
//! - `FIRESTORE_EMULATOR_HOST` - `host:port` of a local Firestore emulator
//!   (requests are then unauthenticated)
//! - `GCE_METADATA_HOST` - Metadata server minting Firestore access tokens
//!   (default: `metadata.google.internal`)
//!
//! `FIRESTORE_ACCESS_TOKEN` is rejected: a pasted token expires within the
//! hour. Outside the emulator, tokens come from the metadata server and are
//! refreshed before they expire.
//! - `VOYAGER_CATALOG_PATH` - Catalog JSON file (default: `crates/storefront/content/catalog.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Lowest acceptable entropy for the OAuth client secret.
const MIN_BITS_PER_CHAR: f64 = 3.3;

/// Public Firestore REST endpoint.
pub const FIRESTORE_PUBLIC_ENDPOINT: &str = "https://firestore.googleapis.com";

/// Metadata server reachable from GCE, Cloud Run and GKE workloads.
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

/// Fragments of sample values that end up in `.env` files (matched lower-cased).
const PLACEHOLDER_MARKERS: &[&str] = &[
    "your_",
    "your-",
    "changeme",
    "placeholder",
    "example",
    "secret",
    "xxx",
    "auth0-client",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront, without trailing slash
    pub base_url: String,
    /// Identity provider configuration
    pub auth: AuthConfig,
    /// Order store configuration
    pub firestore: FirestoreConfig,
    /// Catalog file location
    pub catalog_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// OpenID Connect identity provider configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct AuthConfig {
    /// Tenant base URL, without trailing slash
    pub issuer_base_url: String,
    /// OAuth client ID (safe to expose in browser redirects)
    pub client_id: String,
    /// OAuth client secret (server-side only)
    pub client_secret: SecretString,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("issuer_base_url", &self.issuer_base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Firestore order store configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// Google Cloud project ID
    pub project_id: String,
    /// Database ID within the project
    pub database: String,
    /// REST endpoint (public API or emulator)
    pub endpoint: String,
    /// Where bearer tokens come from
    pub auth: FirestoreAuth,
}

/// How requests to Firestore are authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirestoreAuth {
    /// Local emulator; no credentials.
    Emulator,
    /// Short-lived tokens from the instance metadata server (`host[:port]`).
    MetadataServer { host: String },
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = parse_base_url("STOREFRONT_BASE_URL", get_required_env("STOREFRONT_BASE_URL")?)?;

        let auth = AuthConfig::from_env()?;
        let firestore = FirestoreConfig::from_env()?;
        let catalog_path = PathBuf::from(get_env_or_default(
            "VOYAGER_CATALOG_PATH",
            "crates/storefront/content/catalog.json",
        ));

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            auth,
            firestore,
            catalog_path,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            issuer_base_url: trim_trailing_slash(get_required_env("AUTH0_ISSUER_BASE_URL")?),
            client_id: get_required_env("AUTH0_CLIENT_ID")?,
            client_secret: get_checked_secret("AUTH0_CLIENT_SECRET")?,
        })
    }
}

impl FirestoreConfig {
    /// Load the order store configuration on its own (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `FIRESTORE_PROJECT_ID` is unset,
    /// and `ConfigError::InvalidEnvVar` if a static `FIRESTORE_ACCESS_TOKEN`
    /// is configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        if get_optional_env("FIRESTORE_ACCESS_TOKEN").is_some() {
            return Err(ConfigError::InvalidEnvVar(
                "FIRESTORE_ACCESS_TOKEN".to_string(),
                "static tokens expire after an hour; unset it and use the metadata server \
                 (GCE_METADATA_HOST) or FIRESTORE_EMULATOR_HOST"
                    .to_string(),
            ));
        }

        let (endpoint, auth) = match get_optional_env("FIRESTORE_EMULATOR_HOST") {
            Some(host) => (format!("http://{host}"), FirestoreAuth::Emulator),
            None => (
                FIRESTORE_PUBLIC_ENDPOINT.to_string(),
                FirestoreAuth::MetadataServer {
                    host: get_env_or_default("GCE_METADATA_HOST", DEFAULT_METADATA_HOST),
                },
            ),
        };

        Ok(Self {
            project_id: get_required_env("FIRESTORE_PROJECT_ID")?,
            database: get_env_or_default("FIRESTORE_DATABASE", "(default)"),
            endpoint,
            auth,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate an absolute `http(s)` URL and strip its trailing slash.
fn parse_base_url(name: &str, value: String) -> Result<String, ConfigError> {
    let url = url::Url::parse(&value)
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            "must be an http(s) URL with a host".to_string(),
        ));
    }
    Ok(trim_trailing_slash(value))
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
pub(crate) fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a sample rate in `0.0..=1.0`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Bits of information per character, from character frequencies.
fn bits_per_char(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    s.chars().for_each(|c| *counts.entry(c).or_default() += 1);

    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    counts
        .values()
        .map(|&n| f64::from(n) / f64::from(total))
        .map(|p| -p * p.log2())
        .sum()
}

/// Reject copy-pasted sample values and low-entropy strings.
fn check_secret(key: &str, value: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| Err(ConfigError::InsecureSecret(key.to_string(), reason));

    let lower = value.to_lowercase();
    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lower.contains(**m)) {
        return insecure(format!("looks like a sample value (contains '{marker}')"));
    }

    let bits = bits_per_char(value);
    if bits < MIN_BITS_PER_CHAR {
        return insecure(format!(
            "only {bits:.2} bits/char of entropy, at least {MIN_BITS_PER_CHAR:.1} required"
        ));
    }

    Ok(())
}

/// A required secret that passed [`check_secret`].
fn get_checked_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    check_secret(key, &value)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/voyager_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            auth: AuthConfig {
                issuer_base_url: "https://voyager.eu.auth0.com".to_string(),
                client_id: "voyager-web".to_string(),
                client_secret: SecretString::from("k8Q2v9Lr3Zt6Wp1Xn5Bc7Md4"),
            },
            firestore: FirestoreConfig {
                project_id: "voyager-orders".to_string(),
                database: "(default)".to_string(),
                endpoint: FIRESTORE_PUBLIC_ENDPOINT.to_string(),
                auth: FirestoreAuth::MetadataServer {
                    host: DEFAULT_METADATA_HOST.to_string(),
                },
            },
            catalog_path: PathBuf::from("content/catalog.json"),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_bits_per_char() {
        assert!(bits_per_char("").abs() < f64::EPSILON);
        assert!(bits_per_char("zzzz").abs() < f64::EPSILON);
        assert!((bits_per_char("abab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_check_secret_rejects_sample_values() {
        let err = check_secret("AUTH0_CLIENT_SECRET", "YOUR_AUTH0_CLIENT_SECRET").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(key, _) if key == "AUTH0_CLIENT_SECRET"));
    }

    #[test]
    fn test_check_secret_rejects_repetitive_values() {
        assert!(check_secret("AUTH0_CLIENT_SECRET", "abcabcabcabcabcabcabc").is_err());
    }

    #[test]
    fn test_check_secret_accepts_generated_value() {
        assert!(check_secret("AUTH0_CLIENT_SECRET", "k8Q2v9Lr3Zt6Wp1Xn5Bc7Md4").is_ok());
    }

    #[test]
    fn test_trim_trailing_slash() {
        assert_eq!(
            trim_trailing_slash("https://voyager.in//".to_string()),
            "https://voyager.in"
        );
        assert_eq!(trim_trailing_slash("http://x".to_string()), "http://x");
    }

    #[test]
    fn test_parse_base_url() {
        assert_eq!(
            parse_base_url("X", "https://voyager.in/".to_string()).unwrap(),
            "https://voyager.in"
        );
        assert!(parse_base_url("X", "voyager.in".to_string()).is_err());
        assert!(parse_base_url("X", "ftp://voyager.in".to_string()).is_err());
    }

    #[test]
    fn test_cookies_are_secure_only_over_https() {
        let mut config = test_config();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert!(!config.is_secure());

        config.base_url = "https://voyager.in".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_debug_hides_client_secret() {
        let config = test_config();
        let printed = format!("{:?} {:?}", config.auth, config.firestore);

        assert!(printed.contains("voyager.eu.auth0.com"));
        assert!(printed.contains("voyager-web"));
        assert!(printed.contains("voyager-orders"));
        assert!(!printed.contains("Xn5Bc7"));
        assert!(printed.contains("metadata.google.internal"));
    }

    #[test]
    #[allow(unsafe_code)]
    fn test_static_firestore_token_is_rejected() {
        // SAFETY: no other test reads or writes this variable
        unsafe { std::env::set_var("FIRESTORE_ACCESS_TOKEN", "ya29.a0AfH6SMBx") };
        let result = FirestoreConfig::from_env();
        unsafe { std::env::remove_var("FIRESTORE_ACCESS_TOKEN") };

        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "FIRESTORE_ACCESS_TOKEN"
        ));
    }
}
