//! Firestore REST client for the order store.
//!
//! # Architecture
//!
//! - Plain `reqwest` JSON calls against the Firestore v1 REST API
//! - Works against the public endpoint or a local emulator; bearer tokens
//!   come from [`TokenSource`] and are refreshed before they expire
//! - No caching and no retries: one HTTP call per query
//!
//! # Example
//!
//! ```rust,ignore
//! use voyager_storefront::firestore::{Direction, FirestoreClient, StructuredQuery};
//!
//! let client = FirestoreClient::new(&config.firestore);
//! let query = StructuredQuery::collection("orders").order_by("timestamp", Direction::Descending);
//! let documents = client.run_query(&["users", "u@example.com"], query).await?;
//! ```

mod conversions;
pub mod token;
pub mod types;

pub use conversions::convert_order;
pub use token::TokenSource;
pub use types::{Direction, Document, StructuredQuery, Value};

use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::FirestoreConfig;
use types::{ApiErrorResponse, RunQueryRequest, RunQueryResponse};

/// Errors that can occur when talking to Firestore.
#[derive(Debug, Error)]
pub enum FirestoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Firestore returned an error response.
    #[error("Firestore API error {code} {status}: {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    /// No access token could be obtained.
    #[error("Firestore token error: {0}")]
    Token(String),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A document did not have the expected shape.
    #[error("Malformed document {document}: field `{field}` {reason}")]
    Decode {
        document: String,
        field: String,
        reason: String,
    },
}

/// Client for the Firestore REST API.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    /// `{endpoint}/v1/projects/{project}/databases/{database}/documents`
    documents_url: String,
    tokens: TokenSource,
}

impl FirestoreClient {
    /// Create a new Firestore client.
    #[must_use]
    pub fn new(config: &FirestoreConfig) -> Self {
        let documents_url = format!(
            "{}/v1/projects/{}/databases/{}/documents",
            config.endpoint.trim_end_matches('/'),
            urlencoding::encode(&config.project_id),
            config.database,
        );

        let client = reqwest::Client::new();

        Self {
            inner: Arc::new(FirestoreClientInner {
                tokens: TokenSource::new(client.clone(), &config.auth),
                client,
                documents_url,
            }),
        }
    }

    /// URL of `documents:runQuery` scoped to the document at `parent`.
    ///
    /// Each path segment is percent-encoded; an empty parent queries
    /// root collections.
    #[must_use]
    pub fn run_query_url(&self, parent: &[&str]) -> String {
        let mut url = self.inner.documents_url.clone();
        for segment in parent {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url.push_str(":runQuery");
        url
    }

    /// Run a structured query against the child collections of `parent`.
    ///
    /// Returns matching documents in the order Firestore streamed them.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, Firestore rejects the query,
    /// or the response cannot be parsed.
    #[instrument(skip(self, parent, query), fields(parent = %parent.join("/")))]
    pub async fn run_query(
        &self,
        parent: &[&str],
        query: StructuredQuery,
    ) -> Result<Vec<Document>, FirestoreError> {
        let url = self.run_query_url(parent);
        let body = RunQueryRequest {
            structured_query: query,
        };

        let mut request = self.inner.client.post(&url).json(&body);
        if let Some(token) = self.inner.tokens.bearer().await? {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }

        let responses: Vec<RunQueryResponse> = serde_json::from_str(&text)?;
        let documents: Vec<Document> = responses.into_iter().filter_map(|r| r.document).collect();

        debug!(count = documents.len(), "Firestore query returned documents");
        Ok(documents)
    }
}

/// Build an API error from a non-success response body.
fn api_error(code: u16, body: &str) -> FirestoreError {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(envelope) => FirestoreError::Api {
            code: envelope.error.code,
            status: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => FirestoreError::Api {
            code,
            status: String::new(),
            message: body.chars().take(200).collect(),
        },
    }
}
