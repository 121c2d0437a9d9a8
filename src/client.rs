//! HTTP client for the OCLC Classify2 service
//!
//! One GET endpoint; the search type is carried in the query string. The
//! client only fetches the raw XML body. Interpreting it is the response
//! module's job.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use urlencoding::encode;

use crate::search_key::SearchKey;

const ENDPOINT_URL: &str = "http://classify.oclc.org/classify2/Classify";
const BASE_QUERYSTRING: &str = "summary=true&maxRecs=1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A failed lookup call. Both variants are absorbed by the row processor as
/// "no result"; they never abort a batch.
#[derive(Debug)]
pub enum LookupError {
    /// Network failure, including per-request timeout
    Transport(String),
    /// Service answered with a non-success HTTP status
    Status(u16),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::Transport(msg) => write!(f, "transport error: {}", msg),
            LookupError::Status(code) => write!(f, "service returned HTTP {}", code),
        }
    }
}

impl std::error::Error for LookupError {}

/// The lookup service as seen by the row processor.
#[async_trait]
pub trait ClassifyService: Send + Sync {
    /// Run one query and return the raw XML body.
    async fn lookup(&self, key: &SearchKey) -> Result<String, LookupError>;
}

/// reqwest-backed implementation talking to the real Classify2 endpoint.
pub struct ClassifyClient {
    client: reqwest::Client,
    base_url: String,
    exact_match: bool,
}

impl ClassifyClient {
    /// When `exact_match` is set, title and author values are quoted in the
    /// query to request literal rather than fuzzy matching.
    pub fn new(exact_match: bool) -> Result<Self, LookupError> {
        Self::with_base_url(ENDPOINT_URL, exact_match)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        exact_match: bool,
    ) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LookupError::Transport(format!("failed to build client: {}", e)))?;

        Ok(ClassifyClient {
            client,
            base_url: base_url.into(),
            exact_match,
        })
    }

    fn query_for(&self, key: &SearchKey) -> String {
        // %22 wraps a value in literal quotes for exact matching
        let quoted = |v: &str| {
            if self.exact_match {
                format!("%22{}%22", encode(v))
            } else {
                encode(v).into_owned()
            }
        };

        match key {
            SearchKey::Isbn(v) => format!("isbn={}", encode(v)),
            SearchKey::Issn(v) => format!("issn={}", encode(v)),
            SearchKey::WorkIndex(v) => format!("wi={}", encode(v)),
            SearchKey::Title(title) => format!("title={}", quoted(title)),
            SearchKey::TitleAuthor { title, author } => {
                format!("author={}&title={}", quoted(author), quoted(title))
            }
        }
    }
}

#[async_trait]
impl ClassifyService for ClassifyClient {
    async fn lookup(&self, key: &SearchKey) -> Result<String, LookupError> {
        let url = format!("{}?{}&{}", self.base_url, BASE_QUERYSTRING, self.query_for(key));
        tracing::debug!(%url, "querying classify endpoint");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LookupError::Status(resp.status().as_u16()));
        }

        resp.text()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))
    }
}
