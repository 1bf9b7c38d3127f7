use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Template-ready context handed to a page renderer.
pub type Context = serde_json::Map<String, serde_json::Value>;

/// Ordered results of one `fetch_all` call, index-aligned with its input.
pub type ResultSet = Vec<FetchResult>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
}

impl From<&str> for FetchRequest {
    fn from(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }
}

impl From<String> for FetchRequest {
    fn from(url: String) -> Self {
        Self { url }
    }
}

impl From<&String> for FetchRequest {
    fn from(url: &String) -> Self {
        Self { url: url.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub status: u16,
    /// Header names are lower-cased.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl FetchResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FetchErrorKind {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Outcome of a single GET within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub url: String,
    pub outcome: Result<FetchResponse, FetchErrorKind>,
}

impl FetchResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn response(&self) -> Option<&FetchResponse> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&FetchErrorKind> {
        self.outcome.as_ref().err()
    }
}

/// Pagination headers returned alongside a list of posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub total_pages: Option<u32>,
    pub total_posts: Option<u64>,
}

impl PageMetadata {
    pub fn from_response(response: &FetchResponse) -> Self {
        Self {
            total_pages: response
                .header("x-wp-totalpages")
                .and_then(|v| v.trim().parse().ok()),
            total_posts: response
                .header("x-wp-total")
                .and_then(|v| v.trim().parse().ok()),
        }
    }
}
