//! Page sources: where profile page bodies come from.
//!
//! The pagination controller only needs one capability, [`PageFetcher`]:
//! given a URL, return an HTTP-like status and a body, or a transport error.
//!
//! - [`HttpFetcher`]: live requests through a shared reqwest session
//! - [`CachedPageFetcher`]: previously cached bodies, for offline runs
//! - [`ScriptedFetcher`]: canned responses, for tests
//!
//! [`scholar`] holds the profile URL conventions and the page extraction
//! that turns a body into publication entries and front matter.

mod cache;
mod http;
pub mod mock;
pub mod scholar;

pub use cache::{CacheError, CachedPageFetcher, PageCache};
pub use http::HttpFetcher;
pub use mock::ScriptedFetcher;

use async_trait::async_trait;
use url::Url;

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Failures below the HTTP status level
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Fetch capability consumed by the pagination controller.
#[async_trait]
pub trait PageFetcher: Send + Sync + std::fmt::Debug {
    /// Short identifier for logs
    fn id(&self) -> &str;

    /// Request one page
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError>;
}
