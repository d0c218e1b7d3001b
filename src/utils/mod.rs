//! Utility modules supporting profile fetching.
//!
//! - [`HttpClient`]: shared reqwest session with browser-like defaults
//! - [`BackoffPolicy`]: geometric backoff with a retry ceiling
//! - [`RetryCause`]: why a page request is retried
//! - [`JitteredDelay`]: randomized wait centered on a mean
//!
//! # Retry with Backoff
//!
//! ```rust
//! use scholar_tally::utils::BackoffPolicy;
//! use std::time::Duration;
//!
//! let policy = BackoffPolicy::new(Duration::from_secs(10), 3);
//! assert_eq!(policy.delay_for(3), Duration::from_secs(40));
//! assert!(policy.exhausted(4));
//! ```

mod http;
mod jitter;
mod retry;

pub use http::HttpClient;
pub use jitter::JitteredDelay;
pub use retry::{BackoffPolicy, RetryCause};
