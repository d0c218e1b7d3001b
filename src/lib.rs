//! # Scholar Tally
//!
//! Venue and authorship-position tallies from public academic profile pages.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`]: Configuration and input files
//! - [`models`]: Publications, candidates, tallies and output records
//! - [`sources`]: Page fetchers (HTTP, cache, scripted) and page extraction
//! - [`pagination`]: Per-profile paging with block detection and backoff
//! - [`matching`]: Venue normalization/matching and author classification
//! - [`tally`]: Per-page tallies folded into profile aggregates
//! - [`batch`]: Sequential candidate processing with checkpoints
//! - [`utils`]: HTTP client, retry policy and randomized delays

pub mod batch;
pub mod config;
pub mod matching;
pub mod models;
pub mod pagination;
pub mod sources;
pub mod tally;
pub mod utils;

// Re-export commonly used types
pub use batch::{BatchReport, BatchRunner};
pub use config::Config;
pub use models::{Candidate, ProfileAggregate, ProfileRecord};
pub use sources::PageFetcher;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
