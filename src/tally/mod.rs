//! Per-page tallies and their profile-level aggregation.
//!
//! Only venue-matched entries go through author attribution; everything
//! else just counts towards the article total.

mod aggregate;
mod page;

pub use aggregate::ProfileAggregator;
pub use page::{detail_line, tally_page, PageTally};
