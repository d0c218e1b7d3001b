//! Per-profile pagination with block detection and pacing.

mod block;
mod controller;

pub use block::looks_like_block_page;
pub use controller::{
    FetchedPage, PaginationOutcome, ProfileFetchState, ProfilePager, TerminalReason,
};
