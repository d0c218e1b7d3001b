//! Venue and author matching.
//!
//! - [`normalize_venue`], [`extract_venue`] and [`VenueMatcher`] resolve a
//!   publication's venue metadata to an allow-listed venue.
//! - [`classify`] and [`attribute`] decide where a candidate sits in an
//!   initialed author list.

mod authors;
mod venue;

pub use authors::{attribute, check_name, classify, AuthorshipRecord, NameError, PositionCounts};
pub use venue::{extract_venue, normalize_venue, VenueMatch, VenueMatcher};
