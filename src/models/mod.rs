//! Core data models for profile pages, publications and tallies.

mod profile;
mod publication;

pub use profile::{
    Candidate, PlaceholderReason, ProfileAggregate, ProfileRecord, RecordStatus, VenueTally,
};
pub use publication::{FrontMatter, MetricPair, PublicationBuilder, PublicationEntry};
