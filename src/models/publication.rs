//! Publication entries and profile front matter extracted from profile pages.

use serde::{Deserialize, Serialize};

/// One row of a profile's publication table.
///
/// Entries are produced by page extraction and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationEntry {
    /// Publication title
    pub title: String,

    /// Author tokens in listed order (usually initialed, e.g. "J Smith")
    pub authors: Vec<String>,

    /// Raw venue metadata ("Nature 580 (7803), 123-125")
    pub venue: String,

    /// Publication year, when listed
    pub year: Option<u16>,

    /// Citation count (0 when the cell is blank)
    pub citations: u32,
}

impl PublicationEntry {
    /// Create a new entry with required fields
    pub fn new(title: impl Into<String>, venue: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors: Vec::new(),
            venue: venue.into(),
            year: None,
            citations: 0,
        }
    }

    /// Number of listed authors
    pub fn author_count(&self) -> usize {
        self.authors.len()
    }
}

/// Builder for constructing PublicationEntry objects
#[derive(Debug, Clone)]
pub struct PublicationBuilder {
    entry: PublicationEntry,
}

impl PublicationBuilder {
    /// Create a new builder with required fields
    pub fn new(title: impl Into<String>, venue: impl Into<String>) -> Self {
        Self {
            entry: PublicationEntry::new(title, venue),
        }
    }

    /// Set authors from a comma-separated author line
    pub fn author_line(mut self, line: &str) -> Self {
        self.entry.authors = line
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// Set authors
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Set publication year
    pub fn year(mut self, year: u16) -> Self {
        self.entry.year = Some(year);
        self
    }

    /// Set citation count
    pub fn citations(mut self, count: u32) -> Self {
        self.entry.citations = count;
        self
    }

    /// Build the PublicationEntry
    pub fn build(self) -> PublicationEntry {
        self.entry
    }
}

/// An (all time, recent window) metric pair from the profile summary table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricPair {
    pub all: Option<u32>,
    pub since: Option<u32>,
}

/// Header fields of a profile, only read from the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Display name as shown on the profile
    pub name: Option<String>,

    /// Affiliation line
    pub institution: Option<String>,

    /// Research interest labels
    pub interests: Vec<String>,

    /// Citation counts
    pub citations: MetricPair,

    /// h-index
    pub h_index: MetricPair,

    /// i10-index
    pub i10_index: MetricPair,
}

impl FrontMatter {
    /// True when none of the descriptive fields were found
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.institution.is_none() && self.interests.is_empty()
    }
}
