//! Profile-level models: candidates, aggregated tallies and output records.

use serde::{Deserialize, Serialize};

use super::FrontMatter;

/// A named person whose profile should be tallied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Caller-assigned identifier
    pub id: String,

    /// Full name in "First [Middle...] Last" order
    pub name: String,

    /// Public profile link, if one was supplied
    #[serde(default)]
    pub profile_url: Option<String>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            profile_url: None,
        }
    }

    pub fn with_profile_url(mut self, url: impl Into<String>) -> Self {
        self.profile_url = Some(url.into());
        self
    }
}

/// Counts for one allow-listed venue.
///
/// Position counters are independent: a match on a two-author paper bumps
/// both `second_author` and `last_author`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueTally {
    pub venue: String,
    pub total: usize,
    pub first_author: usize,
    pub second_author: usize,
    pub last_author: usize,
}

impl VenueTally {
    pub fn new(venue: impl Into<String>) -> Self {
        Self {
            venue: venue.into(),
            ..Default::default()
        }
    }

    /// Fold another tally for the same venue into this one
    pub fn absorb(&mut self, other: &VenueTally) {
        self.total += other.total;
        self.first_author += other.first_author;
        self.second_author += other.second_author;
        self.last_author += other.last_author;
    }
}

/// Totals for one profile across all of its pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAggregate {
    /// Header fields from the first page
    pub front_matter: FrontMatter,

    /// One tally per allow-listed venue, in allow-list order
    pub venues: Vec<VenueTally>,

    /// Publications observed on all pages
    pub article_count: usize,

    /// Venue-matched publications where the candidate was found in the author list
    pub authored_count: usize,

    /// Pages folded into this aggregate
    pub pages: usize,

    /// Formatted lines for each venue-matched publication, in page order
    pub details: Vec<String>,
}

impl ProfileAggregate {
    /// Look up the tally for a canonical venue name
    pub fn venue(&self, canonical: &str) -> Option<&VenueTally> {
        self.venues.iter().find(|t| t.venue == canonical)
    }

    /// Publications in any allow-listed venue
    pub fn venue_total(&self) -> usize {
        self.venues.iter().map(|t| t.total).sum()
    }

    /// Whether the profile yielded anything worth reporting
    pub fn is_meaningful(&self) -> bool {
        !self.front_matter.is_empty() || self.venue_total() > 0
    }
}

/// Why a candidate ended up with a placeholder record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderReason {
    MissingUrl,
    InvalidUrl,
    LikelyBlocked,
    NoMeaningfulData,
}

impl std::fmt::Display for PlaceholderReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            PlaceholderReason::MissingUrl => "no profile link",
            PlaceholderReason::InvalidUrl => "profile link has no user id",
            PlaceholderReason::LikelyBlocked => "no pages produced (likely blocked)",
            PlaceholderReason::NoMeaningfulData => "no meaningful data on profile",
        };
        f.write_str(text)
    }
}

/// Outcome for a single candidate in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordStatus {
    Scraped,
    Placeholder { reason: PlaceholderReason },
}

/// Per-candidate output handed to report writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub candidate: Candidate,

    /// Canonical profile URL actually used
    pub profile_url: Option<String>,

    #[serde(flatten)]
    pub status: RecordStatus,

    pub aggregate: Option<ProfileAggregate>,
}

impl ProfileRecord {
    pub fn scraped(candidate: Candidate, profile_url: String, aggregate: ProfileAggregate) -> Self {
        Self {
            candidate,
            profile_url: Some(profile_url),
            status: RecordStatus::Scraped,
            aggregate: Some(aggregate),
        }
    }

    pub fn placeholder(candidate: Candidate, reason: PlaceholderReason) -> Self {
        Self {
            candidate,
            profile_url: None,
            status: RecordStatus::Placeholder { reason },
            aggregate: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.status, RecordStatus::Placeholder { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venue_tally_absorb() {
        let mut total = VenueTally::new("Nature");
        let page = VenueTally {
            venue: "Nature".to_string(),
            total: 3,
            first_author: 1,
            second_author: 1,
            last_author: 2,
        };
        total.absorb(&page);
        total.absorb(&page);

        assert_eq!(total.total, 6);
        assert_eq!(total.first_author, 2);
        assert_eq!(total.last_author, 4);
    }

    #[test]
    fn test_aggregate_meaningful() {
        let mut aggregate = ProfileAggregate {
            venues: vec![VenueTally::new("Nature")],
            ..Default::default()
        };
        assert!(!aggregate.is_meaningful());

        aggregate.venues[0].total = 1;
        assert!(aggregate.is_meaningful());
        assert_eq!(aggregate.venue("Nature").map(|t| t.total), Some(1));
        assert!(aggregate.venue("Science").is_none());
    }

    #[test]
    fn test_record_status_serialization() {
        let record = ProfileRecord::placeholder(
            Candidate::new("7", "Jane Doe"),
            PlaceholderReason::LikelyBlocked,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "placeholder");
        assert_eq!(json["reason"], "likely_blocked");
        assert!(record.is_placeholder());
    }
}
