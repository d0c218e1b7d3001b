//! Tallying the publication entries of a single page.

use crate::matching::{attribute, AuthorshipRecord, NameError, PositionCounts, VenueMatcher};
use crate::models::{PublicationEntry, VenueTally};

/// Counts and detail lines contributed by one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTally {
    /// One tally per allow-listed venue, in allow-list order
    pub venues: Vec<VenueTally>,
    /// Entries on the page
    pub entries: usize,
    /// Venue-matched entries where the candidate appears in the author list
    pub authored: usize,
    pub details: Vec<String>,
}

impl PageTally {
    fn empty(matcher: &VenueMatcher) -> Self {
        Self {
            venues: matcher.venues().iter().map(VenueTally::new).collect(),
            ..Default::default()
        }
    }

    /// Entries that resolved to an allow-listed venue
    pub fn matched(&self) -> usize {
        self.venues.iter().map(|t| t.total).sum()
    }
}

/// Render one venue-matched entry, with the candidate's author token in bold.
pub fn detail_line(entry: &PublicationEntry, records: &[AuthorshipRecord<'_>]) -> String {
    let authors: Vec<String> = records
        .iter()
        .map(|r| {
            if r.matched {
                format!("**{}**", r.author)
            } else {
                r.author.to_string()
            }
        })
        .collect();

    let year = entry.year.map(|y| y.to_string()).unwrap_or_else(|| "n.d.".to_string());

    format!(
        "{} | {} | {} | cited by {} | {}",
        authors.join(", "),
        entry.title,
        entry.venue,
        entry.citations,
        year
    )
}

/// Match every entry against the allow-list and attribute authorship for
/// `candidate_name` on the venue-matched ones.
///
/// Fails only when an author token or the candidate name has more than one
/// hyphen.
pub fn tally_page(
    entries: &[PublicationEntry],
    matcher: &VenueMatcher,
    candidate_name: &str,
) -> Result<PageTally, NameError> {
    let mut tally = PageTally::empty(matcher);
    tally.entries = entries.len();

    for entry in entries {
        let Some(venue_match) = matcher.match_entry(entry) else {
            continue;
        };

        let records = attribute(entry, candidate_name)?;
        let positions = PositionCounts::from_records(&records);

        let venue = &mut tally.venues[venue_match.index];
        venue.total += 1;
        venue.first_author += positions.first;
        venue.second_author += positions.second;
        venue.last_author += positions.last;

        if positions.is_author() {
            tally.authored += 1;
        }

        tracing::debug!(
            "Matched '{}' to {} (first={}, second={}, last={})",
            entry.title,
            venue_match.canonical,
            positions.first,
            positions.second,
            positions.last
        );
        tally.details.push(detail_line(entry, &records));
    }

    Ok(tally)
}
