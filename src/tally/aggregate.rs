//! Folding page tallies into a profile aggregate.

use super::page::{tally_page, PageTally};
use crate::matching::{NameError, VenueMatcher};
use crate::models::{ProfileAggregate, VenueTally};
use crate::pagination::FetchedPage;
use crate::sources::scholar::ParsedPage;

/// Running totals for one profile. Create one per profile.
#[derive(Debug)]
pub struct ProfileAggregator<'m> {
    matcher: &'m VenueMatcher,
    candidate_name: String,
    aggregate: ProfileAggregate,
}

impl<'m> ProfileAggregator<'m> {
    pub fn new(matcher: &'m VenueMatcher, candidate_name: impl Into<String>) -> Self {
        let aggregate = ProfileAggregate {
            venues: matcher.venues().iter().map(VenueTally::new).collect(),
            ..Default::default()
        };
        Self {
            matcher,
            candidate_name: candidate_name.into(),
            aggregate,
        }
    }

    /// Fold a fetched page, reusing the extraction done while paging
    pub fn add_page(&mut self, page: &FetchedPage) -> Result<PageTally, NameError> {
        self.add_parsed(&page.parsed)
    }

    /// Fold an already extracted page.
    ///
    /// Front matter is taken from the first folded page only; later pages
    /// never overwrite it.
    pub fn add_parsed(&mut self, parsed: &ParsedPage) -> Result<PageTally, NameError> {
        let tally = tally_page(&parsed.entries, self.matcher, &self.candidate_name)?;

        if self.aggregate.pages == 0 {
            if let Some(front) = &parsed.front_matter {
                self.aggregate.front_matter = front.clone();
            }
        }

        for (total, page) in self.aggregate.venues.iter_mut().zip(&tally.venues) {
            total.absorb(page);
        }
        self.aggregate.article_count += tally.entries;
        self.aggregate.authored_count += tally.authored;
        self.aggregate.details.extend(tally.details.iter().cloned());
        self.aggregate.pages += 1;

        tracing::info!(
            "Page {}: {} publications, {} in listed venues",
            self.aggregate.pages,
            tally.entries,
            tally.matched()
        );

        Ok(tally)
    }

    pub fn finish(self) -> ProfileAggregate {
        tracing::info!(
            "Profile total: {} publications over {} page(s), {} in listed venues, {} authored",
            self.aggregate.article_count,
            self.aggregate.pages,
            self.aggregate.venue_total(),
            self.aggregate.authored_count
        );
        self.aggregate
    }
}
