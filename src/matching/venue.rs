//! Venue name normalization, extraction and allow-list matching.
//!
//! Matching is exact equality on normalized names. A venue string that
//! extracts imprecisely produces a miss, never a wrong hit.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::models::PublicationEntry;

/// Start of the volume/issue/pages/year chunk that follows a venue title.
static METADATA_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s\d|\s\(\d|,\s*\d{1,4}").expect("valid boundary regex"));

/// Canonicalize a venue string: lowercase, drop ASCII punctuation,
/// collapse whitespace runs and trim.
pub fn normalize_venue(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Isolate the venue title from a metadata line such as
/// `"Nature, 580(7803), 123-125, 2020"`.
///
/// Titles containing digits without a comma before them are cut at the
/// first digit ("Journal of 3D Printing" becomes "Journal of").
pub fn extract_venue(raw: &str) -> &str {
    let s = raw.trim();
    match METADATA_BOUNDARY.find(s) {
        Some(m) => s[..m.start()].trim(),
        None => s,
    }
}

/// A publication whose venue resolved to an allow-listed name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VenueMatch<'a> {
    /// Position of the venue in the allow-list
    pub index: usize,
    /// Display form of the venue
    pub canonical: &'a str,
    /// The entry that matched
    pub entry: &'a PublicationEntry,
}

/// Exact-equality lookup from normalized names to allow-listed venues.
#[derive(Debug, Clone, Default)]
pub struct VenueMatcher {
    venues: Vec<String>,
    by_normalized: HashMap<String, usize>,
}

impl VenueMatcher {
    /// Build a matcher from canonical venue names in display order.
    ///
    /// When two names normalize to the same key the earlier one wins.
    pub fn new<I, S>(allow_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let venues: Vec<String> = allow_list.into_iter().map(Into::into).collect();
        let mut by_normalized = HashMap::with_capacity(venues.len());

        for (index, venue) in venues.iter().enumerate() {
            let key = normalize_venue(venue);
            if let Some(&existing) = by_normalized.get(&key) {
                tracing::warn!(
                    "Venue '{}' normalizes like '{}' and will never match",
                    venue,
                    venues[existing]
                );
                continue;
            }
            by_normalized.insert(key, index);
        }

        Self {
            venues,
            by_normalized,
        }
    }

    /// Canonical names in allow-list order
    pub fn venues(&self) -> &[String] {
        &self.venues
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    /// Resolve a raw venue metadata line to an allow-list index
    pub fn lookup(&self, raw: &str) -> Option<usize> {
        let key = normalize_venue(extract_venue(raw));
        self.by_normalized.get(&key).copied()
    }

    /// Resolve the venue of an entry
    pub fn match_entry<'a>(&'a self, entry: &'a PublicationEntry) -> Option<VenueMatch<'a>> {
        let index = self.lookup(&entry.venue)?;
        Some(VenueMatch {
            index,
            canonical: &self.venues[index],
            entry,
        })
    }
}
