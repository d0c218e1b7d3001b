//! Initialed author names against a candidate's full name.
//!
//! Profile pages list authors as initials plus surname ("J Smith",
//! "AB van der Berg"). The candidate is known by a full name ("John Smith").
//! The full name is rebuilt into its initialed form and compared exactly,
//! ignoring case. There is no diacritic, nickname or fuzzy tolerance.

use crate::models::PublicationEntry;

/// Names the initials/surname heuristic refuses to handle.
///
/// Raised for any name with more than one hyphen. This aborts the whole run
/// since a wrong surname boundary would skew every attribution after it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("name '{name}' contains more than one hyphen; cannot locate the surname")]
    TooManyHyphens { name: String },
}

/// Reject names with more than one hyphen
pub fn check_name(name: &str) -> Result<(), NameError> {
    if name.matches('-').count() > 1 {
        return Err(NameError::TooManyHyphens {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Rebuild `full_name` as "INITIALS Surname".
///
/// Walks the given names right to left. Tokens that are not purely
/// alphabetic are skipped, lowercase tokens (particles such as "van", "de")
/// join the surname, capitalized tokens contribute their first letter.
/// `surname_words` lets the first capitalized tokens left of the last word
/// join the surname too, for surnames like "Van Der Berg".
fn initialled_form(full_name: &str, surname_words: usize) -> String {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    let Some((last, given)) = tokens.split_last() else {
        return String::new();
    };

    let mut surname: Vec<&str> = vec![last];
    let mut initials = String::new();

    for token in given.iter().rev() {
        if !token.chars().all(char::is_alphabetic) {
            continue;
        }
        let Some(first) = token.chars().next() else {
            continue;
        };

        if first.is_lowercase() {
            surname.insert(0, token);
        } else if first.is_uppercase() {
            if initials.is_empty() && surname.len() < surname_words {
                surname.insert(0, token);
            } else {
                initials.insert(0, first);
            }
        }
    }

    format!("{} {}", initials, surname.join(" "))
}

/// Lowercase, optionally turn hyphens into spaces, collapse whitespace.
fn comparable(name: &str, split_hyphens: bool) -> String {
    let name = if split_hyphens {
        name.replace('-', " ")
    } else {
        name.to_string()
    };
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Decide whether the initialed author token denotes the person `full_name`.
///
/// ```
/// use scholar_tally::matching::classify;
///
/// assert!(classify("J Smith", "John Smith").unwrap());
/// assert!(!classify("J Smith", "Jane Doe").unwrap());
/// assert!(classify("A-B-C Smith", "Anna Smith").is_err());
/// ```
pub fn classify(initialled: &str, full_name: &str) -> Result<bool, NameError> {
    check_name(initialled)?;
    check_name(full_name)?;

    let split_hyphens = initialled.contains('-') || full_name.contains('-');
    let target = comparable(initialled, split_hyphens);
    if target.is_empty() {
        return Ok(false);
    }

    if comparable(&initialled_form(full_name, 1), split_hyphens) == target {
        return Ok(true);
    }

    // Multi-word capitalized surnames: keep as many trailing words as the
    // initialed form shows after its initials.
    let surname_words = target.split(' ').count().saturating_sub(1);
    if surname_words > 1 {
        let rebuilt = comparable(&initialled_form(full_name, surname_words), split_hyphens);
        return Ok(rebuilt == target);
    }

    Ok(false)
}

/// Classification of one author token of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorshipRecord<'a> {
    pub entry: &'a PublicationEntry,
    /// 1-based position in the author list
    pub ordinal: usize,
    pub author: &'a str,
    pub matched: bool,
}

/// Classify every author token of `entry` in list order
pub fn attribute<'a>(
    entry: &'a PublicationEntry,
    full_name: &str,
) -> Result<Vec<AuthorshipRecord<'a>>, NameError> {
    entry
        .authors
        .iter()
        .enumerate()
        .map(|(i, author)| {
            Ok(AuthorshipRecord {
                entry,
                ordinal: i + 1,
                author: author.as_str(),
                matched: classify(author, full_name)?,
            })
        })
        .collect()
}

/// How often the candidate matched at each counted position.
///
/// Positions are independent predicates: on a two-author paper a match at
/// ordinal 2 counts as both second and last author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionCounts {
    pub matches: usize,
    pub first: usize,
    pub second: usize,
    pub last: usize,
}

impl PositionCounts {
    pub fn from_records(records: &[AuthorshipRecord<'_>]) -> Self {
        let author_count = records.len();
        let mut counts = Self::default();

        for record in records.iter().filter(|r| r.matched) {
            counts.matches += 1;
            if record.ordinal == 1 {
                counts.first += 1;
            }
            if record.ordinal == 2 {
                counts.second += 1;
            }
            if record.ordinal == author_count {
                counts.last += 1;
            }
        }

        counts
    }

    pub fn is_author(&self) -> bool {
        self.matches > 0
    }
}
