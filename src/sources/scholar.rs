//! Google Scholar profile pages.
//!
//! Profile URLs are canonicalized to `citations?user=<id>&hl=en` and paged
//! with `view_op=list_works&cstart=<offset>&pagesize=<n>`.
//!
//! Page layout relied on:
//!
//! - publications: `table#gsc_a_t`, one `tr.gsc_a_tr` per publication; the
//!   title cell holds the title link and two `div.gs_gray` lines (authors,
//!   then venue metadata); citations in `a.gsc_a_ac`, year in `span.gsc_a_h`
//! - header: `div#gsc_prf_in` (name), `div.gsc_prf_il` (affiliation),
//!   `div#gsc_prf_int a.gsc_prf_inta` (interests)
//! - summary: `table#gsc_rsb_st`, rows Citations / h-index / i10-index with
//!   "All" and "Since" columns
//!
//! The markup changes from time to time; everything here degrades to "not
//! found" rather than failing.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::{FrontMatter, MetricPair, PublicationBuilder, PublicationEntry};

const GOOGLE_SCHOLAR_CITATIONS_URL: &str = "https://scholar.google.com/citations";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static RESULTS_TABLE: Lazy<Selector> = Lazy::new(|| selector("table#gsc_a_t"));
static RESULT_ROW: Lazy<Selector> = Lazy::new(|| selector("tr.gsc_a_tr"));
static TITLE_CELL: Lazy<Selector> = Lazy::new(|| selector("td.gsc_a_t"));
static TITLE_LINK: Lazy<Selector> = Lazy::new(|| selector("a.gsc_a_at"));
static GRAY_LINE: Lazy<Selector> = Lazy::new(|| selector("div.gs_gray"));
static CITED_BY: Lazy<Selector> = Lazy::new(|| selector("a.gsc_a_ac"));
static YEAR: Lazy<Selector> = Lazy::new(|| selector("span.gsc_a_h"));
static NAME: Lazy<Selector> = Lazy::new(|| selector("div#gsc_prf_in"));
static INSTITUTION: Lazy<Selector> = Lazy::new(|| selector("div.gsc_prf_il"));
static INTERESTS: Lazy<Selector> = Lazy::new(|| selector("div#gsc_prf_int a.gsc_prf_inta"));
static METRIC_ROWS: Lazy<Selector> = Lazy::new(|| selector("table#gsc_rsb_st tr"));
static CELL: Lazy<Selector> = Lazy::new(|| selector("td"));

/// Extract the `user` query parameter from a profile link
pub fn user_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "user")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Canonical English profile URL for any link carrying a user id
pub fn sanitize_profile_url(url: &str) -> Option<Url> {
    let user_id = user_id_from_url(url)?;
    let mut canonical = Url::parse(GOOGLE_SCHOLAR_CITATIONS_URL).ok()?;
    canonical
        .query_pairs_mut()
        .append_pair("user", &user_id)
        .append_pair("hl", "en");
    Some(canonical)
}

/// URL of the publication list page starting at row `cstart`.
///
/// `view_op`, `cstart` and `pagesize` are replaced; other parameters are kept.
pub fn list_works_url(base: &Url, cstart: usize, pagesize: usize) -> Url {
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| !matches!(key.as_ref(), "view_op" | "cstart" | "pagesize"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = base.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs
            .append_pair("view_op", "list_works")
            .append_pair("cstart", &cstart.to_string())
            .append_pair("pagesize", &pagesize.to_string());
    }
    url
}

/// A list-works URL broken into (user id, cstart, pagesize)
pub fn page_location(url: &Url) -> Option<(String, usize, usize)> {
    let mut user = None;
    let mut cstart = 0;
    let mut pagesize = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "user" => user = Some(value.into_owned()),
            "cstart" => cstart = value.parse().ok()?,
            "pagesize" => pagesize = value.parse().ok(),
            _ => {}
        }
    }

    let pagesize = pagesize.filter(|&n: &usize| n > 0)?;
    Some((user?, cstart, pagesize))
}

/// Whitespace-collapsed text content of an element
fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    root.select(selector)
        .next()
        .map(text_of)
        .filter(|text| !text.is_empty())
}

fn parse_row(row: ElementRef<'_>) -> Option<PublicationEntry> {
    let cell = row.select(&TITLE_CELL).next()?;
    let gray: Vec<ElementRef<'_>> = cell.select(&GRAY_LINE).collect();
    if gray.len() < 2 {
        return None;
    }

    let title = first_text(cell, &TITLE_LINK).unwrap_or_default();
    let mut builder = PublicationBuilder::new(title, text_of(gray[1])).author_line(&text_of(gray[0]));

    if let Some(citations) = first_text(row, &CITED_BY).and_then(|t| t.parse().ok()) {
        builder = builder.citations(citations);
    }
    if let Some(year) = first_text(row, &YEAR).and_then(|t| t.parse().ok()) {
        builder = builder.year(year);
    }

    Some(builder.build())
}

fn parse_metric(cells: &[ElementRef<'_>]) -> MetricPair {
    let number = |i: usize| cells.get(i).and_then(|c| text_of(*c).parse().ok());
    MetricPair {
        all: number(1),
        since: number(2),
    }
}

fn front_matter_in(root: ElementRef<'_>) -> FrontMatter {
    let mut front = FrontMatter {
        name: first_text(root, &NAME),
        institution: first_text(root, &INSTITUTION),
        interests: root
            .select(&INTERESTS)
            .map(text_of)
            .filter(|t| !t.is_empty())
            .collect(),
        ..Default::default()
    };

    for row in root.select(&METRIC_ROWS) {
        let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
        let Some(label) = cells.first().map(|c| text_of(*c).to_lowercase()) else {
            continue;
        };

        if label.contains("citations") {
            front.citations = parse_metric(&cells);
        } else if label.contains("i10-index") {
            front.i10_index = parse_metric(&cells);
        } else if label.contains("h-index") {
            front.h_index = parse_metric(&cells);
        }
    }

    front
}

/// What extraction produced for one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Rows in the results table, including ones that yield no entry
    pub rows: usize,
    /// Entries in table order; rows without both the author and venue
    /// lines are skipped
    pub entries: Vec<PublicationEntry>,
    /// Only read from the first page of a profile
    pub front_matter: Option<FrontMatter>,
}

/// Parse a page body once: rows, entries and, when `first_page`, the front
/// matter. `None` when the results table is missing.
pub fn parse_page(body: &str, first_page: bool) -> Option<ParsedPage> {
    let document = Html::parse_document(body);
    let table = document.select(&RESULTS_TABLE).next()?;

    let mut rows = 0;
    let mut entries = Vec::new();
    for row in table.select(&RESULT_ROW) {
        rows += 1;
        entries.extend(parse_row(row));
    }

    Some(ParsedPage {
        rows,
        entries,
        front_matter: first_page.then(|| front_matter_in(document.root_element())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::fixture;

    #[test]
    fn test_user_id_from_url() {
        assert_eq!(
            user_id_from_url("https://scholar.google.com/citations?user=AbC123&hl=de"),
            Some("AbC123".to_string())
        );
        assert_eq!(user_id_from_url("https://scholar.google.com/citations?hl=en"), None);
        assert_eq!(user_id_from_url("not a url"), None);
        assert_eq!(user_id_from_url("https://scholar.google.com/citations?user="), None);
    }

    #[test]
    fn test_sanitize_profile_url() {
        let url = sanitize_profile_url(
            " https://scholar.google.co.uk/citations?hl=fr&user=XyZ&oi=ao ",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://scholar.google.com/citations?user=XyZ&hl=en"
        );
        assert!(sanitize_profile_url("https://example.com/profile").is_none());
    }

    #[test]
    fn test_list_works_url_overrides_paging() {
        let base = Url::parse(
            "https://scholar.google.com/citations?user=XyZ&hl=en&cstart=500&view_op=x",
        )
        .unwrap();
        let url = list_works_url(&base, 100, 100);
        assert_eq!(
            url.as_str(),
            "https://scholar.google.com/citations?user=XyZ&hl=en&view_op=list_works&cstart=100&pagesize=100"
        );
        assert_eq!(page_location(&url), Some(("XyZ".to_string(), 100, 100)));
    }

    #[test]
    fn test_page_location_requires_user_and_pagesize() {
        let url = Url::parse("https://scholar.google.com/citations?cstart=0&pagesize=10").unwrap();
        assert_eq!(page_location(&url), None);
        let url = Url::parse("https://scholar.google.com/citations?user=a&cstart=0").unwrap();
        assert_eq!(page_location(&url), None);
    }

    #[test]
    fn test_parse_page_counts_rows() {
        let rows = |body: &str| parse_page(body, false).map(|p| p.rows);
        assert_eq!(rows(&fixture::results_page(7)), Some(7));
        assert_eq!(rows(&fixture::results_page(0)), Some(0));
        assert_eq!(rows("<html><body>Nothing</body></html>"), None);
    }

    #[test]
    fn test_parse_entries() {
        let body = fixture::profile_page(
            &fixture::Profile::default(),
            &[
                fixture::Row::new("Deep Grasping", "J Smith, A Doe", "Nature 580 (7803), 123-125")
                    .citations(12)
                    .year(2020),
                fixture::Row::new("Untitled", "A Doe", "arXiv preprint arXiv:2001.00001"),
            ],
        );

        let entries = parse_page(&body, false).unwrap().entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Deep Grasping");
        assert_eq!(entries[0].authors, vec!["J Smith", "A Doe"]);
        assert_eq!(entries[0].venue, "Nature 580 (7803), 123-125");
        assert_eq!(entries[0].citations, 12);
        assert_eq!(entries[0].year, Some(2020));
        assert_eq!(entries[1].citations, 0);
        assert_eq!(entries[1].year, None);
    }

    #[test]
    fn test_rows_without_venue_line_are_skipped() {
        let body = r#"<table id="gsc_a_t"><tbody>
            <tr class="gsc_a_tr"><td class="gsc_a_t"><a class="gsc_a_at">Only title</a>
                <div class="gs_gray">J Smith</div></td></tr>
        </tbody></table>"#;
        let parsed = parse_page(body, false).unwrap();
        assert_eq!(parsed.rows, 1);
        assert!(parsed.entries.is_empty());
    }

    #[test]
    fn test_parse_front_matter() {
        let profile = fixture::Profile {
            name: Some("John Smith".to_string()),
            institution: Some("University of Somewhere".to_string()),
            interests: vec!["Robotics".to_string(), "Grasping".to_string()],
            citations: (Some(1234), Some(567)),
            h_index: (Some(20), Some(12)),
            i10_index: (Some(30), None),
        };
        let front = parse_page(&fixture::profile_page(&profile, &[]), true)
            .and_then(|p| p.front_matter)
            .unwrap();

        assert_eq!(front.name.as_deref(), Some("John Smith"));
        assert_eq!(front.institution.as_deref(), Some("University of Somewhere"));
        assert_eq!(front.interests, vec!["Robotics", "Grasping"]);
        assert_eq!(front.citations, MetricPair { all: Some(1234), since: Some(567) });
        assert_eq!(front.h_index, MetricPair { all: Some(20), since: Some(12) });
        assert_eq!(front.i10_index, MetricPair { all: Some(30), since: None });
    }

    #[test]
    fn test_parse_page_front_matter_only_first() {
        let body = fixture::profile_page(
            &fixture::Profile {
                name: Some("John Smith".to_string()),
                ..Default::default()
            },
            &[],
        );
        assert!(parse_page(&body, true).unwrap().front_matter.is_some());
        assert!(parse_page(&body, false).unwrap().front_matter.is_none());
    }
}
