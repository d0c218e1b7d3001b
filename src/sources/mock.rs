//! Scripted fetcher and page fixtures for testing purposes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use url::Url;

use super::{FetchError, FetchResponse, PageFetcher};

/// A fetcher that replays queued responses in order and records every
/// requested URL. Once the queue is empty it answers 404.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<FetchResponse, FetchError>>>,
    requests: Mutex<Vec<Url>>,
}

impl ScriptedFetcher {
    /// Create a new scripted fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue any response.
    pub fn push(&self, response: Result<FetchResponse, FetchError>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Queue a 200 response.
    pub fn push_ok(&self, body: impl Into<String>) -> &Self {
        self.push(Ok(FetchResponse::ok(body)))
    }

    /// Queue a response with an arbitrary status.
    pub fn push_status(&self, status: u16, body: impl Into<String>) -> &Self {
        self.push(Ok(FetchResponse::new(status, body)))
    }

    /// Queue a transport failure.
    pub fn push_transport_error(&self, message: &str) -> &Self {
        self.push(Err(FetchError::Transport(message.to_string())))
    }

    /// URLs requested so far.
    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Responses still queued.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        self.requests.lock().unwrap().push(url.clone());
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(FetchResponse::new(404, "no scripted response")))
    }
}

/// HTML builders shaped like real profile pages.
pub mod fixture {
    /// One publication row
    #[derive(Debug, Clone)]
    pub struct Row {
        pub title: String,
        pub authors: String,
        pub venue: String,
        pub citations: Option<u32>,
        pub year: Option<u16>,
    }

    impl Row {
        pub fn new(title: &str, authors: &str, venue: &str) -> Self {
            Self {
                title: title.to_string(),
                authors: authors.to_string(),
                venue: venue.to_string(),
                citations: None,
                year: None,
            }
        }

        pub fn citations(mut self, citations: u32) -> Self {
            self.citations = Some(citations);
            self
        }

        pub fn year(mut self, year: u16) -> Self {
            self.year = Some(year);
            self
        }
    }

    /// Profile header and summary table
    #[derive(Debug, Clone, Default)]
    pub struct Profile {
        pub name: Option<String>,
        pub institution: Option<String>,
        pub interests: Vec<String>,
        pub citations: (Option<u32>, Option<u32>),
        pub h_index: (Option<u32>, Option<u32>),
        pub i10_index: (Option<u32>, Option<u32>),
    }

    fn metric_row(label: &str, values: (Option<u32>, Option<u32>)) -> String {
        let cell = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_default();
        format!(
            r#"<tr><td class="gsc_rsb_sc1"><a class="gsc_rsb_f">{}</a></td><td class="gsc_rsb_std">{}</td><td class="gsc_rsb_std">{}</td></tr>"#,
            label,
            cell(values.0),
            cell(values.1)
        )
    }

    fn row_html(row: &Row) -> String {
        format!(
            r#"<tr class="gsc_a_tr"><td class="gsc_a_t"><a class="gsc_a_at" href="javascript:void(0)">{}</a><div class="gs_gray">{}</div><div class="gs_gray">{}</div></td><td class="gsc_a_c"><a class="gsc_a_ac gs_ibl">{}</a></td><td class="gsc_a_y"><span class="gsc_a_h gsc_a_hc gs_ibl">{}</span></td></tr>"#,
            row.title,
            row.authors,
            row.venue,
            row.citations.map(|c| c.to_string()).unwrap_or_default(),
            row.year.map(|y| y.to_string()).unwrap_or_default()
        )
    }

    /// A full profile page with the given header and rows
    pub fn profile_page(profile: &Profile, rows: &[Row]) -> String {
        let mut header = String::new();
        if let Some(name) = &profile.name {
            header.push_str(&format!(r#"<div id="gsc_prf_in">{}</div>"#, name));
        }
        if let Some(institution) = &profile.institution {
            header.push_str(&format!(r#"<div class="gsc_prf_il">{}</div>"#, institution));
        }
        if !profile.interests.is_empty() {
            header.push_str(r#"<div id="gsc_prf_int">"#);
            for interest in &profile.interests {
                header.push_str(&format!(r#"<a class="gsc_prf_inta" href="javascript:void(0)">{}</a>"#, interest));
            }
            header.push_str("</div>");
        }

        let metrics = format!(
            r#"<table id="gsc_rsb_st"><thead><tr><th></th><th>All</th><th>Since 2020</th></tr></thead><tbody>{}{}{}</tbody></table>"#,
            metric_row("Citations", profile.citations),
            metric_row("h-index", profile.h_index),
            metric_row("i10-index", profile.i10_index)
        );

        let body: String = rows.iter().map(row_html).collect();

        format!(
            r#"<html><head><title>Profile</title></head><body>{}{}<table id="gsc_a_t"><tbody id="gsc_a_b">{}</tbody></table></body></html>"#,
            header, metrics, body
        )
    }

    /// A page with `rows` generic publication rows in an unlisted venue
    pub fn results_page(rows: usize) -> String {
        let rows: Vec<Row> = (0..rows)
            .map(|i| Row::new(&format!("Paper {}", i), "A Author, B Author", "Some Venue 1, 1-2"))
            .collect();
        profile_page(&Profile::default(), &rows)
    }

    /// A CAPTCHA interstitial
    pub fn block_page() -> String {
        "<html><body><h1>Please show you're not a robot</h1>\
         <p>Our systems have detected unusual traffic from your computer network.</p>\
         <form action=\"/sorry/index\"></form></body></html>"
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_then_404() {
        let fetcher = ScriptedFetcher::new();
        fetcher.push_ok("first").push_status(429, "").push_transport_error("reset");

        let url = Url::parse("https://example.com/a").unwrap();
        assert_eq!(fetcher.fetch(&url).await.unwrap().body, "first");
        assert_eq!(fetcher.fetch(&url).await.unwrap().status, 429);
        assert!(fetcher.fetch(&url).await.is_err());
        assert_eq!(fetcher.fetch(&url).await.unwrap().status, 404);
        assert_eq!(fetcher.request_count(), 4);
        assert_eq!(fetcher.remaining(), 0);
        assert_eq!(fetcher.id(), "scripted");
    }
}
