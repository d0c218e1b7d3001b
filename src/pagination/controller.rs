//! Paging through one profile while staying under the block radar.
//!
//! Per page the controller requests the list-works URL and then:
//!
//! - transport error, HTTP 429/503 or a block-marker page: count an attempt
//!   and back off `base × 2^(attempts-1)`; past the retry ceiling the
//!   profile ends as `Blocked` / `TransportError`
//! - any other non-200 status: end as `UnexpectedStatus`
//! - missing results table: end as `StructuralAbsence`; zero rows ends as
//!   `Exhausted`, except on the first page where it is `StructuralAbsence`
//! - fewer rows than the page size: yield the page and end as `Exhausted`
//!
//! Between successful pages it waits a randomized interval. A profile that
//! ends before yielding any page is reported as likely blocked.

use futures_util::stream::BoxStream;
use serde::Serialize;
use tokio::time::sleep;
use url::Url;

use super::block::looks_like_block_page;
use crate::config::PaginationConfig;
use crate::sources::scholar::{list_works_url, parse_page, ParsedPage};
use crate::sources::PageFetcher;
use crate::utils::{BackoffPolicy, JitteredDelay, RetryCause};

/// Why pagination of a profile stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    /// Last page reached or page cap hit
    Exhausted,
    /// Retry ceiling exceeded on 429/503 or block-marker pages
    Blocked,
    /// Results table missing (or empty on the first page)
    StructuralAbsence,
    /// Retry ceiling exceeded on network failures
    TransportError,
    /// A status other than 200, 429 or 503
    UnexpectedStatus(u16),
}

impl std::fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalReason::Exhausted => write!(f, "exhausted"),
            TerminalReason::Blocked => write!(f, "blocked"),
            TerminalReason::StructuralAbsence => write!(f, "no results table"),
            TerminalReason::TransportError => write!(f, "transport error"),
            TerminalReason::UnexpectedStatus(status) => write!(f, "HTTP {}", status),
        }
    }
}

/// Mutable paging state for one profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFetchState {
    /// Row offset of the next page (`cstart`)
    pub cursor: usize,
    pub pages_fetched: usize,
    /// Failed attempts on the current page
    pub block_attempts: u32,
    /// Set once pagination has stopped
    pub terminal: Option<TerminalReason>,
}

/// A clean page: the raw body (for caching) and its extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// 0-based page index within the profile
    pub index: usize,
    pub url: Url,
    pub body: String,
    pub parsed: ParsedPage,
}

impl FetchedPage {
    /// Rows in the results table
    pub fn rows(&self) -> usize {
        self.parsed.rows
    }
}

/// How a profile's pagination ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationOutcome {
    pub pages: usize,
    pub reason: TerminalReason,
}

impl PaginationOutcome {
    /// No page was ever produced, which usually means the profile was blocked
    pub fn likely_blocked(&self) -> bool {
        self.pages == 0
    }
}

/// Lazy, finite page sequence for one profile.
#[derive(Debug)]
pub struct ProfilePager<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    base: Url,
    page_size: usize,
    max_pages: usize,
    backoff: BackoffPolicy,
    page_delay: JitteredDelay,
    state: ProfileFetchState,
    pace_before_next: bool,
}

impl<'a, F: PageFetcher + ?Sized> ProfilePager<'a, F> {
    pub fn new(fetcher: &'a F, base: Url, config: &PaginationConfig) -> Self {
        Self {
            fetcher,
            base,
            page_size: config.page_size.max(1),
            max_pages: config.max_pages,
            backoff: BackoffPolicy::new(config.backoff_base(), config.max_block_retries),
            page_delay: config.page_delay.jittered(),
            state: ProfileFetchState::default(),
            pace_before_next: false,
        }
    }

    pub fn state(&self) -> &ProfileFetchState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.terminal.is_some()
    }

    /// Final result, available once the sequence has ended
    pub fn outcome(&self) -> Option<PaginationOutcome> {
        self.state.terminal.map(|reason| PaginationOutcome {
            pages: self.state.pages_fetched,
            reason,
        })
    }

    fn finish(&mut self, reason: TerminalReason) -> Option<FetchedPage> {
        tracing::debug!(
            "Pagination of {} ended after {} page(s): {}",
            self.base,
            self.state.pages_fetched,
            reason
        );
        self.state.terminal = Some(reason);
        None
    }

    /// Fetch the next clean page, or `None` once pagination has ended
    pub async fn next_page(&mut self) -> Option<FetchedPage> {
        if self.state.terminal.is_some() {
            return None;
        }
        if self.state.pages_fetched >= self.max_pages {
            tracing::info!("Reached the limit of {} pages", self.max_pages);
            return self.finish(TerminalReason::Exhausted);
        }

        if self.pace_before_next {
            self.pace_before_next = false;
            let waited = self.page_delay.wait().await;
            tracing::debug!("Waited {:.1} seconds before next page", waited.as_secs_f64());
        }

        let url = list_works_url(&self.base, self.state.cursor, self.page_size);
        tracing::info!(
            "Loading publications page {} (cstart={})",
            self.state.pages_fetched + 1,
            self.state.cursor
        );

        self.state.block_attempts = 0;
        let body = loop {
            let cause = match self.fetcher.fetch(&url).await {
                Err(e) => RetryCause::Transport(e.to_string()),
                Ok(response) => {
                    if let Some(cause) = RetryCause::from_status(response.status) {
                        cause
                    } else if response.status != 200 {
                        tracing::warn!("HTTP {} for {}, stopping", response.status, url);
                        return self.finish(TerminalReason::UnexpectedStatus(response.status));
                    } else if looks_like_block_page(&response.body) {
                        RetryCause::BlockPage
                    } else {
                        break response.body;
                    }
                }
            };

            self.state.block_attempts += 1;
            tracing::warn!("{} (attempt {})", cause, self.state.block_attempts);

            if self.backoff.exhausted(self.state.block_attempts) {
                tracing::warn!("Too many failed attempts for this page, stopping pagination");
                let reason = if cause.is_block() {
                    TerminalReason::Blocked
                } else {
                    TerminalReason::TransportError
                };
                return self.finish(reason);
            }

            let delay = self.backoff.delay_for(self.state.block_attempts);
            tracing::info!("Backing off for {:.1} seconds before retrying", delay.as_secs_f64());
            sleep(delay).await;
        };

        let first_page = self.state.pages_fetched == 0;
        let parsed = match parse_page(&body, first_page) {
            None => {
                tracing::warn!("No publications table found, stopping");
                return self.finish(TerminalReason::StructuralAbsence);
            }
            Some(parsed) if parsed.rows == 0 && first_page => {
                tracing::warn!("No publication rows on the first page, stopping");
                return self.finish(TerminalReason::StructuralAbsence);
            }
            Some(parsed) if parsed.rows == 0 => {
                tracing::info!("No further publication rows");
                return self.finish(TerminalReason::Exhausted);
            }
            Some(parsed) => parsed,
        };
        let rows = parsed.rows;

        tracing::info!("Found {} publication rows on this page", rows);
        let page = FetchedPage {
            index: self.state.pages_fetched,
            url,
            body,
            parsed,
        };
        self.state.pages_fetched += 1;

        if rows < self.page_size {
            tracing::info!("Last page detected (fewer than {} rows)", self.page_size);
            self.state.terminal = Some(TerminalReason::Exhausted);
        } else {
            self.state.cursor += self.page_size;
            self.pace_before_next = true;
        }

        Some(page)
    }

    /// The remaining pages as a stream; check [`outcome`](Self::outcome) after it ends
    pub fn pages(&mut self) -> BoxStream<'_, FetchedPage> {
        Box::pin(async_stream::stream! {
            while let Some(page) = self.next_page().await {
                yield page;
            }
        })
    }
}
