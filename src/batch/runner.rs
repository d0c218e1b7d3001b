//! Sequential processing of a candidate list.

use futures_util::StreamExt;
use serde::Serialize;
use std::path::PathBuf;
use url::Url;

use super::checkpoint::{Checkpoint, CheckpointError};
use super::prompt::{BlockDecision, BlockPrompt};
use crate::config::{Config, DelayConfig, PaginationConfig, RunMode};
use crate::matching::{check_name, NameError, VenueMatcher};
use crate::models::{Candidate, PlaceholderReason, ProfileRecord};
use crate::pagination::{PaginationOutcome, ProfilePager, TerminalReason};
use crate::sources::scholar::{sanitize_profile_url, user_id_from_url};
use crate::sources::{CacheError, PageCache, PageFetcher};
use crate::tally::ProfileAggregator;
use crate::utils::JitteredDelay;

/// Errors that stop a whole run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] NameError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Candidate range {start}..={end} is outside 1..={len}")]
    InvalidRange { start: usize, end: usize, len: usize },
}

/// 1-based inclusive slice of the candidate list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl CandidateRange {
    pub fn new(start: Option<usize>, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// Resolve to concrete bounds; `end` is clamped to the list length
    pub fn resolve(&self, len: usize) -> Result<(usize, usize), RunError> {
        let start = self.start.unwrap_or(1);
        let end = self.end.unwrap_or(len).min(len);
        if start == 0 || start > end {
            return Err(RunError::InvalidRange { start, end, len });
        }
        Ok((start, end))
    }
}

/// Result of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub records: Vec<ProfileRecord>,
    /// 1-based candidate number where the operator halted
    pub halted_at: Option<usize>,
    /// Candidates fully processed
    pub completed: usize,
}

enum Processed {
    Record(ProfileRecord),
    Blocked(ProfileRecord, PaginationOutcome),
    FetchedOnly,
}

/// Drives candidates one at a time through pagination and tallying.
pub struct BatchRunner<'a, F: PageFetcher + ?Sized> {
    config: &'a Config,
    fetcher: &'a F,
    matcher: &'a VenueMatcher,
    prompt: &'a dyn BlockPrompt,
    cache: Option<PageCache>,
    checkpoint: Option<PathBuf>,
}

impl<'a, F: PageFetcher + ?Sized> BatchRunner<'a, F> {
    pub fn new(
        config: &'a Config,
        fetcher: &'a F,
        matcher: &'a VenueMatcher,
        prompt: &'a dyn BlockPrompt,
    ) -> Self {
        let cache = match config.mode {
            RunMode::FetchOnly => Some(PageCache::new(&config.paths.cache_dir)),
            RunMode::Normal if config.paths.cache_pages => {
                Some(PageCache::new(&config.paths.cache_dir))
            }
            _ => None,
        };

        Self {
            config,
            fetcher,
            matcher,
            prompt,
            cache,
            checkpoint: Some(config.paths.checkpoint.clone()),
        }
    }

    /// Override where page bodies are cached; `None` disables caching
    pub fn with_cache(mut self, cache: Option<PageCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Override the checkpoint file; `None` disables checkpointing
    pub fn with_checkpoint(mut self, path: Option<PathBuf>) -> Self {
        self.checkpoint = path;
        self
    }

    fn pagination(&self) -> PaginationConfig {
        match self.config.mode {
            RunMode::Offline => self.config.pagination.unpaced(),
            _ => self.config.pagination.clone(),
        }
    }

    fn profile_delay(&self) -> JitteredDelay {
        match self.config.mode {
            RunMode::Offline => DelayConfig::NONE.jittered(),
            _ => self.config.batch.profile_delay.jittered(),
        }
    }

    fn save_checkpoint(&self, next_candidate: usize, last_id: Option<&str>) -> Result<(), RunError> {
        if let Some(path) = &self.checkpoint {
            Checkpoint::new(next_candidate, last_id.map(str::to_string)).save(path)?;
        }
        Ok(())
    }

    /// Process `candidates[range]` in order.
    ///
    /// Every selected name is checked up front so a name the attribution
    /// heuristic cannot handle fails the run before any request is made.
    pub async fn run(
        &self,
        candidates: &[Candidate],
        range: CandidateRange,
    ) -> Result<BatchReport, RunError> {
        let (start, end) = range.resolve(candidates.len())?;
        let selected = &candidates[start - 1..end];

        for candidate in selected {
            check_name(&candidate.name)?;
        }
        if let Some(cache) = &self.cache {
            cache.ensure_dir()?;
        }

        tracing::info!(
            "Processing candidates {}..={} of {} in {:?} mode via {}",
            start,
            end,
            candidates.len(),
            self.config.mode,
            self.fetcher.id()
        );

        let profile_delay = self.profile_delay();
        let mut report = BatchReport::default();
        let mut last_id: Option<&str> = None;

        for (offset, candidate) in selected.iter().enumerate() {
            let number = start + offset;

            if offset > 0 {
                let waited = profile_delay.wait().await;
                tracing::debug!("Waited {:.1} seconds before next profile", waited.as_secs_f64());
            }

            tracing::info!(
                "[{}/{}] {} ({})",
                number,
                end,
                candidate.name,
                candidate.id
            );

            match self.process(candidate).await? {
                Processed::Record(record) => report.records.push(record),
                Processed::FetchedOnly => {}
                Processed::Blocked(record, outcome) => {
                    tracing::warn!(
                        "No pages produced for {} ({}); likely blocked",
                        candidate.name,
                        outcome.reason
                    );
                    if self.config.mode.produces_records() {
                        report.records.push(record);
                    }

                    if self.config.mode.uses_network() {
                        match self.prompt.on_suspected_block(candidate, &outcome).await {
                            BlockDecision::Halt => {
                                tracing::warn!("Halting at candidate {}", number);
                                self.save_checkpoint(number, last_id)?;
                                report.halted_at = Some(number);
                                return Ok(report);
                            }
                            BlockDecision::Continue => {
                                let pause = self.config.batch.resume_pause();
                                tracing::info!("Continuing after {:.1} seconds", pause.as_secs_f64());
                                tokio::time::sleep(pause).await;
                            }
                        }
                    }
                }
            }

            report.completed += 1;
            last_id = Some(candidate.id.as_str());
            self.save_checkpoint(number + 1, last_id)?;
        }

        tracing::info!(
            "Batch finished: {} candidate(s), {} placeholder record(s)",
            report.completed,
            report.records.iter().filter(|r| r.is_placeholder()).count()
        );

        Ok(report)
    }

    /// Continue from a saved checkpoint, or from the first candidate when
    /// there is none.
    ///
    /// A checkpoint pointing past the selected range means everything was
    /// already processed: the report is empty and nothing is requested.
    pub async fn resume(
        &self,
        candidates: &[Candidate],
        checkpoint: Option<&Checkpoint>,
        end: Option<usize>,
    ) -> Result<BatchReport, RunError> {
        let Some(checkpoint) = checkpoint else {
            tracing::warn!("No checkpoint found, starting from the beginning");
            return self.run(candidates, CandidateRange::new(None, end)).await;
        };

        let last = end.unwrap_or(candidates.len()).min(candidates.len());
        if checkpoint.next_candidate > last {
            tracing::info!(
                "All {} candidate(s) already processed (last completed: {})",
                last,
                checkpoint.last_completed_id.as_deref().unwrap_or("none")
            );
            return Ok(BatchReport::default());
        }

        tracing::info!(
            "Resuming at candidate {} (last completed: {})",
            checkpoint.next_candidate,
            checkpoint.last_completed_id.as_deref().unwrap_or("none")
        );
        self.run(
            candidates,
            CandidateRange::new(Some(checkpoint.next_candidate), end),
        )
        .await
    }

    async fn process(&self, candidate: &Candidate) -> Result<Processed, RunError> {
        let Some(raw_url) = candidate
            .profile_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
        else {
            tracing::warn!("No profile link for {}", candidate.name);
            return Ok(Processed::Record(ProfileRecord::placeholder(
                candidate.clone(),
                PlaceholderReason::MissingUrl,
            )));
        };

        let Some((url, user_id)) = sanitize_profile_url(raw_url)
            .and_then(|url| user_id_from_url(url.as_str()).map(|id| (url, id)))
        else {
            tracing::warn!("Profile link for {} has no user id: {}", candidate.name, raw_url);
            return Ok(Processed::Record(ProfileRecord::placeholder(
                candidate.clone(),
                PlaceholderReason::InvalidUrl,
            )));
        };

        tracing::info!("Profile URL: {}", url);
        self.paginate(candidate, url, &user_id).await
    }

    async fn paginate(
        &self,
        candidate: &Candidate,
        url: Url,
        user_id: &str,
    ) -> Result<Processed, RunError> {
        let pagination = self.pagination();
        let mut pager = ProfilePager::new(self.fetcher, url.clone(), &pagination);
        let mut aggregator = self
            .config
            .mode
            .produces_records()
            .then(|| ProfileAggregator::new(self.matcher, candidate.name.as_str()));

        {
            let mut pages = pager.pages();
            while let Some(page) = pages.next().await {
                tracing::debug!("{} page {}: {} rows", user_id, page.index + 1, page.rows());
                if let Some(cache) = &self.cache {
                    cache.store(user_id, page.index + 1, &page.body)?;
                }
                if let Some(aggregator) = aggregator.as_mut() {
                    aggregator.add_page(&page)?;
                }
            }
        }

        let outcome = pager.outcome().unwrap_or(PaginationOutcome {
            pages: pager.state().pages_fetched,
            reason: TerminalReason::Exhausted,
        });

        if outcome.likely_blocked() {
            let record = ProfileRecord {
                profile_url: Some(url.to_string()),
                ..ProfileRecord::placeholder(candidate.clone(), PlaceholderReason::LikelyBlocked)
            };
            return Ok(Processed::Blocked(record, outcome));
        }

        let Some(aggregator) = aggregator else {
            tracing::info!("Cached {} page(s) for {}", outcome.pages, candidate.name);
            return Ok(Processed::FetchedOnly);
        };

        let aggregate = aggregator.finish();
        if !aggregate.is_meaningful() {
            tracing::warn!("No meaningful data for {}", candidate.name);
            let record = ProfileRecord {
                profile_url: Some(url.to_string()),
                ..ProfileRecord::placeholder(candidate.clone(), PlaceholderReason::NoMeaningfulData)
            };
            return Ok(Processed::Record(record));
        }

        Ok(Processed::Record(ProfileRecord::scraped(
            candidate.clone(),
            url.to_string(),
            aggregate,
        )))
    }
}
