//! Batch processing of candidate lists.
//!
//! A [`BatchRunner`] walks candidates strictly in order: one profile is fully
//! paginated and tallied before the next one starts, with a randomized pause
//! between profiles. Per-profile failures become placeholder records; only a
//! [`NameError`](crate::matching::NameError) or an IO failure on the cache or
//! checkpoint stops the run.
//!
//! When a profile produces no pages at all the [`BlockPrompt`] decides
//! whether to continue or halt. A [`Checkpoint`] is written after every
//! completed candidate and on halt, so a later run can resume.

mod checkpoint;
mod prompt;
mod runner;

pub use checkpoint::{Checkpoint, CheckpointError};
pub use prompt::{BlockDecision, BlockPrompt, FixedDecision};
pub use runner::{BatchReport, BatchRunner, CandidateRange, RunError};
