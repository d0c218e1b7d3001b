//! Operator decision on a suspected block.

use async_trait::async_trait;

use crate::models::Candidate;
use crate::pagination::PaginationOutcome;

/// What to do after a profile produced no pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDecision {
    /// Pause briefly and move on to the next candidate
    Continue,
    /// Stop the batch, keeping the checkpoint at this candidate
    Halt,
}

/// Asked once per likely-blocked profile.
#[async_trait]
pub trait BlockPrompt: Send + Sync {
    async fn on_suspected_block(
        &self,
        candidate: &Candidate,
        outcome: &PaginationOutcome,
    ) -> BlockDecision;
}

/// Always answers with the same decision, for unattended runs and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedDecision(pub BlockDecision);

#[async_trait]
impl BlockPrompt for FixedDecision {
    async fn on_suspected_block(
        &self,
        candidate: &Candidate,
        outcome: &PaginationOutcome,
    ) -> BlockDecision {
        tracing::info!(
            "Suspected block on {} ({}); answering {:?}",
            candidate.name,
            outcome.reason,
            self.0
        );
        self.0
    }
}
