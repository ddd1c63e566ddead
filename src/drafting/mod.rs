//! Concurrent drafting of synthesized skeletons.
//!
//! Every skeleton gets one collaborator call under its own timeout. All calls are
//! awaited; a failed call degrades that proposal to a placeholder draft instead
//! of failing the batch. Output order always matches skeleton order.

pub mod client;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

pub use client::{DraftCollaborator, DraftError, HttpDraftCollaborator, DEFAULT_DRAFT_URL};

use crate::models::{DraftRequest, DraftResult, Proposal, ProposalSkeleton};

/// The collaborator drafts every key point with its own model call, so allow
/// minutes rather than seconds.
pub const DEFAULT_DRAFT_TIMEOUT: Duration = Duration::from_secs(300);

pub struct DraftFanoutCoordinator {
    collaborator: Arc<dyn DraftCollaborator>,
    timeout: Duration,
}

impl DraftFanoutCoordinator {
    pub fn new(collaborator: Arc<dyn DraftCollaborator>) -> Self {
        Self {
            collaborator,
            timeout: DEFAULT_DRAFT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Draft every skeleton concurrently and merge each with its result.
    pub async fn expand(&self, skeletons: Vec<ProposalSkeleton>) -> Vec<Proposal> {
        let drafts = join_all(skeletons.iter().map(|s| self.draft_one(s))).await;

        skeletons
            .into_iter()
            .zip(drafts)
            .enumerate()
            .map(|(i, (skeleton, draft))| {
                let draft = draft.unwrap_or_else(|e| {
                    tracing::warn!(index = i, title = %skeleton.title, "Draft degraded: {}", e);
                    DraftResult::unavailable(e)
                });
                Proposal::merge(skeleton, draft)
            })
            .collect()
    }

    async fn draft_one(&self, skeleton: &ProposalSkeleton) -> Result<DraftResult, DraftError> {
        if skeleton.key_points.is_empty() {
            return Err(DraftError::NoKeyPoints);
        }

        let request = DraftRequest::from(skeleton);
        match tokio::time::timeout(self.timeout, self.collaborator.draft(&request)).await {
            Ok(result) => result,
            Err(_) => Err(DraftError::Timeout(self.timeout)),
        }
    }
}
