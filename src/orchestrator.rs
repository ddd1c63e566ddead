//! The analyze pipeline: retrieve evidence, synthesize skeletons, draft them.
//!
//! Failure policy differs by stage. Retrieval cannot fail (no evidence is still
//! evidence). Synthesis fails the whole request on the first bad round. Drafting
//! degrades per proposal. History notification is fire-and-forget.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::AnalyzerConfig;
use crate::drafting::{DraftFanoutCoordinator, DraftError, HttpDraftCollaborator};
use crate::llm::{OpenAiClient, UpstreamError};
use crate::models::Proposal;
use crate::notify::{HistoryNotifier, HistoryRecord};
use crate::retrieval::{EvidenceRetriever, IndexedCorpus};
use crate::synthesis::{ParseError, ProposalSynthesizer, SynthesisError};

/// Request-level failures of an analyze call.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("{0}")]
    Validation(String),

    #[error("Proposal generation failed in round {round}: {source}")]
    Upstream {
        round: usize,
        #[source]
        source: UpstreamError,
    },

    #[error("Proposal generation returned invalid output in round {round}: {source}")]
    Parse {
        round: usize,
        #[source]
        source: ParseError,
    },
}

impl From<SynthesisError> for AnalyzeError {
    fn from(e: SynthesisError) -> Self {
        match e {
            SynthesisError::Upstream { round, source } => Self::Upstream { round, source },
            SynthesisError::Parse { round, source } => Self::Parse { round, source },
        }
    }
}

/// Failures building the production pipeline from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Failed to create generation client: {0}")]
    Completion(#[from] UpstreamError),

    #[error("Failed to create draft client: {0}")]
    Draft(#[from] DraftError),
}

pub struct AnalyzeOrchestrator {
    retriever: EvidenceRetriever,
    synthesizer: ProposalSynthesizer,
    drafts: DraftFanoutCoordinator,
    notifier: HistoryNotifier,
    max_proposals: Option<usize>,
}

impl AnalyzeOrchestrator {
    pub fn new(
        retriever: EvidenceRetriever,
        synthesizer: ProposalSynthesizer,
        drafts: DraftFanoutCoordinator,
    ) -> Self {
        Self {
            retriever,
            synthesizer,
            drafts,
            notifier: HistoryNotifier::disabled(),
            max_proposals: None,
        }
    }

    /// Wire the HTTP-backed pipeline described by `config` around a built index.
    pub fn from_config(
        config: &AnalyzerConfig,
        indexed: Arc<IndexedCorpus>,
    ) -> Result<Self, SetupError> {
        if config.llm_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set, generation calls will likely be rejected");
        }

        let completion = OpenAiClient::new(
            config.llm_url.clone(),
            config.llm_api_key.clone(),
            config.llm_model.clone(),
            config.llm_timeout(),
        )?;
        let collaborator =
            HttpDraftCollaborator::new(config.draft_url.clone(), config.draft_timeout())?;

        let retriever = EvidenceRetriever::new(indexed)
            .with_top_k(config.top_k)
            .with_snippet_chars(config.snippet_chars);
        let synthesizer = ProposalSynthesizer::new(Arc::new(completion))
            .with_params(config.generation_params())
            .with_key_points(config.key_points());
        let drafts =
            DraftFanoutCoordinator::new(Arc::new(collaborator)).with_timeout(config.draft_timeout());

        let orchestrator = Self::new(retriever, synthesizer, drafts)
            .with_notifier(HistoryNotifier::new(config.history_url.clone()));
        Ok(match config.max_proposals {
            Some(limit) => orchestrator.with_max_proposals(limit),
            None => orchestrator,
        })
    }

    pub fn with_notifier(mut self, notifier: HistoryNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Cap `num_proposals` per request. Uncapped unless set.
    pub fn with_max_proposals(mut self, max_proposals: usize) -> Self {
        self.max_proposals = Some(max_proposals.max(1));
        self
    }

    pub fn retriever(&self) -> &EvidenceRetriever {
        &self.retriever
    }

    /// Turn a requirements statement into `rounds` drafted proposals.
    pub async fn handle(
        &self,
        requirements: &str,
        rounds: usize,
    ) -> Result<Vec<Proposal>, AnalyzeError> {
        let span = tracing::info_span!("analyze", request_id = %Uuid::new_v4(), rounds);
        self.run(requirements, rounds).instrument(span).await
    }

    async fn run(&self, requirements: &str, rounds: usize) -> Result<Vec<Proposal>, AnalyzeError> {
        let requirements = requirements.trim();
        if requirements.is_empty() {
            return Err(AnalyzeError::Validation("requirements required".to_string()));
        }
        if rounds == 0 {
            return Err(AnalyzeError::Validation(
                "num_proposals must be at least 1".to_string(),
            ));
        }
        if let Some(limit) = self.max_proposals.filter(|&limit| rounds > limit) {
            return Err(AnalyzeError::Validation(format!(
                "num_proposals must be between 1 and {}",
                limit
            )));
        }

        let evidence = self.retriever.retrieve(requirements);
        tracing::debug!(hits = evidence.len(), "Retrieved evidence");

        let skeletons = self
            .synthesizer
            .synthesize(requirements, &evidence, rounds)
            .await?;

        let proposals = self.drafts.expand(skeletons).await;
        let degraded = proposals.iter().filter(|p| p.draft.is_placeholder()).count();
        tracing::info!(proposals = proposals.len(), degraded, "Analyze complete");

        self.record_history(requirements, &proposals);
        Ok(proposals)
    }

    /// Post a history record in the background; the response never waits on it.
    fn record_history(&self, requirements: &str, proposals: &[Proposal]) {
        let notifier = self.notifier.clone();
        let record = HistoryRecord {
            timestamp: Utc::now(),
            requirements: requirements.to_string(),
            proposal_titles: proposals.iter().map(|p| p.skeleton.title.clone()).collect(),
        };
        tokio::spawn(
            async move {
                notifier.notify(&record).await;
            }
            .in_current_span(),
        );
    }
}
