//! Proposal skeleton synthesis.
//!
//! Each round is an independent completion call whose output is repaired into a
//! [`ProposalSkeleton`]. Rounds run one after another and the first failure
//! aborts the batch: a skeleton that could not be produced cannot be drafted, so
//! no drafting work is spent on a partial batch.

pub mod repair;

use std::ops::RangeInclusive;
use std::sync::Arc;

use thiserror::Error;

pub use repair::{parse_skeleton, ParseError};

use crate::llm::{CompletionClient, GenerationParams, UpstreamError};
use crate::models::{EvidenceHit, ProposalSkeleton};
use crate::retrieval::render_evidence;

pub const DEFAULT_KEY_POINTS: RangeInclusive<usize> = 10..=12;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Round {round} failed: {source}")]
    Upstream {
        round: usize,
        #[source]
        source: UpstreamError,
    },

    #[error("Round {round} produced unusable output: {source}")]
    Parse {
        round: usize,
        #[source]
        source: ParseError,
    },
}

pub struct ProposalSynthesizer {
    client: Arc<dyn CompletionClient>,
    params: GenerationParams,
    key_points: RangeInclusive<usize>,
}

impl ProposalSynthesizer {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            params: GenerationParams::default(),
            key_points: DEFAULT_KEY_POINTS,
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_key_points(mut self, key_points: RangeInclusive<usize>) -> Self {
        self.key_points = key_points;
        self
    }

    /// Produce `rounds` skeletons, failing on the first round that errors.
    pub async fn synthesize(
        &self,
        requirements: &str,
        evidence: &[EvidenceHit],
        rounds: usize,
    ) -> Result<Vec<ProposalSkeleton>, SynthesisError> {
        let evidence_text = render_evidence(evidence);
        let mut skeletons = Vec::with_capacity(rounds);

        for round in 1..=rounds {
            let prompt = self.prompt(requirements, &evidence_text, round, rounds);
            let raw = self
                .client
                .complete(&prompt, self.params)
                .await
                .map_err(|source| SynthesisError::Upstream { round, source })?;

            let skeleton = parse_skeleton(&raw).map_err(|source| {
                tracing::error!(round, raw = %source.raw, "Unparseable skeleton output");
                SynthesisError::Parse { round, source }
            })?;

            if !self.key_points.contains(&skeleton.key_points.len()) {
                tracing::warn!(
                    round,
                    key_points = skeleton.key_points.len(),
                    expected = ?self.key_points,
                    "Skeleton key point count outside expected range"
                );
            }
            tracing::debug!(round, title = %skeleton.title, "Synthesized skeleton");
            skeletons.push(skeleton);
        }

        Ok(skeletons)
    }

    fn prompt(&self, requirements: &str, evidence_text: &str, round: usize, rounds: usize) -> String {
        let evidence_text = if evidence_text.is_empty() {
            "(no reference evidence available)"
        } else {
            evidence_text
        };
        format!(
            "You are a proposal requirement analyzer. Given these requirements:\n'{requirements}'\n\
             Use the following evidence snippets:\n{evidence_text}\n\n\
             This is proposal variant {round} of {rounds}.\n\
             Produce ONE proposal outline as a JSON object with fields: \
             \"title\" (string), \"summary\" (string), \
             \"key_points\" (array of {min} to {max} strings).\n\
             Return ONLY the JSON object.",
            min = self.key_points.start(),
            max = self.key_points.end(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays scripted outputs and records prompts.
    struct Scripted {
        outputs: Mutex<Vec<Result<String, UpstreamError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(outputs: Vec<Result<String, UpstreamError>>) -> Arc<Self> {
            Arc::new(Self {
                outputs: Mutex::new(outputs.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for Scripted {
        async fn complete(
            &self,
            prompt: &str,
            _params: GenerationParams,
        ) -> Result<String, UpstreamError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.outputs
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(UpstreamError::EmptyResponse))
        }
    }

    fn skeleton_json(title: &str) -> String {
        format!(r#"{{"title": "{title}", "summary": "Summary", "key_points": ["one", "two"]}}"#)
    }

    fn hit() -> EvidenceHit {
        EvidenceHit {
            id: "r7".into(),
            title: "Cloud Deployment Guide".into(),
            snippet: "Deploy with containers".into(),
            score: 0.4,
        }
    }

    #[tokio::test]
    async fn produces_one_skeleton_per_round_in_order() {
        let client = Scripted::new(vec![Ok(skeleton_json("A")), Ok(skeleton_json("B"))]);
        let synth = ProposalSynthesizer::new(client.clone());

        let skeletons = synth.synthesize("Build it", &[hit()], 2).await.unwrap();
        let titles: Vec<_> = skeletons.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(client.prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn prompt_embeds_requirements_and_rendered_evidence() {
        let client = Scripted::new(vec![Ok(skeleton_json("A"))]);
        let synth = ProposalSynthesizer::new(client.clone()).with_key_points(3..=5);

        synth.synthesize("Track pallets", &[hit()], 1).await.unwrap();
        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].contains("'Track pallets'"));
        assert!(prompts[0].contains("[r7] Cloud Deployment Guide: Deploy with containers"));
        assert!(prompts[0].contains("3 to 5 strings"));
    }

    #[tokio::test]
    async fn parse_failure_aborts_remaining_rounds() {
        let client = Scripted::new(vec![
            Ok("not json at all".to_string()),
            Ok(skeleton_json("B")),
        ]);
        let synth = ProposalSynthesizer::new(client.clone());

        let err = synth.synthesize("Build it", &[], 2).await.unwrap_err();
        assert!(matches!(err, SynthesisError::Parse { round: 1, .. }));
        assert_eq!(client.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upstream_failure_in_later_round_discards_earlier_skeletons() {
        let client = Scripted::new(vec![
            Ok(skeleton_json("A")),
            Err(UpstreamError::RateLimited("quota".into())),
        ]);
        let synth = ProposalSynthesizer::new(client);

        let err = synth.synthesize("Build it", &[], 2).await.unwrap_err();
        assert!(matches!(err, SynthesisError::Upstream { round: 2, .. }));
    }

    #[tokio::test]
    async fn empty_evidence_is_stated_in_prompt() {
        let client = Scripted::new(vec![Ok(skeleton_json("A"))]);
        ProposalSynthesizer::new(client.clone())
            .synthesize("Build it", &[], 1)
            .await
            .unwrap();
        assert!(client.prompts.lock().unwrap()[0].contains("no reference evidence"));
    }
}
