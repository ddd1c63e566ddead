#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use requirement_analyzer::corpus::DocumentCorpus;
use requirement_analyzer::drafting::{DraftCollaborator, DraftError, DraftFanoutCoordinator};
use requirement_analyzer::llm::{CompletionClient, GenerationParams, UpstreamError};
use requirement_analyzer::models::*;
use requirement_analyzer::orchestrator::AnalyzeOrchestrator;
use requirement_analyzer::retrieval::{
    EvidenceRetriever, IndexedCorpus, DEFAULT_MAX_FEATURES,
};
use requirement_analyzer::synthesis::ProposalSynthesizer;

pub const WAREHOUSE_REQUIREMENTS: &str = "Build an inventory tracking web app for a warehouse";

pub fn reference_corpus() -> DocumentCorpus {
    DocumentCorpus::new(vec![
        Document::new(
            "hr-001",
            "Payroll Handbook",
            "Payroll processing rules for salaried employees and contractors.",
        ),
        Document::new(
            "ops-014",
            "Cloud Deployment Guide",
            "Deployment checklist for shipping a web app to the cloud: container images, \
             blue-green deployment, and monitoring for warehouse and inventory systems.",
        ),
        Document::new(
            "mk-203",
            "Marketing Analytics Brief",
            "Campaign attribution dashboards and funnel analytics.",
        ),
    ])
    .expect("valid corpus")
}

pub fn indexed(corpus: DocumentCorpus) -> Arc<IndexedCorpus> {
    Arc::new(IndexedCorpus::build(corpus, DEFAULT_MAX_FEATURES))
}

pub fn skeleton_json(title: &str) -> String {
    format!(
        r#"{{"title": "{title}", "summary": "Summary of {title}", "key_points": ["Scope", "Architecture", "Rollout"]}}"#
    )
}

/// Completion client that replays scripted outputs in order and records prompts.
pub struct ScriptedCompletion {
    outputs: Mutex<VecDeque<Result<String, UpstreamError>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new(outputs: Vec<Result<String, UpstreamError>>) -> Arc<Self> {
        Arc::new(Self {
            outputs: Mutex::new(outputs.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn ok(outputs: &[String]) -> Arc<Self> {
        Self::new(outputs.iter().cloned().map(Ok).collect())
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(
        &self,
        prompt: &str,
        _params: GenerationParams,
    ) -> Result<String, UpstreamError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.outputs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(UpstreamError::EmptyResponse))
    }
}

/// Drafting collaborator that fails for any title containing "unlucky".
pub struct FakeDrafts {
    pub requests: Mutex<Vec<DraftRequest>>,
}

impl FakeDrafts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl DraftCollaborator for FakeDrafts {
    async fn draft(&self, request: &DraftRequest) -> Result<DraftResult, DraftError> {
        self.requests.lock().unwrap().push(request.clone());
        if request.title.contains("unlucky") {
            return Err(DraftError::Status {
                status: 503,
                body: "draft service down".to_string(),
            });
        }
        Ok(DraftResult {
            sections: request
                .key_points
                .iter()
                .map(|kp| DraftSection {
                    title: kp.clone(),
                    content: format!("Details on {}", kp),
                })
                .collect(),
            full_draft: format!("Full draft for {}", request.title),
            feedback: "No issues found.".to_string(),
        })
    }
}

pub fn orchestrator(
    corpus: DocumentCorpus,
    completion: Arc<ScriptedCompletion>,
    drafts: Arc<FakeDrafts>,
) -> AnalyzeOrchestrator {
    AnalyzeOrchestrator::new(
        EvidenceRetriever::new(indexed(corpus)),
        ProposalSynthesizer::new(completion),
        DraftFanoutCoordinator::new(drafts),
    )
}
