use serde::{Deserialize, Serialize};

/// Structured proposal outline produced by one synthesis round.
///
/// The configured key point range is a prompt hint only; skeletons with fewer or
/// more key points are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSkeleton {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// One titled section of a narrative draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSection {
    pub title: String,
    pub content: String,
}

/// Narrative draft for a skeleton.
///
/// `sections` and `feedback` default to empty so collaborators that only return
/// `full_draft` are still accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftResult {
    #[serde(default)]
    pub sections: Vec<DraftSection>,
    pub full_draft: String,
    #[serde(default)]
    pub feedback: String,
}

impl DraftResult {
    /// Placeholder used when the drafting collaborator could not produce a draft.
    ///
    /// Distinguishable from a real draft by its empty `full_draft` and the
    /// unavailability message in `feedback`.
    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        Self {
            sections: Vec::new(),
            full_draft: String::new(),
            feedback: format!("Draft generation unavailable: {}", reason),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.full_draft.is_empty() && self.sections.is_empty()
    }
}

/// Request body sent to the drafting collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRequest {
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
}

impl From<&ProposalSkeleton> for DraftRequest {
    fn from(skeleton: &ProposalSkeleton) -> Self {
        Self {
            title: skeleton.title.clone(),
            summary: skeleton.summary.clone(),
            key_points: skeleton.key_points.clone(),
        }
    }
}

/// A skeleton merged with its draft.
///
/// Both halves are flattened into one JSON object; their field sets are disjoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    #[serde(flatten)]
    pub skeleton: ProposalSkeleton,
    #[serde(flatten)]
    pub draft: DraftResult,
}

impl Proposal {
    pub fn merge(skeleton: ProposalSkeleton, draft: DraftResult) -> Self {
        Self { skeleton, draft }
    }
}

/// Input for the analyze endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeInput {
    pub requirements: String,
    #[serde(default = "default_num_proposals")]
    pub num_proposals: usize,
}

fn default_num_proposals() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub proposals: Vec<Proposal>,
}
