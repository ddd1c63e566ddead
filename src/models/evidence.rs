use serde::{Deserialize, Serialize};

/// A corpus snippet ranked against a query.
///
/// `score` is the cosine similarity between the query and the document, in `[0, 1]`.
/// The snippet is a hard cut of the document text, not sentence-aware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceHit {
    pub id: String,
    pub title: String,
    pub snippet: String,
    pub score: f64,
}

impl EvidenceHit {
    /// Render the hit the way prompts embed it: `[id] title: snippet`.
    pub fn render(&self) -> String {
        format!("[{}] {}: {}", self.id, self.title, self.snippet)
    }
}

/// Input for the retrieval-only search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchInput {
    pub query: String,
    /// Overrides the configured `top_k` for this query.
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<EvidenceHit>,
}
