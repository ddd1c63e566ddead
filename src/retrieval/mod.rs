//! Evidence retrieval over the reference corpus.
//!
//! [`IndexedCorpus`] pairs a corpus with the index fitted on it, so the two can
//! only be replaced together. [`EvidenceRetriever`] turns index rankings into
//! [`EvidenceHit`]s.

mod index;
pub mod text;

use std::sync::Arc;

pub use index::{VectorIndex, DEFAULT_MAX_FEATURES};

use crate::corpus::DocumentCorpus;
use crate::models::EvidenceHit;

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_SNIPPET_CHARS: usize = 500;

/// A corpus together with the vector index built from it.
#[derive(Debug)]
pub struct IndexedCorpus {
    corpus: DocumentCorpus,
    index: VectorIndex,
}

impl IndexedCorpus {
    pub fn build(corpus: DocumentCorpus, max_features: usize) -> Self {
        let index = VectorIndex::build(&corpus, max_features);
        tracing::info!(
            documents = corpus.len(),
            vocabulary = index.vocabulary_len(),
            "Built evidence index"
        );
        Self { corpus, index }
    }

    pub fn corpus(&self) -> &DocumentCorpus {
        &self.corpus
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}

/// Query-time ranking and snippet extraction.
#[derive(Debug, Clone)]
pub struct EvidenceRetriever {
    indexed: Arc<IndexedCorpus>,
    top_k: usize,
    snippet_chars: usize,
}

impl EvidenceRetriever {
    pub fn new(indexed: Arc<IndexedCorpus>) -> Self {
        Self {
            indexed,
            top_k: DEFAULT_TOP_K,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_snippet_chars(mut self, snippet_chars: usize) -> Self {
        self.snippet_chars = snippet_chars;
        self
    }

    pub fn indexed(&self) -> &IndexedCorpus {
        &self.indexed
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve up to the configured `top_k` hits for `query`.
    pub fn retrieve(&self, query: &str) -> Vec<EvidenceHit> {
        self.retrieve_top(query, self.top_k)
    }

    /// Retrieve up to `top_k` hits for `query`, best first.
    ///
    /// No score threshold is applied; callers decide what counts as relevant.
    pub fn retrieve_top(&self, query: &str, top_k: usize) -> Vec<EvidenceHit> {
        self.indexed
            .index
            .query(query, top_k)
            .into_iter()
            .filter_map(|(i, score)| {
                let doc = self.indexed.corpus.get(i)?;
                Some(EvidenceHit {
                    id: doc.id.clone(),
                    title: doc.title.clone(),
                    snippet: truncate_chars(&doc.text, self.snippet_chars),
                    score,
                })
            })
            .collect()
    }
}

/// Hard cut at `max` characters. Not sentence-aware.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte, _)) => text[..byte].to_string(),
        None => text.to_string(),
    }
}

/// Render hits for a prompt: one `[id] title: snippet` block per hit.
pub fn render_evidence(hits: &[EvidenceHit]) -> String {
    hits.iter()
        .map(EvidenceHit::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}
