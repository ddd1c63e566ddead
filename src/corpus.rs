//! Reference document corpus.
//!
//! The corpus is a JSON array of [`Document`] objects read once at startup.
//! A missing file yields an empty corpus; the server still runs, retrieval simply
//! has no evidence to offer.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use crate::models::Document;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to read corpus file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse corpus file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate document id in corpus: {0}")]
    DuplicateId(String),
}

/// Immutable, ordered collection of reference documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentCorpus {
    documents: Vec<Document>,
}

impl DocumentCorpus {
    /// Build a corpus, rejecting duplicate document ids.
    pub fn new(documents: Vec<Document>) -> Result<Self, CorpusError> {
        let mut seen = HashSet::with_capacity(documents.len());
        for doc in &documents {
            if !seen.insert(doc.id.as_str()) {
                return Err(CorpusError::DuplicateId(doc.id.clone()));
            }
        }
        Ok(Self { documents })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a corpus from a JSON file. A missing file is an empty corpus.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let shown = path.display().to_string();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No corpus at {}, starting with empty corpus", shown);
                return Ok(Self::empty());
            }
            Err(source) => {
                return Err(CorpusError::Io {
                    path: shown,
                    source,
                })
            }
        };

        let documents: Vec<Document> =
            serde_json::from_str(&content).map_err(|source| CorpusError::Parse {
                path: shown.clone(),
                source,
            })?;

        let corpus = Self::new(documents)?;
        tracing::info!("Loaded {} documents from {}", corpus.len(), shown);
        Ok(corpus)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
