//! TF-IDF vector space over the document corpus.
//!
//! Documents are embedded as L2-normalized sparse vectors of unigram and bigram
//! counts weighted by smoothed inverse document frequency:
//!
//! ```text
//! idf(t) = ln((1 + n) / (1 + df(t))) + 1
//! ```
//!
//! The vocabulary is fitted once at build time. Queries are projected into the
//! same space; terms the corpus never used contribute nothing.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::text;
use crate::corpus::DocumentCorpus;

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Sparse vector as `(column, weight)` pairs sorted by column.
type SparseVector = Vec<(usize, f64)>;

/// Fitted TF-IDF index.
///
/// An index with no vocabulary (empty corpus, or a corpus made only of stop
/// words) is a null index: every query returns nothing.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    documents: Vec<SparseVector>,
}

impl VectorIndex {
    /// Fit the vocabulary and embed every document.
    ///
    /// Deterministic: the same corpus always produces the same index.
    pub fn build(corpus: &DocumentCorpus, max_features: usize) -> Self {
        let doc_terms: Vec<Vec<String>> = corpus
            .documents()
            .iter()
            .map(|doc| text::terms(&doc.text))
            .collect();

        let vocabulary = fit_vocabulary(&doc_terms, max_features);
        if vocabulary.is_empty() {
            tracing::debug!("Corpus has no extractable vocabulary, index is null");
            return Self::null();
        }

        let mut df = vec![0usize; vocabulary.len()];
        let counts: Vec<SparseVector> = doc_terms
            .iter()
            .map(|terms| count_terms(terms, &vocabulary))
            .collect();
        for doc in &counts {
            for &(column, _) in doc {
                df[column] += 1;
            }
        }

        let n = corpus.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let documents = counts
            .into_iter()
            .map(|doc| weigh_and_normalize(doc, &idf))
            .collect();

        Self {
            vocabulary,
            idf,
            documents,
        }
    }

    fn null() -> Self {
        Self {
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            documents: Vec::new(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Rank documents by cosine similarity to `query_text`.
    ///
    /// Returns at most `top_k` `(document index, score)` pairs in descending score
    /// order. Equal scores keep corpus order. Every document is a candidate, even
    /// with a score of zero.
    pub fn query(&self, query_text: &str, top_k: usize) -> Vec<(usize, f64)> {
        if self.is_null() || top_k == 0 {
            return Vec::new();
        }

        let counts = count_terms(&text::terms(query_text), &self.vocabulary);
        let query = weigh_and_normalize(counts, &self.idf);

        let mut ranked: Vec<(usize, f64)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (i, dot(&query, doc).clamp(0.0, 1.0)))
            .collect();

        // sort_by is stable, ties stay in corpus order
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(top_k);
        ranked
    }
}

/// Pick the `max_features` most frequent terms across the corpus and assign
/// columns in alphabetical order.
fn fit_vocabulary(doc_terms: &[Vec<String>], max_features: usize) -> HashMap<String, usize> {
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for terms in doc_terms {
        for term in terms {
            *frequency.entry(term.as_str()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = frequency.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(max_features);

    let mut selected: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
    selected.sort_unstable();

    selected
        .into_iter()
        .enumerate()
        .map(|(column, term)| (term.to_string(), column))
        .collect()
}

fn count_terms(terms: &[String], vocabulary: &HashMap<String, usize>) -> SparseVector {
    let mut counts: HashMap<usize, f64> = HashMap::new();
    for term in terms {
        if let Some(&column) = vocabulary.get(term) {
            *counts.entry(column).or_insert(0.0) += 1.0;
        }
    }
    let mut vector: SparseVector = counts.into_iter().collect();
    vector.sort_unstable_by_key(|&(column, _)| column);
    vector
}

fn weigh_and_normalize(mut vector: SparseVector, idf: &[f64]) -> SparseVector {
    for (column, weight) in vector.iter_mut() {
        *weight *= idf[*column];
    }
    let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > f64::EPSILON {
        for (_, weight) in vector.iter_mut() {
            *weight /= norm;
        }
    }
    vector
}

/// Dot product of two column-sorted sparse vectors.
fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}
