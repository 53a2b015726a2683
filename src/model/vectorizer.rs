//! TF-IDF vectorizer for text feature extraction.
//!
//! The vectorizer works on text that has already been through the
//! [`TextNormalizer`](crate::normalize::TextNormalizer), so tokens are split on
//! whitespace only. Once fitted it is frozen: serving only calls
//! [`TfIdfVectorizer::transform`].

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerityError};

/// Hyperparameters that shape the vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerParams {
    /// Keep at most this many terms, ranked by corpus frequency.
    pub max_features: Option<usize>,
    /// Drop terms that appear in fewer documents than this.
    pub min_df: usize,
    /// Drop terms that appear in more than this fraction of documents.
    pub max_df: f64,
    /// Inclusive range of n-gram lengths.
    pub ngram_range: (usize, usize),
}

impl Default for VectorizerParams {
    fn default() -> Self {
        VectorizerParams {
            max_features: Some(5000),
            min_df: 2,
            max_df: 0.95,
            ngram_range: (1, 2),
        }
    }
}

impl VectorizerParams {
    pub fn validate(&self) -> Result<()> {
        if self.max_features == Some(0) {
            return Err(VerityError::invalid_config("max_features must be positive"));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(VerityError::invalid_config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(VerityError::invalid_config(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        Ok(())
    }
}

/// A sparse feature vector with indices sorted ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    pub dim: usize,
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    /// An all-zero vector of the given dimension.
    pub fn zeros(dim: usize) -> Self {
        SparseVector {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over `(index, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Dot product with a dense vector of the same dimension.
    pub fn dot(&self, dense: &[f64]) -> Result<f64> {
        if dense.len() != self.dim {
            return Err(VerityError::internal(format!(
                "Feature dimension mismatch: vector has {}, weights have {}",
                self.dim,
                dense.len()
            )));
        }
        Ok(self.iter().map(|(i, v)| v * dense[i]).sum())
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Expand into a dense vector.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for (i, v) in self.iter() {
            dense[i] = v;
        }
        dense
    }
}

/// TF-IDF vectorizer for text feature extraction.
///
/// Uses raw term counts, smoothed IDF `ln((N + 1) / (df + 1)) + 1` and
/// l2-normalized output rows. Vocabulary indices follow alphabetical order.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    /// Vocabulary: term -> index mapping.
    vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency for each term.
    idf: Vec<f64>,
    /// Total number of documents seen during fitting.
    n_documents: usize,
    params: VectorizerParams,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("params", &self.params)
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(params: VectorizerParams) -> Self {
        Self {
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            params,
        }
    }

    /// Fit the vocabulary and IDF table on normalized documents.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        self.params.validate()?;
        if documents.is_empty() {
            return Err(VerityError::training("Cannot fit vectorizer on zero documents"));
        }

        let n_documents = documents.len();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        let mut term_frequency: HashMap<String, usize> = HashMap::new();

        // Count document and corpus frequencies
        for doc in documents {
            let terms = self.terms(doc);
            let unique_terms: HashSet<&String> = terms.iter().collect();
            for term in unique_terms {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
            for term in terms {
                *term_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let max_doc_count = self.params.max_df * n_documents as f64;
        let mut kept: Vec<(String, usize)> = document_frequency
            .into_iter()
            .filter(|(_, df)| *df >= self.params.min_df && (*df as f64) <= max_doc_count)
            .collect();

        if kept.is_empty() {
            return Err(VerityError::training(
                "After pruning, no terms remain; try a lower min_df or a higher max_df",
            ));
        }

        if let Some(max_features) = self.params.max_features {
            if kept.len() > max_features {
                // Most frequent terms first, ties broken alphabetically
                kept.sort_by(|(a, _), (b, _)| {
                    term_frequency[b]
                        .cmp(&term_frequency[a])
                        .then_with(|| a.cmp(b))
                });
                kept.truncate(max_features);
            }
        }

        kept.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(kept.len());
        for (idx, (term, df)) in kept.into_iter().enumerate() {
            // IDF = log((N + 1) / (df + 1)) + 1
            idf.push(((n_documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0);
            vocabulary.insert(term, idx);
        }

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = n_documents;

        Ok(())
    }

    /// Transform a normalized document into an l2-normalized TF-IDF vector.
    ///
    /// Terms outside the vocabulary are ignored; a document with no known
    /// terms yields the zero vector.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.terms(document) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut indices = Vec::with_capacity(counts.len());
        let mut values = Vec::with_capacity(counts.len());
        for (idx, count) in counts {
            indices.push(idx);
            values.push(count * self.idf[idx]);
        }

        let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut values {
                *value /= norm;
            }
        }

        SparseVector {
            dim: self.vocabulary.len(),
            indices,
            values,
        }
    }

    /// Fit, then transform every document.
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        Ok(documents.iter().map(|doc| self.transform(doc)).collect())
    }

    /// Extract the configured n-grams from a normalized document.
    fn terms(&self, document: &str) -> Vec<String> {
        let tokens: Vec<&str> = document.split_whitespace().collect();
        let (min_n, max_n) = self.params.ngram_range;
        let mut terms = Vec::new();

        for n in min_n..=max_n {
            if n == 0 || n > tokens.len() {
                continue;
            }
            terms.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
        terms
    }

    /// Check internal consistency of a deserialized vectorizer.
    pub fn validate(&self) -> Result<()> {
        if self.vocabulary.is_empty() {
            return Err(VerityError::artifact_corrupt("vectorizer vocabulary is empty"));
        }
        if self.idf.len() != self.vocabulary.len() {
            return Err(VerityError::artifact_corrupt(format!(
                "idf table has {} entries for a vocabulary of {}",
                self.idf.len(),
                self.vocabulary.len()
            )));
        }
        let mut seen = vec![false; self.idf.len()];
        for &idx in self.vocabulary.values() {
            match seen.get_mut(idx) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(VerityError::artifact_corrupt(format!(
                        "vocabulary index {idx} is out of range or duplicated"
                    )));
                }
            }
        }
        if self.idf.iter().any(|v| !v.is_finite()) {
            return Err(VerityError::artifact_corrupt("idf table contains non-finite values"));
        }
        Ok(())
    }

    /// Number of features produced by [`transform`](Self::transform).
    pub fn feature_count(&self) -> usize {
        self.vocabulary.len()
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    pub fn params(&self) -> &VectorizerParams {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }
}
