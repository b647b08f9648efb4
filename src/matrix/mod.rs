use std::collections::{BTreeMap, HashMap};
use log::debug;
use serde::{Deserialize, Serialize};
use sprs::{CsMat, CsVec, TriMat};
use crate::preprocessing::tokenizer::{build_vocabulary, Tokenizer};

/// Fitted TF-IDF term space over a corpus.
///
/// `matrix` is terms x documents in compressed-column form; every non-empty
/// column has unit L2 norm, so a dot product with a unit query vector is the
/// cosine similarity. Never mutated after fitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfMatrix {
    pub terms: HashMap<String, usize>,
    pub matrix: CsMat<f64>,
    pub idf: Vec<f64>,
    tokenizer: Tokenizer,
}

/// Term index -> occurrence count, iterated in term index order.
fn term_counts(text: &str, tokenizer: &Tokenizer, terms: &HashMap<String, usize>) -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();
    for token in tokenizer.tokenize(text) {
        if let Some(&term_index) = terms.get(&token) {
            *counts.entry(term_index).or_insert(0) += 1;
        }
    }
    counts
}

/// tf * idf for every counted term, scaled to unit length. Zero vectors stay empty.
fn unit_weights(counts: &BTreeMap<usize, usize>, idf: &[f64]) -> Vec<(usize, f64)> {
    let total: usize = counts.values().sum();
    let weights: Vec<(usize, f64)> = counts
        .iter()
        .map(|(&term_index, &count)| {
            let tf = count as f64 / total as f64;
            (term_index, tf * idf[term_index])
        })
        .filter(|&(_, weight)| weight > 0.0)
        .collect();

    let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        weights.into_iter().map(|(i, w)| (i, w / norm)).collect()
    } else {
        Vec::new()
    }
}

impl TfIdfMatrix {
    /// Builds the vocabulary from `texts` and fits the weight matrix, one column per text.
    pub fn fit<S: AsRef<str>>(texts: &[S], tokenizer: Tokenizer) -> Self {
        let terms = build_vocabulary(texts, &tokenizer);
        Self::build(texts, &terms, tokenizer)
    }

    pub fn build<S: AsRef<str>>(texts: &[S], terms: &HashMap<String, usize>, tokenizer: Tokenizer) -> Self {
        let n_docs = texts.len();
        let n_terms = terms.len();

        let mut df = vec![0usize; n_terms];
        let doc_counts: Vec<BTreeMap<usize, usize>> = texts
            .iter()
            .map(|text| {
                let counts = term_counts(text.as_ref(), &tokenizer, terms);
                for &term_index in counts.keys() {
                    df[term_index] += 1;
                }
                counts
            })
            .collect();

        // smoothed: ln((1 + N) / (1 + df)) + 1, so a term found in every
        // document keeps a small positive weight
        let idf: Vec<f64> = df
            .iter()
            .map(|&df| ((1 + n_docs) as f64 / (1 + df) as f64).ln() + 1.0)
            .collect();

        let mut tri_mat = TriMat::new((n_terms, n_docs));
        for (doc_index, counts) in doc_counts.iter().enumerate() {
            for (term_index, weight) in unit_weights(counts, &idf) {
                tri_mat.add_triplet(term_index, doc_index, weight);
            }
        }
        let matrix = tri_mat.to_csc();

        debug!(
            "Fitted TF-IDF matrix: {} documents, {} terms, {} non-zero weights",
            n_docs,
            n_terms,
            matrix.nnz()
        );

        Self {
            terms: terms.clone(),
            matrix,
            idf,
            tokenizer,
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn n_docs(&self) -> usize {
        self.matrix.cols()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Weight of `term` in document `doc`, 0 when absent.
    pub fn weight(&self, term: &str, doc: usize) -> f64 {
        self.terms
            .get(term)
            .and_then(|&row| self.matrix.get(row, doc))
            .copied()
            .unwrap_or(0.0)
    }

    /// Projects query text into the fitted space as a unit vector.
    ///
    /// Terms outside the vocabulary are ignored; a query with no known term
    /// projects to the zero vector.
    pub fn project(&self, query: &str) -> CsVec<f64> {
        let counts = term_counts(query, &self.tokenizer, &self.terms);
        let (indices, data): (Vec<usize>, Vec<f64>) = unit_weights(&counts, &self.idf).into_iter().unzip();
        CsVec::new(self.terms.len(), indices, data)
    }
}
