use crate::document::record::Corpus;
use crate::matrix::TfIdfMatrix;

/// Cosine similarity of `query` against every record, indexed like the corpus.
///
/// Every value lies in [0, 1]; a query sharing no term with the fitted
/// vocabulary scores 0 everywhere. `tfidf` must have been fit on `corpus`.
pub fn score(tfidf: &TfIdfMatrix, corpus: &Corpus, query: &str) -> Vec<f64> {
    debug_assert_eq!(tfidf.n_docs(), corpus.len());

    let query_vec = tfidf.project(query);
    if query_vec.nnz() == 0 {
        return vec![0.0; corpus.len()];
    }

    (0..corpus.len())
        .map(|doc_idx| {
            tfidf
                .matrix
                .outer_view(doc_idx)
                .map_or(0.0, |doc_vec| query_vec.dot(&doc_vec).clamp(0.0, 1.0))
        })
        .collect()
}
