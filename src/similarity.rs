//! Bag-of-words Jaccard ranking over whole-document text.
//!
//! There is no index: every query tokenizes and scores every document,
//! so a search costs O(n·m) for n documents of m words.

use std::collections::HashSet;

use rayon::prelude::*;

/// Number of documents returned when no limit is given.
pub const DEFAULT_TOP_K: usize = 3;

/// A ranked document with its Jaccard score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedDocument<I> {
    pub id: I,
    pub score: f32,
}

/// Lowercase `text` and split it on whitespace into a set of words.
///
/// # Examples
///
/// ```
/// use docqa::similarity::tokenize;
///
/// let words = tokenize("The cat saw THE dog");
/// assert_eq!(words.len(), 4);
/// assert!(words.contains("the"));
/// ```
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect()
}

/// `|A ∩ B| / |A ∪ B|` over the word sets of two texts.
///
/// Returns 0.0 when both texts are empty.
pub fn jaccard_similarity(a: &str, b: &str) -> f32 {
    jaccard(&tokenize(a), &tokenize(b))
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f32 / union as f32
}

/// Ranks `(id, text)` pairs against a query by Jaccard similarity.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityRanker {
    pub top_k: usize,
}

impl Default for SimilarityRanker {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl SimilarityRanker {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    /// Score every document and return the best `top_k`, highest first.
    ///
    /// Ties keep the order of `docs`, so callers control tie-breaking by
    /// the order they pass documents in.
    ///
    /// # Examples
    ///
    /// ```
    /// use docqa::similarity::SimilarityRanker;
    ///
    /// let docs = [(1, "rust is fast"), (2, "python is friendly")];
    /// let ranked = SimilarityRanker::new(1).rank("is rust fast", &docs);
    /// assert_eq!(ranked.len(), 1);
    /// assert_eq!(ranked[0].id, 1);
    /// ```
    pub fn rank<I>(
        &self,
        query: &str,
        docs: &[(I, &str)],
    ) -> Vec<RankedDocument<I>>
    where
        I: Clone + Send + Sync,
    {
        if self.top_k == 0 {
            return Vec::new();
        }
        let mut ranked = self.rank_all(query, docs);
        ranked.truncate(self.top_k);
        ranked
    }

    /// Score and sort every document without truncating.
    pub fn rank_all<I>(
        &self,
        query: &str,
        docs: &[(I, &str)],
    ) -> Vec<RankedDocument<I>>
    where
        I: Clone + Send + Sync,
    {
        let query_tokens = tokenize(query);

        // Indexed parallel collect keeps input order.
        let mut ranked: Vec<RankedDocument<I>> = docs
            .par_iter()
            .map(|(id, text)| RankedDocument {
                id: id.clone(),
                score: jaccard(&query_tokens, &tokenize(text)),
            })
            .collect();

        // `sort_by` is stable, which is what keeps ties in input order.
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::debug!(
            candidates = docs.len(),
            query_terms = query_tokens.len(),
            "ranked documents"
        );

        ranked
    }
}
