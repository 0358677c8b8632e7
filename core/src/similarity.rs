//! Coarse, script-agnostic similarity between a query and a text.
//!
//! Independent of the strictness levels. A query is similar to a text when,
//! after punctuation and whitespace are removed, it is contained verbatim or
//! some window of the text is within a small edit distance of it.
use serde::{Deserialize, Serialize};
use strsim::levenshtein;

use crate::utils::strip_punctuation;

/// Edit-distance tolerance for `is_similar_with`.
///
/// The allowed distance is `query_len * max_distance_num / max_distance_den`
/// (integer division), so a 3-char query tolerates one edit, a 5-char query
/// two and a 10-char query four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Queries shorter than this only match by containment.
    pub min_fuzzy_len: usize,
    /// Windows range over `query_len ± window_tolerance` chars.
    pub window_tolerance: usize,
    pub max_distance_num: usize,
    pub max_distance_den: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            min_fuzzy_len: 3,
            window_tolerance: 2,
            max_distance_num: 2,
            max_distance_den: 5,
        }
    }
}

impl SimilarityConfig {
    /// Largest edit distance accepted for a query of `query_len` chars.
    pub fn max_distance(&self, query_len: usize) -> usize {
        if self.max_distance_den == 0 {
            return 0;
        }
        query_len * self.max_distance_num / self.max_distance_den
    }
}

/// `is_similar_with` using the default thresholds.
pub fn is_similar(query: &str, corpus: &str) -> bool {
    is_similar_with(&SimilarityConfig::default(), query, corpus)
}

/// Whether `query` occurs in `corpus`, exactly or approximately.
///
/// An empty query (after stripping) is never similar.
pub fn is_similar_with(cfg: &SimilarityConfig, query: &str, corpus: &str) -> bool {
    let query = strip_punctuation(query);
    let corpus = strip_punctuation(corpus);
    if query.is_empty() {
        return false;
    }
    if corpus.contains(&query) {
        return true;
    }

    let query_len = query.chars().count();
    if query_len < cfg.min_fuzzy_len {
        return false;
    }
    min_window_distance(cfg, &query, &corpus) <= cfg.max_distance(query_len)
}

/// Smallest Levenshtein distance between `query` and any window of `corpus`
/// whose length is within the configured tolerance of the query length.
fn min_window_distance(cfg: &SimilarityConfig, query: &str, corpus: &str) -> usize {
    let query_len = query.chars().count();
    let chars: Vec<char> = corpus.chars().collect();
    if chars.is_empty() {
        return query_len;
    }

    let shortest = query_len.saturating_sub(cfg.window_tolerance).max(1);
    let longest = query_len + cfg.window_tolerance;
    let mut best = usize::MAX;

    for size in shortest..=longest {
        // the whole corpus is the only window once the size reaches it
        let size = size.min(chars.len());
        for start in 0..=(chars.len() - size) {
            let window: String = chars[start..start + size].iter().collect();
            let d = levenshtein(query, &window);
            if d < best {
                best = d;
                if best == 0 {
                    return 0;
                }
            }
        }
        if size == chars.len() {
            break;
        }
    }
    best
}
