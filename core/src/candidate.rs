//! Ranked search hits.
//!
//! Scores are only comparable within a single search call. Ranking is a
//! stable descending sort, so equal scores keep their input order.

use serde::{Deserialize, Serialize};

/// A search hit: the identifier of the source item and its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoredCandidate<I = usize> {
    pub id: I,
    pub score: u32,
}

impl<I> ScoredCandidate<I> {
    pub fn new(id: I, score: u32) -> Self {
        ScoredCandidate { id, score }
    }
}

/// Sort candidates by score, highest first. Ties keep their relative order.
pub fn rank_candidates<I>(candidates: &mut [ScoredCandidate<I>]) {
    // slice::sort_by is stable
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Score every item with `score_fn` and return them ranked.
pub fn rank_by<T, F>(items: impl IntoIterator<Item = T>, mut score_fn: F) -> Vec<ScoredCandidate<T>>
where
    F: FnMut(&T) -> u32,
{
    let mut scored: Vec<ScoredCandidate<T>> = items
        .into_iter()
        .map(|item| {
            let score = score_fn(&item);
            ScoredCandidate::new(item, score)
        })
        .collect();
    rank_candidates(&mut scored);
    scored
}
