//! Relevance score for an item that is being considered for a query.
//!
//! The score is a sum of fixed bonuses, meaningful only for ranking the
//! results of one search call.
use examkey_core::StrictnessLevel;

use crate::matcher::matches;

/// Original text contains the query verbatim.
pub const TEXT_CONTAINS_BONUS: u32 = 100;
/// Romanized text starts with the query.
pub const ROMANIZED_PREFIX_BONUS: u32 = 20;
/// Original text starts with the query.
pub const TEXT_PREFIX_BONUS: u32 = 15;
/// Per query character.
pub const LENGTH_BONUS_PER_CHAR: u32 = 2;

/// Bonus for a level match; only the current level's bonus applies.
pub fn strategy_bonus(level: StrictnessLevel) -> u32 {
    match level {
        StrictnessLevel::High => 95,
        StrictnessLevel::Medium => 85,
        StrictnessLevel::Low => 75,
    }
}

/// The components of a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub text_contains: u32,
    pub strategy: u32,
    pub romanized_prefix: u32,
    pub text_prefix: u32,
    pub query_length: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.text_contains
            + self.strategy
            + self.romanized_prefix
            + self.text_prefix
            + self.query_length
    }
}

/// Compute every score component. An empty query scores nothing.
pub fn score_breakdown(
    item_text: &str,
    item_romanized: &str,
    query: &str,
    level: StrictnessLevel,
) -> ScoreBreakdown {
    if query.is_empty() {
        return ScoreBreakdown::default();
    }
    let text = item_text.to_lowercase();
    let romanized = item_romanized.to_lowercase();
    let query = query.to_lowercase();
    let query_chars = query.chars().count() as u32;

    ScoreBreakdown {
        text_contains: if text.contains(&query) { TEXT_CONTAINS_BONUS } else { 0 },
        strategy: if matches(&romanized, &query, level) {
            strategy_bonus(level)
        } else {
            0
        },
        romanized_prefix: if romanized.starts_with(&query) {
            ROMANIZED_PREFIX_BONUS
        } else {
            0
        },
        text_prefix: if text.starts_with(&query) { TEXT_PREFIX_BONUS } else { 0 },
        query_length: LENGTH_BONUS_PER_CHAR.saturating_mul(query_chars),
    }
}

/// Total relevance score of an item for `query` at `level`.
pub fn score(item_text: &str, item_romanized: &str, query: &str, level: StrictnessLevel) -> u32 {
    score_breakdown(item_text, item_romanized, query, level).total()
}
