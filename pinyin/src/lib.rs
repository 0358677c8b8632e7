//! examkey-pinyin crate root
//!
//! Pinyin-specific half of examkey: romanizing Chinese text, matching typed
//! pinyin against romanized text at a strictness level, scoring hits, and the
//! question bank and suggestion table built on top of them.
//!
//! Public API exported here:
//! - `RomanizationTable`, `Romanizer` from `romanize`
//! - `matches` and the per-strategy helpers from `matcher`
//! - `score`, `score_breakdown` from `scorer`
//! - `Question`, `QuestionType`, `QuestionBank` from `bank`
//! - `SuggestionEngine`, `associations` from `suggest`

pub mod bank;
pub mod matcher;
pub mod romanize;
pub mod scorer;
pub mod suggest;

pub use bank::{normalize_query, Question, QuestionBank, QuestionType};
pub use matcher::{match_positions, matches};
pub use romanize::{RomanizationTable, Romanizer};
pub use scorer::{score, score_breakdown, ScoreBreakdown};
pub use suggest::{associations, SuggestionEngine};

// Shared level/config types, so front-ends only need this crate.
pub use examkey_core::{
    is_similar, is_similar_with, Config, InMemorySettings, LevelConfig, RedbSettings, SettingsStore,
    SimilarityConfig, StrictnessLevel,
};

use std::sync::Arc;

/// A romanizer initialized from `config.pinyin_data`, or from the built-in
/// dictionary when no data file is configured.
///
/// A configured file that fails to load leaves the romanizer in pass-through
/// mode; the failure is logged, not returned.
pub fn romanizer_from_config(config: &Config) -> Arc<Romanizer> {
    let romanizer = Arc::new(Romanizer::new());
    match &config.pinyin_data {
        Some(path) => {
            let _ = romanizer.init_with(|| RomanizationTable::load(path));
        }
        None => {
            romanizer.init_builtin();
        }
    }
    romanizer
}
