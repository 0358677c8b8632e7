//! Strictness levels and the persisted "current level" holder.
//!
//! A `StrictnessLevel` bundles everything that changes between the three
//! presets: the minimum query length, the matching strategy and the text
//! shown to the user. `LevelConfig` owns the single mutable piece of state,
//! the current level, and writes every change through a `SettingsStore`.
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::SettingsStore;

/// Key under which the current level name is persisted.
pub const LEVEL_KEY: &str = "matching_level";

/// Matching preset selected by the user.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum StrictnessLevel {
    /// 2+ chars, every query character present anywhere.
    Low,
    /// 4+ chars, contiguous substring.
    #[default]
    Medium,
    /// 6+ chars, substring on a likely syllable boundary.
    High,
}

/// The matching algorithm a level dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStrategy {
    ContainsAllChars,
    Substring,
    SyllableBoundary,
}

impl StrictnessLevel {
    pub const ALL: [StrictnessLevel; 3] = [
        StrictnessLevel::Low,
        StrictnessLevel::Medium,
        StrictnessLevel::High,
    ];

    /// Queries shorter than this (in chars) never match.
    pub fn min_length(self) -> usize {
        match self {
            StrictnessLevel::Low => 2,
            StrictnessLevel::Medium => 4,
            StrictnessLevel::High => 6,
        }
    }

    pub fn strategy(self) -> MatchStrategy {
        match self {
            StrictnessLevel::Low => MatchStrategy::ContainsAllChars,
            StrictnessLevel::Medium => MatchStrategy::Substring,
            StrictnessLevel::High => MatchStrategy::SyllableBoundary,
        }
    }

    /// Persisted name (`"LOW"`, `"MEDIUM"`, `"HIGH"`).
    pub fn name(self) -> &'static str {
        match self {
            StrictnessLevel::Low => "LOW",
            StrictnessLevel::Medium => "MEDIUM",
            StrictnessLevel::High => "HIGH",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StrictnessLevel::Low => "低严格度：2字符起，包含所有字符即可匹配（字符可分散）",
            StrictnessLevel::Medium => "中等严格度：4字符起，要求字符连续出现（子串匹配）",
            StrictnessLevel::High => "高严格度：6字符起，严格音节边界匹配",
        }
    }

    pub fn example(self) -> &'static str {
        match self {
            StrictnessLevel::Low => "例：'masi'、'mayi'等字符分散匹配",
            StrictnessLevel::Medium => "例：'make'、'kesi'、'zhuyi'等连续匹配",
            StrictnessLevel::High => "例：严格按音节边界匹配",
        }
    }

    /// Parse a persisted name, falling back to `Medium` on anything unknown.
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            warn!(value = raw, "unrecognized matching level, using MEDIUM");
            StrictnessLevel::Medium
        })
    }

    fn to_u8(self) -> u8 {
        match self {
            StrictnessLevel::Low => 0,
            StrictnessLevel::Medium => 1,
            StrictnessLevel::High => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => StrictnessLevel::Low,
            2 => StrictnessLevel::High,
            _ => StrictnessLevel::Medium,
        }
    }
}

impl fmt::Display for StrictnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrictnessLevel {
    type Err = String;

    /// Accepts the persisted names case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(StrictnessLevel::Low),
            "MEDIUM" => Ok(StrictnessLevel::Medium),
            "HIGH" => Ok(StrictnessLevel::High),
            other => Err(format!("unknown matching level: {}", other)),
        }
    }
}

/// Holder of the current strictness level.
///
/// Reads are lock-free; a reader racing a `set_level` sees either the old or
/// the new level. The level is loaded from the store once, at construction.
#[derive(Debug)]
pub struct LevelConfig<S> {
    current: AtomicU8,
    store: S,
}

impl<S: SettingsStore> LevelConfig<S> {
    /// Load the persisted level from `store`, or use `default` when the store
    /// has none. A value that does not parse becomes `Medium`.
    pub fn new(store: S, default: StrictnessLevel) -> Self {
        let level = match store.get(LEVEL_KEY) {
            Some(raw) => StrictnessLevel::parse_or_default(&raw),
            None => default,
        };
        debug!(level = %level, "matching level loaded");
        Self {
            current: AtomicU8::new(level.to_u8()),
            store,
        }
    }

    pub fn level(&self) -> StrictnessLevel {
        StrictnessLevel::from_u8(self.current.load(Ordering::Acquire))
    }

    /// Switch to `level` and persist it.
    ///
    /// The in-memory level changes even if the store write fails; the error is
    /// returned so the caller can report it.
    pub fn set_level(&self, level: StrictnessLevel) -> anyhow::Result<()> {
        self.current.store(level.to_u8(), Ordering::Release);
        self.store.put(LEVEL_KEY, level.name())
    }

    /// Minimum query length of the current level.
    pub fn min_length(&self) -> usize {
        self.level().min_length()
    }

    pub fn description(&self) -> &'static str {
        self.level().description()
    }

    pub fn example(&self) -> &'static str {
        self.level().example()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemorySettings;

    #[test]
    fn default_level_is_medium() {
        assert_eq!(StrictnessLevel::default(), StrictnessLevel::Medium);
    }

    #[test]
    fn min_lengths() {
        assert_eq!(StrictnessLevel::Low.min_length(), 2);
        assert_eq!(StrictnessLevel::Medium.min_length(), 4);
        assert_eq!(StrictnessLevel::High.min_length(), 6);
    }

    #[test]
    fn names_roundtrip() {
        for level in StrictnessLevel::ALL {
            assert_eq!(level.name().parse::<StrictnessLevel>(), Ok(level));
        }
        assert_eq!("low".parse::<StrictnessLevel>(), Ok(StrictnessLevel::Low));
    }

    #[test]
    fn corrupted_name_falls_back_to_medium() {
        assert_eq!(StrictnessLevel::parse_or_default("ULTRA"), StrictnessLevel::Medium);
        assert_eq!(StrictnessLevel::parse_or_default(""), StrictnessLevel::Medium);
    }

    #[test]
    fn empty_store_uses_default() {
        let cfg = LevelConfig::new(InMemorySettings::new(), StrictnessLevel::High);
        assert_eq!(cfg.level(), StrictnessLevel::High);
        assert_eq!(cfg.min_length(), 6);
    }

    #[test]
    fn corrupted_store_value_is_medium() {
        let store = InMemorySettings::new();
        store.put(LEVEL_KEY, "garbage").unwrap();
        let cfg = LevelConfig::new(store, StrictnessLevel::Low);
        assert_eq!(cfg.level(), StrictnessLevel::Medium);
    }

    #[test]
    fn set_level_persists() {
        let store = InMemorySettings::new();
        let cfg = LevelConfig::new(store.clone(), StrictnessLevel::Medium);
        cfg.set_level(StrictnessLevel::Low).unwrap();
        assert_eq!(cfg.level(), StrictnessLevel::Low);
        assert_eq!(store.get(LEVEL_KEY).as_deref(), Some("LOW"));

        // any transition is allowed
        cfg.set_level(StrictnessLevel::High).unwrap();
        cfg.set_level(StrictnessLevel::Medium).unwrap();
        assert_eq!(cfg.level(), StrictnessLevel::Medium);

        let reloaded = LevelConfig::new(store, StrictnessLevel::Low);
        assert_eq!(reloaded.level(), StrictnessLevel::Medium);
    }
}
