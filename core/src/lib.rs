//! examkey-core
//!
//! Language-agnostic pieces shared by the examkey crates: strictness levels
//! and their persisted configuration, candidate ranking, the coarse fuzzy
//! similarity matcher and text utilities.
//!
//! Public API:
//! - `StrictnessLevel` - Low/Medium/High presets (minimum length, strategy, text)
//! - `LevelConfig` - Current level backed by a `SettingsStore`
//! - `SettingsStore` - Key-value persistence seam (`InMemorySettings`, `RedbSettings`)
//! - `ScoredCandidate` - Ranked search hit, sorted with `rank_candidates`
//! - `is_similar` - Punctuation-insensitive containment with edit-distance fallback
//! - `Config` - TOML configuration
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod level;
pub use level::{LevelConfig, MatchStrategy, StrictnessLevel, LEVEL_KEY};

pub mod store;
pub use store::{InMemorySettings, RedbSettings, SettingsStore};

pub mod candidate;
pub use candidate::{rank_by, rank_candidates, ScoredCandidate};

pub mod similarity;
pub use similarity::{is_similar, is_similar_with, SimilarityConfig};

/// Configuration for the search front-ends (CLI, tools).
///
/// The persisted strictness level lives in the settings store, not here;
/// `default_level` is only used when the store holds nothing yet.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Level used before the user has picked one.
    pub default_level: StrictnessLevel,

    /// Optional `pinyin-data` style table overriding the built-in dictionary.
    pub pinyin_data: Option<PathBuf>,

    /// Location of the redb settings database.
    /// `None` means `$HOME/.examkey/settings.redb`.
    pub settings_path: Option<PathBuf>,

    /// Maximum number of search hits printed by front-ends.
    pub max_results: usize,

    /// Thresholds for the similarity matcher.
    pub similarity: SimilarityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_level: StrictnessLevel::Medium,
            pinyin_data: None,
            settings_path: None,
            max_results: 20,
            similarity: SimilarityConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Resolve the settings database path, falling back to the home directory.
    pub fn resolved_settings_path(&self) -> PathBuf {
        if let Some(p) = &self.settings_path {
            return p.clone();
        }
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".examkey").join("settings.redb")
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }

    /// Strip tone marks and spell `ü` as `v`, producing plain ASCII pinyin.
    ///
    /// `"zhōng"` becomes `"zhong"`, `"lǜ"` becomes `"lv"`. Characters that do
    /// not decompose to ASCII are dropped.
    pub fn toneless(syllable: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        syllable
            .nfd()
            .filter_map(|ch| match ch {
                // u + combining diaeresis, possibly followed by a tone mark
                '\u{0308}' => Some('\u{0308}'),
                c if c.is_ascii() => Some(c.to_ascii_lowercase()),
                _ => None,
            })
            .collect::<String>()
            .replace("u\u{0308}", "v")
            .replace('\u{0308}', "")
    }

    /// Whether `ch` counts as punctuation for matching purposes.
    ///
    /// Covers ASCII punctuation, the punctuation of the CJK Symbols and
    /// Punctuation block, full-width punctuation and the common quotes, dashes
    /// and ellipsis from General Punctuation.
    ///
    /// Ideographs sharing the CJK block (々 〆 〇, the Hangzhou numerals and
    /// 〻) are not punctuation; they are romanized and compared like any
    /// other character.
    pub fn is_punctuation(ch: char) -> bool {
        ch.is_ascii_punctuation()
            || matches!(ch,
                '\u{3000}'..='\u{3004}'
                | '\u{3008}'..='\u{3020}'
                | '\u{3030}'..='\u{3037}'
                | '\u{303C}'..='\u{303F}'
                | '\u{2010}'..='\u{2027}'
                | '\u{2030}'..='\u{205E}'
                | '\u{FE10}'..='\u{FE1F}'
                | '\u{FE30}'..='\u{FE6F}'
                | '\u{FF01}'..='\u{FF0F}'
                | '\u{FF1A}'..='\u{FF20}'
                | '\u{FF3B}'..='\u{FF40}'
                | '\u{FF5B}'..='\u{FF65}'
                | '\u{00B7}')
    }

    /// Remove punctuation and whitespace.
    pub fn strip_punctuation(s: &str) -> String {
        s.chars()
            .filter(|&c| !is_punctuation(c) && !c.is_whitespace())
            .collect()
    }

    /// Fold full-width ASCII variants (`ＡＢＣ１２３`) and the ideographic
    /// space to their ASCII forms, as typed by a CJK keyboard in full-width
    /// mode.
    pub fn fold_fullwidth(s: &str) -> String {
        s.chars()
            .map(|ch| match ch {
                '\u{3000}' => ' ',
                '\u{FF01}'..='\u{FF5E}' => char::from_u32(ch as u32 - 0xFEE0).unwrap_or(ch),
                _ => ch,
            })
            .collect()
    }
}
