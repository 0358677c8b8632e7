//! Character → pinyin romanization.
//!
//! `RomanizationTable` maps single code points to toneless ASCII syllables
//! (`ü` spelled `v`). `Romanizer` publishes one table exactly once and
//! degrades to echoing its input until that has happened.
//!
//! Table sources:
//! - `RomanizationTable::builtin()`: the dictionary compiled into the
//!   `pinyin` crate, first reading per character.
//! - `pinyin-data` text files (`U+4E2D: zhōng,zhòng  # 中`).
//! - bincode snapshots written by `save_bincode` (see the `convert_pinyin_data`
//!   tool).
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{bail, Context};
use examkey_core::utils::{is_punctuation, toneless};
use once_cell::sync::OnceCell;
use pinyin::ToPinyin;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Code point ranges scanned when building the built-in table.
const BUILTIN_RANGES: [RangeInclusive<u32>; 3] = [
    // 〇
    0x3007..=0x3007,
    // CJK Unified Ideographs Extension A
    0x3400..=0x4DBF,
    // CJK Unified Ideographs
    0x4E00..=0x9FFF,
];

/// Immutable code point → syllable table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomanizationTable {
    map: HashMap<char, String>,
}

impl RomanizationTable {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Build the table from the `pinyin` crate's dictionary.
    pub fn builtin() -> Self {
        let mut map = HashMap::new();
        for range in BUILTIN_RANGES.iter() {
            for cp in range.clone() {
                let Some(ch) = char::from_u32(cp) else {
                    continue;
                };
                if let Some(py) = ch.to_pinyin() {
                    let syllable = toneless(py.plain());
                    if !syllable.is_empty() {
                        map.insert(ch, syllable);
                    }
                }
            }
        }
        debug!(entries = map.len(), "built-in romanization table ready");
        Self { map }
    }

    /// Parse a `pinyin-data` style table.
    ///
    /// Each data line looks like `U+4E2D: zhōng,zhòng  # 中`; only the first
    /// reading is kept. Comment and malformed lines are skipped. A source
    /// without a single usable line is treated as corrupt.
    pub fn from_reader<R: BufRead>(reader: R) -> anyhow::Result<Self> {
        let mut map = HashMap::new();
        let mut skipped = 0usize;
        for line in reader.lines() {
            let line = line.context("read pinyin data")?;
            let line = line.trim();
            if !line.starts_with("U+") {
                continue;
            }
            match parse_data_line(line) {
                Some((ch, syllable)) => {
                    map.insert(ch, syllable);
                }
                None => skipped += 1,
            }
        }
        if map.is_empty() {
            bail!("pinyin data contains no entries");
        }
        debug!(entries = map.len(), skipped, "romanization table parsed");
        Ok(Self { map })
    }

    /// Load a `pinyin-data` style text file.
    pub fn load_pinyin_data<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        Self::from_reader(BufReader::new(f))
            .with_context(|| format!("parse {}", path.display()))
    }

    /// Load a table snapshot written by `save_bincode`.
    pub fn load_bincode<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let table: Self = bincode::deserialize_from(BufReader::new(f))
            .with_context(|| format!("deserialize {}", path.display()))?;
        if table.is_empty() {
            bail!("romanization snapshot {} is empty", path.display());
        }
        Ok(table)
    }

    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
        bincode::serialize_into(BufWriter::new(f), self)
            .with_context(|| format!("serialize {}", path.display()))?;
        Ok(())
    }

    /// Load either format, chosen by extension (`.bincode`/`.bin` → snapshot).
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("bincode") | Some("bin") => Self::load_bincode(path),
            _ => Self::load_pinyin_data(path),
        }
    }

    pub fn insert<S: Into<String>>(&mut self, ch: char, syllable: S) {
        self.map.insert(ch, syllable.into());
    }

    pub fn get(&self, ch: char) -> Option<&str> {
        self.map.get(&ch).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Romanize `text`, concatenating syllables without separators.
    ///
    /// ASCII and punctuation are copied as-is; characters missing from the
    /// table are copied too.
    pub fn romanize(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 2);
        for ch in text.chars() {
            if ch.is_ascii() || is_punctuation(ch) {
                out.push(ch);
                continue;
            }
            match self.map.get(&ch) {
                Some(s) => out.push_str(s),
                None => out.push(ch),
            }
        }
        out
    }
}

/// `U+4E2D: zhōng,zhòng  # 中` → `('中', "zhong")`.
fn parse_data_line(line: &str) -> Option<(char, String)> {
    let (data, comment) = match line.split_once('#') {
        Some((d, c)) => (d, Some(c.trim())),
        None => (line, None),
    };
    let (code, readings) = data.split_once(':')?;
    let ch = u32::from_str_radix(code.trim().trim_start_matches("U+"), 16)
        .ok()
        .and_then(char::from_u32)
        .or_else(|| comment.and_then(|c| c.chars().next()))?;
    let first = readings.split(',').next()?.trim();
    let syllable = toneless(first);
    if syllable.is_empty() || !syllable.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }
    Some((ch, syllable))
}

/// One-shot holder of the romanization table.
///
/// Until a table is published, `romanize` echoes its input and `is_ready`
/// reports false. Racing initializers block until the first finishes; a
/// failed initialization leaves the romanizer unpublished and is not retried
/// unless the caller calls an `init_*` method again.
#[derive(Debug, Default)]
pub struct Romanizer {
    table: OnceCell<RomanizationTable>,
}

impl Romanizer {
    /// An uninitialized romanizer.
    pub fn new() -> Self {
        Self {
            table: OnceCell::new(),
        }
    }

    /// A romanizer that is ready immediately.
    pub fn with_table(table: RomanizationTable) -> Self {
        Self {
            table: OnceCell::with_value(table),
        }
    }

    /// Publish the table produced by `loader`, unless one is already published.
    pub fn init_with<F>(&self, loader: F) -> anyhow::Result<&RomanizationTable>
    where
        F: FnOnce() -> anyhow::Result<RomanizationTable>,
    {
        self.table.get_or_try_init(loader).map_err(|e| {
            let reason = format!("{:#}", e);
            warn!(error = %reason, "romanization table unavailable, passing text through");
            e
        })
    }

    /// Publish the built-in table.
    pub fn init_builtin(&self) -> &RomanizationTable {
        self.table.get_or_init(RomanizationTable::builtin)
    }

    /// Run `init_with(loader)` on a background thread.
    ///
    /// Joining the handle yields whether the romanizer is ready afterwards.
    pub fn spawn_init<F>(self: &Arc<Self>, loader: F) -> JoinHandle<bool>
    where
        F: FnOnce() -> anyhow::Result<RomanizationTable> + Send + 'static,
    {
        let this = Arc::clone(self);
        std::thread::spawn(move || this.init_with(loader).is_ok())
    }

    pub fn is_ready(&self) -> bool {
        self.table.get().is_some()
    }

    pub fn table(&self) -> Option<&RomanizationTable> {
        self.table.get()
    }

    /// Romanize `text`, or return it unchanged when no table is published.
    pub fn romanize(&self, text: &str) -> String {
        match self.table.get() {
            Some(table) => table.romanize(text),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SAMPLE: &str = "\
# pinyin-data sample
U+4E2D: zhōng,zhòng  # 中
U+56FD: guó  # 国
U+7EFF: lǜ,lù  # 绿
U+9A6C: mǎ  # 马
broken line
U+ZZZZ: ?  # ?
";

    fn sample_table() -> RomanizationTable {
        RomanizationTable::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn parses_pinyin_data() {
        let t = sample_table();
        assert_eq!(t.len(), 4);
        assert_eq!(t.get('中'), Some("zhong"));
        assert_eq!(t.get('绿'), Some("lv"));
        assert_eq!(t.get('马'), Some("ma"));
    }

    #[test]
    fn empty_data_is_an_error() {
        assert!(RomanizationTable::from_reader("# nothing\n".as_bytes()).is_err());
    }

    #[test]
    fn romanize_mixed_text() {
        let t = sample_table();
        assert_eq!(t.romanize("中国"), "zhongguo");
        assert_eq!(t.romanize("C++中国"), "C++zhongguo");
        assert_eq!(t.romanize("中，国。"), "zhong，guo。");
        // unknown ideograph passes through
        assert_eq!(t.romanize("中华"), "zhong华");
        assert_eq!(t.romanize(""), "");
        assert_eq!(t.romanize("abc123"), "abc123");
    }

    #[test]
    fn builtin_table_covers_common_text() {
        let t = RomanizationTable::builtin();
        assert!(t.len() > 20_000);
        assert_eq!(t.romanize("马克思主义"), "makesizhuyi");
        assert_eq!(t.romanize("中国"), "zhongguo");
        assert!(t.romanize("理论").is_ascii());
    }

    #[test]
    fn ideographic_zero_is_romanized() {
        let t = RomanizationTable::builtin();
        assert_eq!(t.get('〇'), Some("ling"));
        assert_eq!(t.romanize("二〇二四年"), "erlingersinian");

        let mut small = sample_table();
        small.insert('〇', "ling");
        assert_eq!(small.romanize("中〇，国"), "zhongling，guo");
    }

    #[test]
    fn uninitialized_romanizer_echoes() {
        let r = Romanizer::new();
        assert!(!r.is_ready());
        assert_eq!(r.romanize("中国"), "中国");
    }

    #[test]
    fn failed_init_stays_degraded_until_retried() {
        let r = Romanizer::new();
        let err = r.init_with(|| bail!("missing resource"));
        assert!(err.is_err());
        assert!(!r.is_ready());
        assert_eq!(r.romanize("中国"), "中国");

        r.init_with(|| Ok(sample_table())).unwrap();
        assert!(r.is_ready());
        assert_eq!(r.romanize("中国"), "zhongguo");
    }

    #[test]
    fn concurrent_init_runs_loader_once() {
        let r = Arc::new(Romanizer::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let calls = Arc::clone(&calls);
                r.spawn_init(move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(sample_table())
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(r.romanize("马"), "ma");
    }

    #[test]
    fn bincode_snapshot_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.bincode");
        let t = sample_table();
        t.save_bincode(&path).unwrap();
        let back = RomanizationTable::load(&path).unwrap();
        assert_eq!(back, t);
    }
}
