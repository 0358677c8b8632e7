//! Key-value settings persistence.
//!
//! `LevelConfig` only needs "read a string" and "write a string", so the
//! seam is a small trait. Two backends are provided:
//! - `InMemorySettings`: thread-safe map, used in tests and as a fallback.
//! - `RedbSettings`: persistent, ACID-backed storage using `redb`.
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use ahash::AHashMap;
use anyhow::Context;

/// Simple string key-value storage for user settings.
pub trait SettingsStore {
    /// Read a value; `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn put(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        (**self).put(key, value)
    }
}

/// Thread-safe in-memory settings. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct InMemorySettings {
    inner: Arc<RwLock<AHashMap<String, String>>>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for InMemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.read().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Redb-backed settings.
pub struct RedbSettings {
    db: redb::Database,
    path: PathBuf,
}

impl RedbSettings {
    /// Table definition for settings. Keys and values are both strings.
    const TABLE_DEF: redb::TableDefinition<'static, &'static str, &'static str> =
        redb::TableDefinition::new("settings");

    /// Create or open a redb database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let db = redb::Database::create(path)
            .with_context(|| format!("open settings db {}", path.display()))?;
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self, key: &str) -> Result<Option<String>, redb::Error> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(Self::TABLE_DEF) {
            Ok(t) => t,
            // nothing written yet
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), redb::Error> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(Self::TABLE_DEF)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl std::fmt::Debug for RedbSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbSettings").field("path", &self.path).finish()
    }
}

impl SettingsStore for RedbSettings {
    fn get(&self, key: &str) -> Option<String> {
        match self.read(key) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read setting");
                None
            }
        }
    }

    fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.write(key, value)
            .with_context(|| format!("persist setting {}", key))
    }
}
