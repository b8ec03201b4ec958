//! Local key/value media for wallet records.
//!
//! The wallet store never reaches for an ambient medium; one of these is
//! injected. `NullStore` stands in where no durable medium exists.

use dashmap::DashMap;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors writing to a storage medium.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// String-to-string medium shared by every wallet record.
///
/// Reads are infallible: an unreadable entry is indistinguishable from a
/// missing one to callers.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String) -> StorageResult<()>;

    fn remove(&self, key: &str) -> StorageResult<()>;

    fn keys(&self) -> Vec<String>;

    /// `false` for media that silently drop writes.
    fn is_available(&self) -> bool {
        true
    }
}

/// In-process medium.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|r| r.value().clone())
    }

    fn set(&self, key: &str, value: String) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|r| r.key().clone()).collect()
    }
}

/// Medium persisted as one JSON object file, rewritten after every mutation.
#[derive(Debug)]
pub struct FileStore {
    entries: DashMap<String, String>,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the file at `path`, loading existing entries if it exists.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = DashMap::new();

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let map: HashMap<String, String> = serde_json::from_reader(reader)?;
            for (k, v) in map {
                entries.insert(k, v);
            }
            tracing::info!(path = %path.display(), entries = entries.len(), "Loaded wallet storage file");
        }

        Ok(Self {
            entries,
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a snapshot of the entries, write it, then commit.
    ///
    /// The in-memory map only changes once the file holds the new state.
    fn write_through<F>(&self, change: F) -> StorageResult<()>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut map: HashMap<String, String> = self
            .entries
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        change(&mut map);
        self.write_file(&map)?;

        self.entries.retain(|k, _| map.contains_key(k));
        for (k, v) in map {
            self.entries.insert(k, v);
        }
        Ok(())
    }

    /// Write `map` to a sibling temp file, then rename over the target.
    fn write_file(&self, map: &HashMap<String, String>) -> StorageResult<()> {
        let tmp = self.path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, map)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = %self.path.display(), entries = map.len(), "Flushed wallet storage file");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|r| r.value().clone())
    }

    fn set(&self, key: &str, value: String) -> StorageResult<()> {
        self.write_through(|map| {
            map.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        if !self.entries.contains_key(key) {
            return Ok(());
        }
        self.write_through(|map| {
            map.remove(key);
        })
    }

    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|r| r.key().clone()).collect()
    }
}

/// Medium for contexts without durable client storage. Drops every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl KeyValueStore for NullStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: String) -> StorageResult<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn is_available(&self) -> bool {
        false
    }
}
