//! Persistent Preference Storage
//!
//! Key/value storage split into logical partitions (global settings, one
//! partition per profile, user presets). Values are strings, booleans or
//! integers; writes are atomic per key from the caller's perspective and a
//! partition can be deleted wholesale (profile reset).
//!
//! # Storage Locations
//! - Linux: `~/.config/clarion/prefs.json`
//! - Windows: `%APPDATA%\clarion\prefs.json`
//! - macOS: `~/Library/Application Support/clarion/prefs.json`

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{CoreResult, StoreError};

/// A single stored preference value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

type Partitions = HashMap<String, HashMap<String, PrefValue>>;

/// Key/value preference storage, partitioned
///
/// All components share one store instance; writes to a given key are
/// serialized by the implementation.
pub trait PrefStore: Send + Sync {
    fn get(&self, partition: &str, key: &str) -> Option<PrefValue>;

    fn put(&self, partition: &str, key: &str, value: PrefValue) -> CoreResult<()>;

    fn remove(&self, partition: &str, key: &str) -> CoreResult<()>;

    /// Delete a whole partition and everything in it
    fn clear_partition(&self, partition: &str) -> CoreResult<()>;

    /// Keys currently present in a partition
    fn keys(&self, partition: &str) -> Vec<String>;

    fn get_bool(&self, partition: &str, key: &str) -> Option<bool> {
        match self.get(partition, key) {
            Some(PrefValue::Bool(v)) => Some(v),
            _ => None,
        }
    }

    fn get_int(&self, partition: &str, key: &str) -> Option<i64> {
        match self.get(partition, key) {
            Some(PrefValue::Int(v)) => Some(v),
            _ => None,
        }
    }

    fn get_str(&self, partition: &str, key: &str) -> Option<String> {
        match self.get(partition, key) {
            Some(PrefValue::Str(v)) => Some(v),
            _ => None,
        }
    }

    fn put_bool(&self, partition: &str, key: &str, value: bool) -> CoreResult<()> {
        self.put(partition, key, PrefValue::Bool(value))
    }

    fn put_int(&self, partition: &str, key: &str, value: i64) -> CoreResult<()> {
        self.put(partition, key, PrefValue::Int(value))
    }

    fn put_str(&self, partition: &str, key: &str, value: &str) -> CoreResult<()> {
        self.put(partition, key, PrefValue::Str(value.to_string()))
    }
}

/// In-memory preference store for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryPrefs {
    data: RwLock<Partitions>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefStore for MemoryPrefs {
    fn get(&self, partition: &str, key: &str) -> Option<PrefValue> {
        self.data.read().get(partition)?.get(key).cloned()
    }

    fn put(&self, partition: &str, key: &str, value: PrefValue) -> CoreResult<()> {
        self.data
            .write()
            .entry(partition.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, partition: &str, key: &str) -> CoreResult<()> {
        if let Some(part) = self.data.write().get_mut(partition) {
            part.remove(key);
        }
        Ok(())
    }

    fn clear_partition(&self, partition: &str) -> CoreResult<()> {
        self.data.write().remove(partition);
        Ok(())
    }

    fn keys(&self, partition: &str) -> Vec<String> {
        self.data
            .read()
            .get(partition)
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// File-backed preference store
///
/// Loads once at construction (missing or corrupt files fall back to
/// empty), rewrites the whole file on every mutation.
pub struct JsonFilePrefs {
    path: PathBuf,
    data: RwLock<Partitions>,
}

impl JsonFilePrefs {
    /// Open the store at the platform-specific default location
    pub fn new() -> CoreResult<Self> {
        let path = Self::default_path()
            .ok_or_else(|| StoreError::Persistence("could not determine config path".into()))?;
        Ok(Self::with_path(path))
    }

    /// Open the store at an explicit path
    pub fn with_path(path: PathBuf) -> Self {
        let data = Self::load(&path);
        Self {
            path,
            data: RwLock::new(data),
        }
    }

    fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "clarion", "clarion")
            .map(|proj| proj.config_dir().join("prefs.json"))
    }

    /// Load preferences from disk, or return empty if missing/corrupt
    fn load(path: &PathBuf) -> Partitions {
        if path.exists() {
            match fs::File::open(path) {
                Ok(file) => match serde_json::from_reader(file) {
                    Ok(data) => {
                        info!("Preferences loaded from {:?}", path);
                        return data;
                    }
                    Err(e) => {
                        error!("Failed to parse preferences file: {}", e);
                    }
                },
                Err(e) => {
                    error!("Failed to open preferences file: {}", e);
                }
            }
        }

        info!("Using empty preferences");
        Partitions::default()
    }

    /// Write the full preference tree to disk
    fn save(&self) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Persistence(e.to_string()))?;
        }

        let file =
            fs::File::create(&self.path).map_err(|e| StoreError::Persistence(e.to_string()))?;
        serde_json::to_writer_pretty(file, &*self.data.read())
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        Ok(())
    }
}

impl PrefStore for JsonFilePrefs {
    fn get(&self, partition: &str, key: &str) -> Option<PrefValue> {
        self.data.read().get(partition)?.get(key).cloned()
    }

    fn put(&self, partition: &str, key: &str, value: PrefValue) -> CoreResult<()> {
        self.data
            .write()
            .entry(partition.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self.save()
    }

    fn remove(&self, partition: &str, key: &str) -> CoreResult<()> {
        let removed = match self.data.write().get_mut(partition) {
            Some(part) => part.remove(key).is_some(),
            None => false,
        };
        if removed {
            self.save()?;
        }
        Ok(())
    }

    fn clear_partition(&self, partition: &str) -> CoreResult<()> {
        let removed = self.data.write().remove(partition).is_some();
        if removed {
            self.save()?;
        } else {
            warn!("Cleared partition '{}' was already empty", partition);
        }
        Ok(())
    }

    fn keys(&self, partition: &str) -> Vec<String> {
        self.data
            .read()
            .get(partition)
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default()
    }
}
