//! Durable key/value records for the active state and saved projects.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::PricingError;

pub const ACTIVE_STATE_KEY: &str = "valora_pricing";
pub const PROJECTS_KEY: &str = "valora_projects";

pub trait KeyValueStore {
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    /// Replaces the whole record.
    fn write(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// One `<key>.json` file per record inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage under the platform data directory.
    pub fn platform_default() -> Option<Self> {
        ProjectDirs::from("com", "Valora", "ValoraPricing").map(|dirs| Self::new(dirs.data_dir()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn with_record(mut self, key: &str, value: &str) -> Self {
        self.records.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.records.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads a record, falling back to `T::default()` when it is missing or
/// cannot be parsed. Corruption is only logged.
pub fn read_record<T, S>(storage: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match try_read_record(storage, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            warn!(error = %e, "discarding stored record");
            T::default()
        }
    }
}

fn try_read_record<T, S>(storage: &S, key: &str) -> Result<Option<T>, PricingError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let corrupt = |reason: String| PricingError::PersistenceCorrupt {
        key: key.to_string(),
        reason,
    };
    let Some(raw) = storage.read(key).map_err(|e| corrupt(e.to_string()))? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| corrupt(e.to_string()))
}

/// Serializes and writes a record. Failures are logged and dropped.
pub fn write_record<T, S>(storage: &mut S, key: &str, value: &T)
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let result = serde_json::to_string(value)
        .map_err(io::Error::from)
        .and_then(|payload| storage.write(key, &payload));
    if let Err(e) = result {
        warn!(%key, error = %e, "failed to persist record");
    }
}
