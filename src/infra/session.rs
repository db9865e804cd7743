//! Durable key/value storage for the session.
//!
//! Plays the role browser-local storage plays for a web client: a handful of
//! string values under fixed keys that survive a restart.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::util::lock::mutex_lock;

use super::error::InfraError;

const SOURCE: &str = "infra::session";

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the serialized user record.
pub const USER_KEY: &str = "user";

pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, InfraError>;
    fn set(&self, key: &str, value: &str) -> Result<(), InfraError>;
    fn remove(&self, key: &str) -> Result<(), InfraError>;
}

/// JSON object persisted in a single file.
///
/// The file is rewritten on every change; a missing file reads as empty. Reads
/// of a file that is not a JSON object fail, while writes replace it.
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, InfraError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|err| {
                InfraError::storage(format!(
                    "failed to parse {}: {err}",
                    self.path.display()
                ))
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(InfraError::Io(err)),
        }
    }

    /// Current values for a write. Unparseable content is discarded so the
    /// write replaces it; the flag reports whether that happened.
    fn load_for_write(&self) -> Result<(BTreeMap<String, String>, bool), InfraError> {
        match self.load() {
            Ok(values) => Ok((values, false)),
            Err(InfraError::Storage { message }) => {
                warn!(
                    path = %self.path.display(),
                    error = %message,
                    "replacing unreadable session file"
                );
                Ok((BTreeMap::new(), true))
            }
            Err(err) => Err(err),
        }
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), InfraError> {
        if values.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(InfraError::Io(err)),
            };
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(values)
            .map_err(|err| InfraError::storage(format!("failed to encode session: {err}")))?;
        fs::write(&self.path, raw)?;
        debug!(path = %self.path.display(), keys = values.len(), "session file written");
        Ok(())
    }
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, InfraError> {
        let _guard = mutex_lock(&self.guard, SOURCE, "file.get");
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), InfraError> {
        let _guard = mutex_lock(&self.guard, SOURCE, "file.set");
        let (mut values, _) = self.load_for_write()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<(), InfraError> {
        let _guard = mutex_lock(&self.guard, SOURCE, "file.remove");
        let (mut values, reset) = self.load_for_write()?;
        if values.remove(key).is_none() && !reset {
            return Ok(());
        }
        self.save(&values)
    }
}

/// Process-local storage, for tests and embedders without a writable disk.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, InfraError> {
        Ok(mutex_lock(&self.values, SOURCE, "memory.get").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), InfraError> {
        mutex_lock(&self.values, SOURCE, "memory.set").insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), InfraError> {
        mutex_lock(&self.values, SOURCE, "memory.remove").remove(key);
        Ok(())
    }
}
