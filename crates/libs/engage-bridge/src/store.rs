use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Named on-device key-value storage surviving process restarts. The bridge
/// keeps exactly one string set in it: the permissions already presented to
/// the user.
pub trait PreferenceStore: Send + Sync {
    fn string_set(&self, key: &str) -> BTreeSet<String>;

    fn put_string_set(&self, key: &str, values: &BTreeSet<String>) -> Result<(), StoreError>;
}

/// File-backed preference store: one JSON object of string sets, rewritten
/// whole on every put. Small enough that atomicity beyond
/// write-then-rename is not worth carrying.
pub struct FilePreferenceStore {
    path: PathBuf,
    // Serializes read-modify-write cycles between threads of this process.
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, BTreeSet<String>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return BTreeMap::new(),
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            log::warn!("preference store at {} is corrupt, starting empty: {err}", self.path.display());
            BTreeMap::new()
        })
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn string_set(&self, key: &str) -> BTreeSet<String> {
        self.load().remove(key).unwrap_or_default()
    }

    fn put_string_set(&self, key: &str, values: &BTreeSet<String>) -> Result<(), StoreError> {
        let guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut entries = self.load();
        entries.insert(key.to_string(), values.clone());
        let serialized = serde_json::to_string_pretty(&entries)
            .map_err(|err| StoreError::new(format!("serialize preferences: {err}")))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| StoreError::new(format!("create preference dir: {err}")))?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serialized)
            .map_err(|err| StoreError::new(format!("write preferences: {err}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|err| StoreError::new(format!("commit preferences: {err}")))?;
        drop(guard);
        Ok(())
    }
}
