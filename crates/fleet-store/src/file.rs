//! File-backed storage: one `<key>.json` file per key

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use fleet_types::Result;

use crate::notifier::{Listener, ListenerSet, Subscription};
use crate::traits::StoragePort;

/// Persistent storage in a data directory.
///
/// Each handle remembers a fingerprint of every file it has written or
/// signalled. A read records one only for a key seen for the first time, so
/// reading a rewritten file never hides the change from [`FileStorage::poll`],
/// which compares against disk and signals subscribers.
pub struct FileStorage {
    data_dir: PathBuf,
    fingerprints: RefCell<HashMap<String, Option<String>>>,
    listeners: ListenerSet,
}

impl FileStorage {
    /// Create or open a storage directory
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            fingerprints: RefCell::new(HashMap::new()),
            listeners: ListenerSet::new(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file holding `key`
    pub fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid storage key: {:?}", key),
            )
            .into());
        }
        Ok(self.data_dir.join(format!("{}.json", key)))
    }

    /// Compute a content fingerprint
    fn fingerprint(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn read_file(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check every known key against disk.
    ///
    /// Returns `true` and signals subscribers once if any file changed since
    /// this handle last saw it.
    pub fn poll(&self) -> Result<bool> {
        let keys: Vec<String> = self.fingerprints.borrow().keys().cloned().collect();

        let mut changed = Vec::new();
        for key in keys {
            let current = Self::read_file(&self.key_path(&key)?)?
                .map(|content| Self::fingerprint(&content));
            let mut fingerprints = self.fingerprints.borrow_mut();
            if fingerprints.get(&key) != Some(&current) {
                fingerprints.insert(key.clone(), current);
                changed.push(key);
            }
        }

        if changed.is_empty() {
            return Ok(false);
        }
        debug!(keys = ?changed, "storage changed on disk");
        self.listeners.emit();
        Ok(true)
    }
}

impl StoragePort for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let content = Self::read_file(&self.key_path(key)?)?;
        self.fingerprints
            .borrow_mut()
            .entry(key.to_string())
            .or_insert_with(|| content.as_deref().map(Self::fingerprint));
        Ok(content)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let file = File::create(self.key_path(key)?)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(value.as_bytes())?;
        writer.flush()?;

        self.fingerprints
            .borrow_mut()
            .insert(key.to_string(), Some(Self::fingerprint(value)));
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.listeners.add(listener)
    }
}
