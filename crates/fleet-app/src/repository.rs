//! Repository adapters for persistence layer

use std::path::PathBuf;

use fleet_store::{EntityStore, FileStorage, MemoryStorage, StoragePort};
use fleet_types::Result;

use crate::config::Config;

/// Open the file-backed entity store configured for this user
pub fn open_entity_store(config: &Config) -> Result<EntityStore<FileStorage>> {
    let data_dir = config.data_dir()?;
    open_entity_store_at(data_dir, config.seed)
}

/// Open the file-backed entity store at a custom directory
pub fn open_entity_store_at(data_dir: PathBuf, seed: Option<u64>) -> Result<EntityStore<FileStorage>> {
    let storage = FileStorage::open(data_dir)?;
    open_with(storage, seed)
}

/// Open an in-memory entity store, seeded on creation
pub fn open_memory_store(seed: Option<u64>) -> Result<EntityStore<MemoryStorage>> {
    open_with(MemoryStorage::new(), seed)
}

fn open_with<S: StoragePort>(storage: S, seed: Option<u64>) -> Result<EntityStore<S>> {
    match seed {
        Some(seed) => EntityStore::open_seeded(storage, seed),
        None => EntityStore::open(storage),
    }
}
