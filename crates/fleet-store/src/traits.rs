use fleet_types::Result;

use crate::notifier::{Listener, Subscription};

/// String key-value substrate the entity store persists through.
///
/// Methods take `&self`; backends use interior mutability. Values are opaque
/// strings, the store never relies on a backend understanding JSON.
pub trait StoragePort {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Register a listener for writes made by *other* handles or processes.
    ///
    /// Writes through this handle never reach its own listeners.
    fn subscribe(&self, listener: Listener) -> Subscription;
}
