//! Persistent store for trucks, vans and packages
//!
//! All state lives behind a [`StoragePort`]: a string key-value substrate
//! holding three JSON collections (`trucks`, `vans`, `packages`). The
//! [`EntityStore`] is the only component that reads or writes them.
//!
//! Backends:
//!
//! - [`MemoryStorage`] -- map-backed, with peer handles standing in for other tabs
//! - [`FileStorage`] -- one JSON file per key in a data directory
//!
//! Every successful mutation is broadcast on the [`ChangeNotifier`]'s local
//! channel; writes made through another handle or process arrive on the
//! cross-process channel. Neither carries a payload.

pub mod entity;
pub mod file;
pub mod memory;
pub mod notifier;
pub mod seed;
pub mod traits;

pub use entity::{EntityStore, PACKAGES_KEY};
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use notifier::{Channel, ChangeNotifier, Listener, ListenerSet, Subscription};
pub use traits::StoragePort;
