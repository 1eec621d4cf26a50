use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use fleet_types::Result;

use crate::notifier::{Listener, ListenerSet, Subscription};
use crate::traits::StoragePort;

#[derive(Default)]
struct Shared {
    values: HashMap<String, String>,
    next_handle: usize,
    handles: Vec<(usize, ListenerSet)>,
}

/// In-memory, map-backed storage.
///
/// Intended for tests and embedding. [`MemoryStorage::peer`] opens another
/// handle on the same values, the way a second browser tab sees the same
/// local storage: a write through one handle signals every other handle's
/// subscribers but not its own.
pub struct MemoryStorage {
    shared: Rc<RefCell<Shared>>,
    handle: usize,
    listeners: ListenerSet,
}

impl MemoryStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::attach(Rc::new(RefCell::new(Shared::default())))
    }

    fn attach(shared: Rc<RefCell<Shared>>) -> Self {
        let listeners = ListenerSet::new();
        let handle = {
            let mut inner = shared.borrow_mut();
            let handle = inner.next_handle;
            inner.next_handle += 1;
            inner.handles.push((handle, listeners.clone()));
            handle
        };
        Self {
            shared,
            handle,
            listeners,
        }
    }

    /// Open another handle on the same values.
    pub fn peer(&self) -> Self {
        Self::attach(Rc::clone(&self.shared))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MemoryStorage {
    fn drop(&mut self) {
        let handle = self.handle;
        self.shared
            .borrow_mut()
            .handles
            .retain(|(id, _)| *id != handle);
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.shared.borrow().values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let peers: Vec<ListenerSet> = {
            let mut inner = self.shared.borrow_mut();
            inner.values.insert(key.to_string(), value.to_string());
            inner
                .handles
                .iter()
                .filter(|(id, _)| *id != self.handle)
                .map(|(_, listeners)| listeners.clone())
                .collect()
        };

        for listeners in peers {
            listeners.emit();
        }
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.listeners.add(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_listener() -> (Rc<Cell<u32>>, Listener) {
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        (count, Rc::new(move || handle.set(handle.get() + 1)))
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("trucks").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let storage = MemoryStorage::new();
        storage.set("vans", "[]").unwrap();
        assert_eq!(storage.get("vans").unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.get("trucks").unwrap(), None);
    }

    #[test]
    fn test_peer_shares_values() {
        let storage = MemoryStorage::new();
        let peer = storage.peer();
        peer.set("trucks", "[1]").unwrap();
        assert_eq!(storage.get("trucks").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_write_signals_peers_only() {
        let storage = MemoryStorage::new();
        let peer = storage.peer();
        let (own, own_listener) = counting_listener();
        let (other, other_listener) = counting_listener();
        let _own_sub = storage.subscribe(own_listener);
        let _peer_sub = peer.subscribe(other_listener);

        storage.set("packages", "[]").unwrap();

        assert_eq!(own.get(), 0);
        assert_eq!(other.get(), 1);
    }

    #[test]
    fn test_dropped_peer_is_detached() {
        let storage = MemoryStorage::new();
        {
            let _peer = storage.peer();
            assert_eq!(storage.shared.borrow().handles.len(), 2);
        }
        assert_eq!(storage.shared.borrow().handles.len(), 1);
        storage.set("trucks", "[]").unwrap();
    }
}
