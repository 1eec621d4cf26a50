//! Payload-free change broadcasting

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

/// Callback invoked on every broadcast. Receives nothing; re-query the store.
pub type Listener = Rc<dyn Fn()>;

/// Handle returned by every `subscribe` call.
///
/// `unsubscribe` removes exactly the listeners this handle registered and may
/// be called any number of times. Dropping the handle leaves them registered.
#[must_use = "keep the handle to unsubscribe later"]
pub struct Subscription {
    cancels: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancels: RefCell::new(vec![Box::new(cancel)]),
        }
    }

    /// Combine two handles so one `unsubscribe` releases both
    pub fn join(self, other: Subscription) -> Self {
        self.cancels
            .borrow_mut()
            .extend(other.cancels.into_inner());
        self
    }

    pub fn unsubscribe(&self) {
        let cancels = std::mem::take(&mut *self.cancels.borrow_mut());
        for cancel in cancels {
            cancel();
        }
    }

    /// Whether `unsubscribe` still has anything to release
    pub fn is_active(&self) -> bool {
        !self.cancels.borrow().is_empty()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Ordered set of listeners with fan-out delivery.
///
/// Cloning yields another handle on the same set.
#[derive(Clone, Default)]
pub struct ListenerSet {
    registry: Rc<RefCell<Registry>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Listener) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, listener));
            id
        };

        let registry: Weak<RefCell<Registry>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .borrow_mut()
                    .listeners
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    /// Call every listener registered at the time of the call.
    /// Returns the number of listeners called.
    pub fn emit(&self) -> usize {
        // Snapshot so listeners may (un)subscribe while being called
        let listeners: Vec<Listener> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in &listeners {
            listener();
        }
        listeners.len()
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Broadcast channel kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Mutation made through this process's store
    Local,
    /// Storage rewritten by another handle or process
    CrossProcess,
}

/// Process-wide bus carrying "data changed" signals on two channels.
///
/// Clones share listeners, so one notifier can be handed to several stores.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    local: ListenerSet,
    cross_process: ListenerSet,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn channel(&self, channel: Channel) -> &ListenerSet {
        match channel {
            Channel::Local => &self.local,
            Channel::CrossProcess => &self.cross_process,
        }
    }

    /// Subscribe one listener to both channels
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let listener: Listener = Rc::new(listener);
        self.local
            .add(Rc::clone(&listener))
            .join(self.cross_process.add(listener))
    }

    pub fn subscribe_channel(
        &self,
        channel: Channel,
        listener: impl Fn() + 'static,
    ) -> Subscription {
        self.channel(channel).add(Rc::new(listener))
    }

    /// Broadcast on `channel`, returning how many listeners were called
    pub fn publish(&self, channel: Channel) -> usize {
        let delivered = self.channel(channel).emit();
        trace!(?channel, delivered, "change broadcast");
        delivered
    }

    pub fn listener_count(&self, channel: Channel) -> usize {
        self.channel(channel).len()
    }
}
