//! Named-receiver event dispatch.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The type signature for a receiver callback.
///
/// Receivers must be `Send + Sync` so that events can be dispatched from
/// whichever task produced them.
pub type SignalReceiver<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// An event channel that can be connected to and dispatched.
///
/// Each signal carries a payload type `T`. Receivers are called in the order
/// they were connected. Dispatch works on a snapshot of the receiver list,
/// so a receiver may connect or disconnect receivers (itself included)
/// while it is being called; the change applies from the next event.
///
/// # Examples
///
/// ```
/// use formstate_signals::Signal;
/// use std::sync::Arc;
///
/// let signal: Signal<String> = Signal::new();
///
/// signal.connect("logger", Arc::new(|msg: &String| {
///     println!("Received: {msg}");
/// }));
///
/// assert_eq!(signal.send(&"hello".to_string()), 1);
/// ```
pub struct Signal<T: 'static> {
    receivers: RwLock<Vec<Receiver<T>>>,
}

struct Receiver<T: 'static> {
    id: String,
    callback: SignalReceiver<T>,
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("receivers", &self.receiver_ids())
            .finish()
    }
}

impl<T: 'static> Signal<T> {
    /// Creates a new signal with no connected receivers.
    pub const fn new() -> Self {
        Self {
            receivers: RwLock::new(Vec::new()),
        }
    }

    /// Connects a receiver under `receiver_id`.
    ///
    /// Reconnecting an existing id swaps its callback without moving it in
    /// the dispatch order.
    pub fn connect(&self, receiver_id: impl Into<String>, callback: SignalReceiver<T>) {
        let id = receiver_id.into();
        let mut receivers = self.write();
        match receivers.iter().position(|r| r.id == id) {
            Some(index) => receivers[index].callback = callback,
            None => receivers.push(Receiver { id, callback }),
        }
    }

    /// Disconnects `receiver_id`. Returns `false` if it was not connected.
    pub fn disconnect(&self, receiver_id: &str) -> bool {
        let mut receivers = self.write();
        receivers
            .iter()
            .position(|r| r.id == receiver_id)
            .map(|index| receivers.remove(index))
            .is_some()
    }

    /// Whether a receiver is connected under `receiver_id`.
    pub fn is_connected(&self, receiver_id: &str) -> bool {
        self.read().iter().any(|r| r.id == receiver_id)
    }

    /// Calls every receiver with `event`. Returns how many were called.
    pub fn send(&self, event: &T) -> usize {
        let callbacks: Vec<SignalReceiver<T>> =
            self.read().iter().map(|r| Arc::clone(&r.callback)).collect();
        for callback in &callbacks {
            callback(event);
        }
        callbacks.len()
    }

    /// Number of connected receivers.
    pub fn receiver_count(&self) -> usize {
        self.read().len()
    }

    /// Connected receiver ids, in dispatch order.
    pub fn receiver_ids(&self) -> Vec<String> {
        self.read().iter().map(|r| r.id.clone()).collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Receiver<T>>> {
        self.receivers.read().expect("signal lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Receiver<T>>> {
        self.receivers.write().expect("signal lock poisoned")
    }
}
