//! Replay-latest observable values.

use std::fmt;
use std::sync::Mutex;

use tokio::sync::watch;

use crate::signal::{Signal, SignalReceiver};

/// A value that pushes every change to its receivers.
///
/// Callback receivers registered with [`connect`](Observable::connect) are
/// called with the current value at connection time and then with every
/// subsequent update, in order. Async consumers can instead
/// [`subscribe`](Observable::subscribe) to a [`watch::Receiver`], which
/// always exposes the latest value but may coalesce intermediate updates
/// that were not observed in time.
///
/// Writers replace the value atomically: readers never see a half-applied
/// update. Writes and their callback dispatch are serialized, so with
/// several writing threads every callback still sees each value exactly
/// once, in the order the writes happened. A callback must not write to,
/// or connect to, the observable that is calling it.
///
/// # Examples
///
/// ```
/// use formstate_signals::Observable;
///
/// let count = Observable::new(1_u32);
/// let rx = count.subscribe();
/// count.update(|c| *c += 1);
/// assert_eq!(*rx.borrow(), 2);
/// assert_eq!(count.get(), 2);
/// ```
pub struct Observable<T: 'static> {
    sender: watch::Sender<T>,
    receivers: Signal<T>,
    dispatch: Mutex<()>,
}

impl<T: fmt::Debug + 'static> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.sender.borrow())
            .field("receivers", &self.receivers.receiver_count())
            .finish()
    }
}

impl<T: Default + Clone + Send + Sync + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    /// Creates an observable holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            sender: watch::Sender::new(initial),
            receivers: Signal::new(),
            dispatch: Mutex::new(()),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Runs `f` against the current value without cloning it.
    ///
    /// `f` must not write to this observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// Replaces the value and notifies every receiver. Returns the old value.
    pub fn set(&self, value: T) -> T {
        let _dispatch = self.lock_dispatch();
        let old = self.sender.send_replace(value);
        self.notify();
        old
    }

    /// Mutates the value in place and notifies every receiver.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let _dispatch = self.lock_dispatch();
        self.sender.send_modify(f);
        self.notify();
    }

    /// Mutates the value in place, notifying receivers only if `f` reports
    /// a modification. Returns what `f` returned.
    ///
    /// `f` runs while the value is locked, so concurrent writers are
    /// serialized through it.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let _dispatch = self.lock_dispatch();
        let modified = self.sender.send_if_modified(f);
        if modified {
            self.notify();
        }
        modified
    }

    /// Returns a receiver positioned at the current value.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    /// Connects a named callback receiver.
    ///
    /// The callback is called immediately with the current value. A
    /// receiver with the same ID is replaced.
    pub fn connect(&self, receiver_id: impl Into<String>, callback: SignalReceiver<T>) {
        let _dispatch = self.lock_dispatch();
        let current = self.get();
        callback(&current);
        self.receivers.connect(receiver_id, callback);
    }

    /// Disconnects the named callback receiver.
    pub fn disconnect(&self, receiver_id: &str) -> bool {
        self.receivers.disconnect(receiver_id)
    }

    /// Number of connected callback receivers (async subscribers excluded).
    pub fn receiver_count(&self) -> usize {
        self.receivers.receiver_count()
    }

    fn lock_dispatch(&self) -> std::sync::MutexGuard<'_, ()> {
        self.dispatch.lock().expect("observable lock poisoned")
    }

    /// Must be called with the dispatch lock held.
    fn notify(&self) {
        if self.receivers.receiver_count() == 0 {
            return;
        }
        let current = self.get();
        self.receivers.send(&current);
    }
}

impl<T: PartialEq + Clone + Send + Sync + 'static> Observable<T> {
    /// Replaces the value only if it differs from the current one.
    ///
    /// Returns `true` if the value changed and receivers were notified.
    pub fn set_if_changed(&self, value: T) -> bool {
        self.update_if(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_connect_replays_current_value() {
        let obs = Observable::new("draft".to_string());
        obs.set("final".to_string());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        obs.connect("view", Arc::new(move |v: &String| sink.lock().unwrap().push(v.clone())));

        assert_eq!(*seen.lock().unwrap(), vec!["final".to_string()]);
    }

    #[test]
    fn test_receivers_see_every_update_in_order() {
        let obs = Observable::new(0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        obs.connect("log", Arc::new(move |v: &i32| sink.lock().unwrap().push(*v)));

        obs.set(1);
        obs.update(|v| *v += 10);
        obs.set(2);

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 11, 2]);
    }

    #[test]
    fn test_set_if_changed_skips_duplicates() {
        let obs = Observable::new(false);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        obs.connect("log", Arc::new(move |v: &bool| sink.lock().unwrap().push(*v)));

        assert!(!obs.set_if_changed(false));
        assert!(obs.set_if_changed(true));
        assert!(!obs.set_if_changed(true));

        assert_eq!(*seen.lock().unwrap(), vec![false, true]);
    }

    #[test]
    fn test_set_returns_previous() {
        let obs = Observable::new(5);
        assert_eq!(obs.set(6), 5);
        assert_eq!(obs.get(), 6);
    }

    #[test]
    fn test_disconnect_stops_notifications() {
        let obs = Observable::new(0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        obs.connect("log", Arc::new(move |v: &i32| sink.lock().unwrap().push(*v)));
        assert_eq!(obs.receiver_count(), 1);

        assert!(obs.disconnect("log"));
        obs.set(1);
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn test_subscribe_observes_changes() {
        let obs = Arc::new(Observable::new(0));
        let mut rx = obs.subscribe();
        assert_eq!(*rx.borrow(), 0);

        let writer = obs.clone();
        tokio::spawn(async move {
            writer.set(42);
        });

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 42);
    }

    #[test]
    fn test_with_borrows() {
        let obs = Observable::new(vec![1, 2, 3]);
        assert_eq!(obs.with(Vec::len), 3);
    }
}
