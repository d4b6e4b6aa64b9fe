//! # formstate-signals
//!
//! Push-based state for formstate. Two primitives live here:
//!
//! - [`Signal`] dispatches transient events to named receivers, in
//!   connection order. Nothing is replayed to late receivers.
//! - [`Observable`] holds a current value. Every receiver immediately sees
//!   the current value and then every subsequent update. It is backed by a
//!   [`tokio::sync::watch`] channel so async code can also
//!   [`subscribe`](Observable::subscribe) and await changes.
//!
//! ## Usage
//!
//! ```
//! use formstate_signals::Observable;
//! use std::sync::{Arc, Mutex};
//!
//! let filled = Observable::new(false);
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//!
//! filled.connect("submit_button", Arc::new(move |v: &bool| sink.lock().unwrap().push(*v)));
//! filled.set(true);
//!
//! assert_eq!(*seen.lock().unwrap(), vec![false, true]);
//! ```

mod observable;
mod signal;

pub use observable::Observable;
pub use signal::{Signal, SignalReceiver};
