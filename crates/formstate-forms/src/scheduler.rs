//! Where validations run, and which of them are still current.
//!
//! [`ExecutionContext`] is what the host hands the manager at
//! initialization: a runtime handle to spawn on and a root cancellation
//! token that stops everything when the form goes away.
//!
//! [`ValidationScheduler`] keeps one in-flight slot per triggering field.
//! Starting a new run for a field cancels the previous run for that same
//! field and hands out a fresh generation number; runs for different fields
//! never interfere with each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use formstate_core::{FormError, FormResult};

use crate::value::FieldId;

/// The runtime and lifetime a form manager's background work is bound to.
///
/// Cancelling the context's token cancels every pending and running
/// validation and stops the visibility debounce loop.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    handle: Handle,
    token: CancellationToken,
}

impl ExecutionContext {
    /// Binds to the tokio runtime the caller is running on.
    ///
    /// Fails with [`FormError::ConfigurationError`] outside a runtime.
    pub fn new(token: CancellationToken) -> FormResult<Self> {
        let handle = Handle::try_current().map_err(|e| {
            FormError::ConfigurationError(format!("No tokio runtime available: {e}"))
        })?;
        Ok(Self { handle, token })
    }

    /// Binds to the current runtime with a fresh root token.
    pub fn current() -> FormResult<Self> {
        Self::new(CancellationToken::new())
    }

    /// Builds a context from an explicit runtime handle.
    pub const fn from_parts(handle: Handle, token: CancellationToken) -> Self {
        Self { handle, token }
    }

    /// The runtime validations are spawned on.
    pub const fn handle(&self) -> &Handle {
        &self.handle
    }

    /// The root cancellation token.
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancels all work bound to this context.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Identifies one scheduled run.
#[derive(Debug, Clone)]
pub(crate) struct Ticket {
    pub(crate) generation: u64,
    pub(crate) token: CancellationToken,
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Per-field single-flight bookkeeping.
#[derive(Debug, Default)]
pub(crate) struct ValidationScheduler {
    slots: Mutex<HashMap<FieldId, InFlight>>,
    next_generation: AtomicU64,
}

impl ValidationScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Starts a new run for `field`, cancelling the previous one if any.
    ///
    /// Returns the ticket for the new run and the generation it replaced.
    pub(crate) fn begin(&self, field: &FieldId, parent: &CancellationToken) -> (Ticket, Option<u64>) {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = parent.child_token();

        let previous = self.slots.lock().expect("scheduler lock poisoned").insert(
            field.clone(),
            InFlight {
                generation,
                token: token.clone(),
            },
        );

        let superseded = previous.map(|prev| {
            prev.token.cancel();
            prev.generation
        });

        (Ticket { generation, token }, superseded)
    }

    /// Whether `generation` is still the latest run for `field`.
    pub(crate) fn is_current(&self, field: &str, generation: u64) -> bool {
        self.slots
            .lock()
            .expect("scheduler lock poisoned")
            .get(field)
            .is_some_and(|slot| slot.generation == generation)
    }

    /// Releases the slot for `field` if `generation` still owns it.
    pub(crate) fn finish(&self, field: &str, generation: u64) -> bool {
        let mut slots = self.slots.lock().expect("scheduler lock poisoned");
        if slots.get(field).is_some_and(|slot| slot.generation == generation) {
            slots.remove(field);
            true
        } else {
            false
        }
    }

    /// Cancels every pending and running validation. Returns how many.
    pub(crate) fn cancel_all(&self) -> usize {
        let drained: Vec<InFlight> = self
            .slots
            .lock()
            .expect("scheduler lock poisoned")
            .drain()
            .map(|(_, slot)| slot)
            .collect();
        for slot in &drained {
            slot.token.cancel();
        }
        drained.len()
    }

    /// Number of fields with a pending or running validation.
    pub(crate) fn in_flight(&self) -> usize {
        self.slots.lock().expect("scheduler lock poisoned").len()
    }
}
