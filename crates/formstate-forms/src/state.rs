//! Shared, observable storage behind a form manager.
//!
//! Everything in here is internally synchronized so that the manager can be
//! driven from the host's thread while validations run on runtime workers.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use formstate_core::{FormError, FormResult};
use formstate_signals::Observable;

use crate::fields::FieldState;
use crate::validation::ValidationOutcome;
use crate::value::{FieldId, FieldValue};

/// The observable state of one field plus its bookkeeping.
///
/// The revision counter is bumped on every value change, under the same
/// lock that publishes the new state, so a validation that captured
/// `(value, revision)` can tell whether its result still applies.
pub(crate) struct FieldSlot {
    state: Observable<FieldState>,
    revision: AtomicU64,
    in_flight: AtomicUsize,
}

impl fmt::Debug for FieldSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSlot")
            .field("state", &self.state)
            .field("revision", &self.revision.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl FieldSlot {
    pub(crate) fn new(state: FieldState) -> Self {
        Self {
            state: Observable::new(state),
            revision: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) const fn observable(&self) -> &Observable<FieldState> {
        &self.state
    }

    pub(crate) fn state(&self) -> FieldState {
        self.state.get()
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&FieldState) -> R) -> R {
        self.state.with(f)
    }

    /// Replaces the whole state and starts a new revision.
    pub(crate) fn replace(&self, state: FieldState) {
        self.state.update(|current| {
            *current = state;
            self.revision.fetch_add(1, Ordering::SeqCst);
        });
    }

    /// The current value together with the revision it belongs to.
    pub(crate) fn snapshot(&self) -> (Option<FieldValue>, u64) {
        self.state
            .with(|s| (s.value.clone(), self.revision.load(Ordering::SeqCst)))
    }

    /// Stores `outcome` if the value has not changed since `revision`.
    ///
    /// Returns `false` if the outcome was stale and dropped.
    pub(crate) fn store_outcome(&self, outcome: ValidationOutcome, revision: u64) -> bool {
        let mut stored = false;
        self.state.update_if(|s| {
            if self.revision.load(Ordering::SeqCst) != revision {
                return false;
            }
            stored = true;
            if s.validation_result.as_ref() == Some(&outcome) {
                false
            } else {
                s.validation_result = Some(outcome);
                true
            }
        });
        stored
    }

    /// Unconditionally sets the validation result, leaving the value alone.
    ///
    /// Starts a new revision, so results of validations that began before
    /// the override are dropped as stale.
    pub(crate) fn force_outcome(&self, outcome: ValidationOutcome) {
        self.state.update_if(|s| {
            self.revision.fetch_add(1, Ordering::SeqCst);
            if s.validation_result.as_ref() == Some(&outcome) {
                false
            } else {
                s.validation_result = Some(outcome);
                true
            }
        });
    }

    /// Clears the validation result. Returns `true` if there was one.
    pub(crate) fn clear_outcome(&self) -> bool {
        self.state.update_if(|s| s.validation_result.take().is_some())
    }

    /// Marks the field as being validated until the guard is dropped.
    pub(crate) fn begin_validation(&self) -> FieldProgress<'_> {
        self.shift_in_flight(true);
        FieldProgress { slot: self }
    }

    fn shift_in_flight(&self, enter: bool) {
        self.state.update_if(|s| {
            let active = if enter {
                self.in_flight.fetch_add(1, Ordering::SeqCst) + 1
            } else {
                self.in_flight.fetch_sub(1, Ordering::SeqCst) - 1
            };
            let busy = active > 0;
            if s.validation_in_progress == busy {
                false
            } else {
                s.validation_in_progress = busy;
                true
            }
        });
    }
}

/// Keeps a field's `validation_in_progress` flag raised while alive.
pub(crate) struct FieldProgress<'a> {
    slot: &'a FieldSlot,
}

impl Drop for FieldProgress<'_> {
    fn drop(&mut self) {
        self.slot.shift_in_flight(false);
    }
}

/// Every field slot of a form, keyed by id. The key set never changes.
#[derive(Debug, Default)]
pub(crate) struct FieldStore {
    slots: HashMap<FieldId, FieldSlot>,
}

impl FieldStore {
    pub(crate) fn from_states(states: impl IntoIterator<Item = (FieldId, FieldState)>) -> Self {
        Self {
            slots: states
                .into_iter()
                .map(|(id, state)| (id, FieldSlot::new(state)))
                .collect(),
        }
    }

    pub(crate) fn get(&self, id: &str) -> Option<&FieldSlot> {
        self.slots.get(id)
    }

    pub(crate) fn slot(&self, id: &str) -> FormResult<&FieldSlot> {
        self.get(id)
            .ok_or_else(|| FormError::UnknownField(id.to_string()))
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

/// Current visibility of every field.
#[derive(Debug, Default)]
pub(crate) struct VisibilityMap {
    visible: RwLock<HashMap<FieldId, bool>>,
}

impl VisibilityMap {
    pub(crate) fn new(initial: impl IntoIterator<Item = (FieldId, bool)>) -> Self {
        Self {
            visible: RwLock::new(initial.into_iter().collect()),
        }
    }

    /// Unknown ids read as visible.
    pub(crate) fn is_visible(&self, id: &str) -> bool {
        self.visible
            .read()
            .expect("visibility lock poisoned")
            .get(id)
            .copied()
            .unwrap_or(true)
    }

    /// Records a visibility. Returns `true` if it differs from the previous one.
    pub(crate) fn set(&self, id: &FieldId, visible: bool) -> bool {
        let mut map = self.visible.write().expect("visibility lock poisoned");
        map.insert(id.clone(), visible) != Some(visible)
    }
}

/// Counts overlapping units of work behind a single observable flag.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    flag: Observable<bool>,
    active: AtomicUsize,
}

impl ProgressTracker {
    pub(crate) fn new() -> Self {
        Self {
            flag: Observable::new(false),
            active: AtomicUsize::new(0),
        }
    }

    pub(crate) const fn flag(&self) -> &Observable<bool> {
        &self.flag
    }

    pub(crate) fn is_active(&self) -> bool {
        self.flag.get()
    }

    /// Raises the flag until the returned guard is dropped.
    pub(crate) fn enter(self: &Arc<Self>) -> ProgressGuard {
        self.shift(true);
        ProgressGuard {
            tracker: Arc::clone(self),
        }
    }

    fn shift(&self, enter: bool) {
        self.flag.update_if(|flag| {
            let active = if enter {
                self.active.fetch_add(1, Ordering::SeqCst) + 1
            } else {
                self.active.fetch_sub(1, Ordering::SeqCst) - 1
            };
            let busy = active > 0;
            if *flag == busy {
                false
            } else {
                *flag = busy;
                true
            }
        });
    }
}

/// Keeps a [`ProgressTracker`] raised while alive. Owned, so it can move
/// into a spawned task.
#[derive(Debug)]
pub(crate) struct ProgressGuard {
    tracker: Arc<ProgressTracker>,
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.tracker.shift(false);
    }
}
