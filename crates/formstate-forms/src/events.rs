//! Lifecycle events for scheduled validations.
//!
//! The manager publishes a [`ValidationEvent`] on its
//! [`events`](crate::manager::FormManager::events) signal whenever a
//! scheduled validation changes state. Nothing in the manager depends on
//! these; they exist for diagnostics and tests.

use std::time::Duration;

use serde::Serialize;

use crate::value::FieldId;

/// A state change of a scheduled validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ValidationEvent {
    /// A validation was scheduled for `field` after `delay`.
    Scheduled {
        /// The triggering field.
        field: FieldId,
        /// Generation of the new run.
        generation: u64,
        /// Debounce delay before the run starts.
        delay: Duration,
    },
    /// A pending or running validation was replaced by a newer one.
    Superseded {
        /// The triggering field.
        field: FieldId,
        /// Generation of the replaced run.
        generation: u64,
        /// Generation of the run that replaced it.
        superseded_by: u64,
    },
    /// A run finished and its results were applied.
    Completed {
        /// The triggering field.
        field: FieldId,
        /// Generation of the run.
        generation: u64,
    },
    /// A run stopped because its token was cancelled.
    Cancelled {
        /// The triggering field.
        field: FieldId,
        /// Generation of the run.
        generation: u64,
    },
    /// A validator failed.
    Failed {
        /// The triggering field.
        field: FieldId,
        /// Generation of the run.
        generation: u64,
        /// The error, rendered.
        message: String,
    },
    /// A result was dropped because the field changed while validating.
    StaleDiscarded {
        /// The validated field.
        field: FieldId,
        /// Revision the result was computed for.
        revision: u64,
    },
    /// A field's result was cleared because a field it reads changed.
    OutcomeCleared {
        /// The cleared field.
        field: FieldId,
    },
}

impl ValidationEvent {
    /// The field this event is about.
    pub const fn field(&self) -> &FieldId {
        match self {
            Self::Scheduled { field, .. }
            | Self::Superseded { field, .. }
            | Self::Completed { field, .. }
            | Self::Cancelled { field, .. }
            | Self::Failed { field, .. }
            | Self::StaleDiscarded { field, .. }
            | Self::OutcomeCleared { field } => field,
        }
    }

    /// A short, stable name for the event type.
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Scheduled { .. } => "scheduled",
            Self::Superseded { .. } => "superseded",
            Self::Completed { .. } => "completed",
            Self::Cancelled { .. } => "cancelled",
            Self::Failed { .. } => "failed",
            Self::StaleDiscarded { .. } => "stale_discarded",
            Self::OutcomeCleared { .. } => "outcome_cleared",
        }
    }
}
