//! # formstate-forms
//!
//! Form-state and validation orchestration. A [`FormManager`] tracks the
//! value, validation result, and visibility of a closed set of fields,
//! derives a dependency graph from validator metadata, and drives
//! validation on demand or automatically under a [`ValidationStrategy`].
//!
//! ## Modules
//!
//! - [`value`] - Field ids and typed field values
//! - [`validation`] - The validator contract and outcomes
//! - [`validators`] - Ready-made validators
//! - [`fields`] - Field descriptors and observable field state
//! - [`registry`] - Field registry and dependency graph
//! - [`scheduler`] - Execution context and per-field single-flight scheduling
//! - [`events`] - Lifecycle events of scheduled validations
//! - [`manager`] - The form manager
//! - [`handle`] - Per-field handles for widgets
//!
//! [`ValidationStrategy`]: formstate_core::ValidationStrategy

pub mod events;
pub mod fields;
pub mod handle;
pub mod manager;
pub mod registry;
pub mod scheduler;
mod state;
pub mod validation;
pub mod validators;
pub mod value;

pub use events::ValidationEvent;
pub use fields::{FieldDescriptor, FieldState};
pub use handle::FieldHandle;
pub use manager::{ErrorHandler, FormManager};
pub use registry::FieldRegistry;
pub use scheduler::ExecutionContext;
pub use validation::{FieldValues, Invalid, ValidationOutcome, ValidationScope, Validator, ValidatorMeta};
pub use value::{FieldId, FieldValue, FromFieldValue, ValueKind};

pub use tokio_util::sync::CancellationToken;

/// Everything needed to declare and drive a form.
pub mod prelude {
    pub use crate::fields::{FieldDescriptor, FieldState};
    pub use crate::handle::FieldHandle;
    pub use crate::manager::{ErrorHandler, FormManager};
    pub use crate::scheduler::ExecutionContext;
    pub use crate::validation::{
        FieldValues, Invalid, ValidationOutcome, ValidationScope, Validator, ValidatorMeta,
    };
    pub use crate::validators::{EqualsTo, FnValidator, MaxLength, MinLength, Pattern, Range, Required};
    pub use crate::value::{FieldId, FieldValue, ValueKind};
    pub use formstate_core::{FormError, FormResult, ValidationStrategy, ValidatorError};
    pub use tokio_util::sync::CancellationToken;
}
