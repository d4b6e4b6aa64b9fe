//! The validator contract.
//!
//! A [`Validator`] is an async function from a field's current value to a
//! [`ValidationOutcome`]. It receives a [`ValidationScope`] carrying a
//! read-only [`FieldValues`] accessor (for cross-field rules) and a
//! cancellation token. Structural facts the manager needs, such as whether
//! the validator demands a value or which other fields it reads, are
//! declared up front through [`ValidatorMeta`] rather than discovered by
//! inspecting concrete types.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use formstate_core::{FormError, FormResult, ValidatorError};

use crate::fields::FieldState;
use crate::state::FieldStore;
use crate::value::{FieldId, FieldValue, FromFieldValue};

/// Why a value was rejected.
///
/// Messages are opaque identifiers for the host application to translate;
/// arguments are positional (e.g. the bounds of a range).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum Invalid {
    /// Rejected without a field-level explanation.
    Unknown,
    /// Rejected with a message identifier.
    Message(String),
    /// Rejected with a message identifier and interpolation arguments.
    MessageWithArgs(String, Vec<FieldValue>),
}

impl Invalid {
    /// The message identifier, if any.
    pub fn message_id(&self) -> Option<&str> {
        match self {
            Self::Unknown => None,
            Self::Message(id) | Self::MessageWithArgs(id, _) => Some(id.as_str()),
        }
    }

    /// The interpolation arguments (empty unless `MessageWithArgs`).
    pub fn args(&self) -> &[FieldValue] {
        match self {
            Self::MessageWithArgs(_, args) => args.as_slice(),
            Self::Unknown | Self::Message(_) => &[],
        }
    }
}

/// The result of validating a value.
///
/// # Examples
///
/// ```
/// use formstate_forms::validation::{Invalid, ValidationOutcome};
/// use formstate_forms::value::FieldValue;
///
/// let outcome = ValidationOutcome::message_with_args(
///     "validation.range",
///     vec![FieldValue::Int(18), FieldValue::Int(65)],
/// );
/// assert!(outcome.is_invalid());
/// assert_eq!(outcome.message_id(), Some("validation.range"));
/// assert_eq!(outcome.args(), &[FieldValue::Int(18), FieldValue::Int(65)]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "invalid", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// The value is acceptable.
    Valid,
    /// The value was rejected.
    Invalid(Invalid),
}

impl ValidationOutcome {
    /// Shorthand for `Invalid(Invalid::Unknown)`.
    pub const fn unknown() -> Self {
        Self::Invalid(Invalid::Unknown)
    }

    /// Shorthand for `Invalid(Invalid::Message(id))`.
    pub fn message(id: impl Into<String>) -> Self {
        Self::Invalid(Invalid::Message(id.into()))
    }

    /// Shorthand for `Invalid(Invalid::MessageWithArgs(id, args))`.
    pub fn message_with_args(id: impl Into<String>, args: Vec<FieldValue>) -> Self {
        Self::Invalid(Invalid::MessageWithArgs(id.into(), args))
    }

    /// Returns `true` for [`ValidationOutcome::Valid`].
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns `true` for any [`ValidationOutcome::Invalid`].
    pub const fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// The message identifier of an invalid outcome.
    pub fn message_id(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(invalid) => invalid.message_id(),
        }
    }

    /// The interpolation arguments of an invalid outcome.
    pub fn args(&self) -> &[FieldValue] {
        match self {
            Self::Valid => &[],
            Self::Invalid(invalid) => invalid.args(),
        }
    }
}

/// Structural metadata a validator declares about itself.
///
/// The manager reads this once, at construction, to build the required-field
/// set and the dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorMeta {
    /// The validator rejects absent or blank values.
    pub is_required: bool,
    /// Other fields whose values this validator reads.
    pub connected_fields: Vec<FieldId>,
}

impl ValidatorMeta {
    /// Metadata for a validator that demands a value.
    pub fn required() -> Self {
        Self {
            is_required: true,
            connected_fields: Vec::new(),
        }
    }

    /// Metadata for a validator that reads one other field.
    pub fn connected_to(field: impl Into<FieldId>) -> Self {
        Self {
            is_required: false,
            connected_fields: vec![field.into()],
        }
    }

    /// Metadata for a validator that reads several other fields.
    pub fn connected_to_all<I, F>(fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldId>,
    {
        Self {
            is_required: false,
            connected_fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// A rule applied to a field's value.
///
/// Validators must be pure with respect to the form: they may read other
/// fields through [`ValidationScope::values`] but must never call back into
/// the manager's mutating operations. Long-running validators (network
/// lookups and the like) should race their work against
/// [`ValidationScope::cancelled`] and return [`ValidatorError::Cancelled`]
/// when it fires.
#[async_trait]
pub trait Validator: Send + Sync + fmt::Debug {
    /// Validates `value` (`None` when the field is empty).
    async fn validate(
        &self,
        value: Option<&FieldValue>,
        scope: &ValidationScope,
    ) -> Result<ValidationOutcome, ValidatorError>;

    /// Structural metadata. The default declares nothing.
    fn meta(&self) -> ValidatorMeta {
        ValidatorMeta::default()
    }

    /// Returns a human-readable name for this validator.
    fn name(&self) -> &str;
}

/// Read-only access to the current values of a form's fields.
///
/// This is the only view of the form a validator gets.
#[derive(Clone)]
pub struct FieldValues {
    store: Arc<FieldStore>,
}

impl fmt::Debug for FieldValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValues")
            .field("fields", &self.store.len())
            .finish()
    }
}

impl FieldValues {
    pub(crate) const fn new(store: Arc<FieldStore>) -> Self {
        Self { store }
    }

    /// Builds an accessor over a fixed set of values, detached from any
    /// manager. Useful for exercising validators on their own.
    ///
    /// # Examples
    ///
    /// ```
    /// use formstate_forms::validation::FieldValues;
    /// use formstate_forms::value::FieldValue;
    ///
    /// let values = FieldValues::detached([("password", Some(FieldValue::from("hunter2")))]);
    /// assert_eq!(values.get("password").unwrap(), Some(FieldValue::from("hunter2")));
    /// assert!(values.get("nope").is_err());
    /// ```
    pub fn detached<I, F>(values: I) -> Self
    where
        I: IntoIterator<Item = (F, Option<FieldValue>)>,
        F: Into<FieldId>,
    {
        let store = FieldStore::from_states(
            values
                .into_iter()
                .map(|(id, value)| (id.into(), FieldState::new(value, None))),
        );
        Self::new(Arc::new(store))
    }

    /// The current value of a field.
    pub fn get(&self, id: &str) -> FormResult<Option<FieldValue>> {
        Ok(self.store.slot(id)?.state().value)
    }

    /// The current value of a field, read as a concrete type.
    ///
    /// Fails with [`FormError::TypeMismatch`] if the stored value has a
    /// different kind.
    pub fn get_as<T: FromFieldValue>(&self, id: &str) -> FormResult<Option<T>> {
        match self.get(id)? {
            None => Ok(None),
            Some(value) => T::from_field_value(&value).map(Some).ok_or_else(|| {
                FormError::TypeMismatch {
                    field: id.to_string(),
                    expected: T::KIND.to_string(),
                    found: value.kind().to_string(),
                }
            }),
        }
    }

    /// Whether the field currently holds a non-blank value.
    pub fn is_filled(&self, id: &str) -> FormResult<bool> {
        Ok(self.store.slot(id)?.with_state(FieldState::is_filled))
    }

    /// Returns `true` if the field exists.
    pub fn contains(&self, id: &str) -> bool {
        self.store.get(id).is_some()
    }
}

/// Context handed to a validator for one validation run.
#[derive(Debug, Clone)]
pub struct ValidationScope {
    field: FieldId,
    values: FieldValues,
    token: CancellationToken,
}

impl ValidationScope {
    /// Creates a scope for validating `field`.
    pub const fn new(field: FieldId, values: FieldValues, token: CancellationToken) -> Self {
        Self {
            field,
            values,
            token,
        }
    }

    /// Creates a scope with a fresh, never-cancelled token.
    pub fn detached(field: impl Into<FieldId>, values: FieldValues) -> Self {
        Self::new(field.into(), values, CancellationToken::new())
    }

    /// The field being validated.
    pub const fn field(&self) -> &FieldId {
        &self.field
    }

    /// Read-only access to every field's current value.
    pub const fn values(&self) -> &FieldValues {
        &self.values
    }

    /// Returns `true` once this run has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when this run is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// The underlying cancellation token.
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }
}
