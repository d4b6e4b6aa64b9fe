//! Field descriptors and per-field state.
//!
//! A [`FieldDescriptor`] is the static, registration-time description of a
//! field: its id, value kind, initial value, validators, and optional
//! strategy override. A [`FieldState`] is the live, observable part that
//! changes as the user edits the form.

use serde::{Deserialize, Serialize};

use formstate_core::{FormError, FormResult, ValidationStrategy};

use crate::validation::{ValidationOutcome, Validator};
use crate::value::{FieldId, FieldValue, ValueKind};

/// Registration-time description of one field.
///
/// # Examples
///
/// ```
/// use formstate_forms::fields::FieldDescriptor;
/// use formstate_forms::validators::{Range, Required};
/// use formstate_forms::value::{FieldValue, ValueKind};
///
/// let age = FieldDescriptor::new("age", ValueKind::Int)
///     .validator(Required)
///     .validator(Range::new(18, 65));
/// assert_eq!(age.id.as_str(), "age");
/// assert_eq!(age.validators.len(), 2);
/// assert!(age.visible);
/// ```
#[derive(Debug)]
pub struct FieldDescriptor {
    /// The field id, unique within a form.
    pub id: FieldId,
    /// The kind of value this field holds.
    pub kind: ValueKind,
    /// The value restored by `clear_form`.
    pub initial_value: Option<FieldValue>,
    /// The validation result restored by `clear_form`.
    pub initial_outcome: Option<ValidationOutcome>,
    /// Validators, run in order until the first invalid outcome.
    pub validators: Vec<Box<dyn Validator>>,
    /// Overrides the manager's strategy for this field.
    pub strategy: Option<ValidationStrategy>,
    /// Whether the field starts out visible.
    pub visible: bool,
}

impl FieldDescriptor {
    /// Creates a visible field with no initial value and no validators.
    pub fn new(id: impl Into<FieldId>, kind: ValueKind) -> Self {
        Self {
            id: id.into(),
            kind,
            initial_value: None,
            initial_outcome: None,
            validators: Vec::new(),
            strategy: None,
            visible: true,
        }
    }

    /// Sets the initial value.
    #[must_use]
    pub fn initial(mut self, value: impl Into<FieldValue>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    /// Sets the initial validation result.
    #[must_use]
    pub fn initial_outcome(mut self, outcome: ValidationOutcome) -> Self {
        self.initial_outcome = Some(outcome);
        self
    }

    /// Appends a validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Overrides the validation strategy for this field.
    #[must_use]
    pub const fn strategy(mut self, strategy: ValidationStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Sets the initial visibility.
    #[must_use]
    pub const fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// The state this field is created with and restored to on clear.
    pub fn initial_state(&self) -> FieldState {
        FieldState::new(self.initial_value.clone(), self.initial_outcome.clone())
    }

    /// Checks that `value` has this field's kind.
    pub fn check_kind(&self, value: Option<&FieldValue>) -> FormResult<()> {
        match value {
            Some(v) if v.kind() != self.kind => Err(FormError::TypeMismatch {
                field: self.id.to_string(),
                expected: self.kind.to_string(),
                found: v.kind().to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// The observable state of one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldState {
    /// The current value (`None` when empty).
    pub value: Option<FieldValue>,
    /// The last validation result (`None` when not validated since the
    /// last change).
    pub validation_result: Option<ValidationOutcome>,
    /// Whether a validation of this field is running.
    pub validation_in_progress: bool,
}

impl FieldState {
    /// Creates a state that is not being validated.
    pub const fn new(value: Option<FieldValue>, validation_result: Option<ValidationOutcome>) -> Self {
        Self {
            value,
            validation_result,
            validation_in_progress: false,
        }
    }

    /// Whether the field holds a non-blank value.
    pub fn is_filled(&self) -> bool {
        self.value.as_ref().is_some_and(|v| !v.is_blank())
    }

    /// Whether the last validation result is invalid.
    pub const fn is_error(&self) -> bool {
        matches!(self.validation_result, Some(ValidationOutcome::Invalid(_)))
    }

    /// Whether the last validation result is valid.
    pub const fn is_valid(&self) -> bool {
        matches!(self.validation_result, Some(ValidationOutcome::Valid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults() {
        let field = FieldDescriptor::new("email", ValueKind::Text);
        assert!(field.visible);
        assert!(field.strategy.is_none());
        assert_eq!(field.initial_state(), FieldState::default());
    }

    #[test]
    fn test_descriptor_initial_state() {
        let field = FieldDescriptor::new("confirm", ValueKind::Text)
            .initial("abc")
            .initial_outcome(ValidationOutcome::unknown())
            .visible(false);
        let state = field.initial_state();
        assert_eq!(state.value, Some(FieldValue::from("abc")));
        assert!(state.is_error());
        assert!(!state.validation_in_progress);
        assert!(!field.visible);
    }

    #[test]
    fn test_check_kind() {
        let field = FieldDescriptor::new("age", ValueKind::Int);
        assert!(field.check_kind(None).is_ok());
        assert!(field.check_kind(Some(&FieldValue::Int(3))).is_ok());
        let err = field.check_kind(Some(&FieldValue::from("3"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type mismatch for field 'age': expected int, found text"
        );
    }

    #[test]
    fn test_state_is_filled() {
        assert!(!FieldState::default().is_filled());
        assert!(!FieldState::new(Some(FieldValue::from("")), None).is_filled());
        assert!(!FieldState::new(Some(FieldValue::Choices(vec![])), None).is_filled());
        assert!(FieldState::new(Some(FieldValue::Bool(false)), None).is_filled());
        assert!(FieldState::new(Some(FieldValue::from("x")), None).is_filled());
    }

    #[test]
    fn test_state_outcome_flags() {
        let valid = FieldState::new(None, Some(ValidationOutcome::Valid));
        assert!(valid.is_valid());
        assert!(!valid.is_error());
        let pending = FieldState::default();
        assert!(!pending.is_valid());
        assert!(!pending.is_error());
    }
}
