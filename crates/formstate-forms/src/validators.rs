//! A small set of ready-made validators.
//!
//! Every validator here except [`Required`] lets absent and blank values
//! through, so "must be present" and "must be well-formed" compose as two
//! separate rules. Invalid outcomes carry a `validation.*` message id and,
//! where useful, the bounds as positional arguments.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;

use formstate_core::ValidatorError;

use crate::validation::{FieldValues, ValidationOutcome, ValidationScope, Validator, ValidatorMeta};
use crate::value::{FieldId, FieldValue};

fn present(value: Option<&FieldValue>) -> Option<&FieldValue> {
    value.filter(|v| !v.is_blank())
}

/// Rejects absent and blank values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

#[async_trait]
impl Validator for Required {
    async fn validate(
        &self,
        value: Option<&FieldValue>,
        _scope: &ValidationScope,
    ) -> Result<ValidationOutcome, ValidatorError> {
        Ok(if present(value).is_some() {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::message("validation.required")
        })
    }

    fn meta(&self) -> ValidatorMeta {
        ValidatorMeta::required()
    }

    fn name(&self) -> &str {
        "Required"
    }
}

/// Requires a value within `[min, max]`, inclusive.
///
/// Works for any kinds [`FieldValue::compare`] can order; integers and
/// floats compare with each other. A value that cannot be compared with
/// the bounds is rejected.
///
/// # Examples
///
/// ```
/// use formstate_forms::validators::Range;
/// use formstate_forms::value::FieldValue;
///
/// let adult = Range::new(18, 65);
/// assert_eq!(adult.min, FieldValue::Int(18));
/// ```
#[derive(Debug, Clone)]
pub struct Range {
    /// Lower bound.
    pub min: FieldValue,
    /// Upper bound.
    pub max: FieldValue,
}

impl Range {
    /// Creates a range validator.
    pub fn new(min: impl Into<FieldValue>, max: impl Into<FieldValue>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    fn contains(&self, value: &FieldValue) -> bool {
        matches!(
            (value.compare(&self.min), value.compare(&self.max)),
            (Some(lo), Some(hi)) if lo.is_ge() && hi.is_le()
        )
    }
}

#[async_trait]
impl Validator for Range {
    async fn validate(
        &self,
        value: Option<&FieldValue>,
        _scope: &ValidationScope,
    ) -> Result<ValidationOutcome, ValidatorError> {
        Ok(match present(value) {
            Some(v) if !self.contains(v) => ValidationOutcome::message_with_args(
                "validation.range",
                vec![self.min.clone(), self.max.clone()],
            ),
            _ => ValidationOutcome::Valid,
        })
    }

    fn name(&self) -> &str {
        "Range"
    }
}

/// Requires text (or a choice list) of at least `min_length` items.
#[derive(Debug, Clone, Copy)]
pub struct MinLength {
    /// The minimum length, in characters or selections.
    pub min_length: usize,
}

impl MinLength {
    /// Creates a `MinLength` validator.
    pub const fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

#[async_trait]
impl Validator for MinLength {
    async fn validate(
        &self,
        value: Option<&FieldValue>,
        _scope: &ValidationScope,
    ) -> Result<ValidationOutcome, ValidatorError> {
        Ok(match present(value).and_then(FieldValue::length) {
            Some(len) if len < self.min_length => ValidationOutcome::message_with_args(
                "validation.min_length",
                vec![FieldValue::from(length_arg(self.min_length))],
            ),
            _ => ValidationOutcome::Valid,
        })
    }

    fn name(&self) -> &str {
        "MinLength"
    }
}

/// Requires text (or a choice list) of at most `max_length` items.
#[derive(Debug, Clone, Copy)]
pub struct MaxLength {
    /// The maximum length, in characters or selections.
    pub max_length: usize,
}

impl MaxLength {
    /// Creates a `MaxLength` validator.
    pub const fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

#[async_trait]
impl Validator for MaxLength {
    async fn validate(
        &self,
        value: Option<&FieldValue>,
        _scope: &ValidationScope,
    ) -> Result<ValidationOutcome, ValidatorError> {
        Ok(match present(value).and_then(FieldValue::length) {
            Some(len) if len > self.max_length => ValidationOutcome::message_with_args(
                "validation.max_length",
                vec![FieldValue::from(length_arg(self.max_length))],
            ),
            _ => ValidationOutcome::Valid,
        })
    }

    fn name(&self) -> &str {
        "MaxLength"
    }
}

fn length_arg(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// Requires text matching a regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compiles `pattern`.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

#[async_trait]
impl Validator for Pattern {
    async fn validate(
        &self,
        value: Option<&FieldValue>,
        _scope: &ValidationScope,
    ) -> Result<ValidationOutcome, ValidatorError> {
        Ok(match present(value).and_then(FieldValue::as_text) {
            Some(text) if !self.regex.is_match(text) => {
                ValidationOutcome::message("validation.pattern")
            }
            _ => ValidationOutcome::Valid,
        })
    }

    fn name(&self) -> &str {
        "Pattern"
    }
}

/// Requires the value to equal another field's current value.
///
/// Declares a connection to that field, so changing it re-checks (or
/// clears) this one.
#[derive(Debug, Clone)]
pub struct EqualsTo {
    other: FieldId,
}

impl EqualsTo {
    /// Creates a validator comparing against `other`.
    pub fn new(other: impl Into<FieldId>) -> Self {
        Self {
            other: other.into(),
        }
    }
}

#[async_trait]
impl Validator for EqualsTo {
    async fn validate(
        &self,
        value: Option<&FieldValue>,
        scope: &ValidationScope,
    ) -> Result<ValidationOutcome, ValidatorError> {
        let Some(value) = present(value) else {
            return Ok(ValidationOutcome::Valid);
        };
        let other = scope
            .values()
            .get(&self.other)
            .map_err(|e| ValidatorError::failed(e.to_string()))?;
        Ok(if other.as_ref() == Some(value) {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::message_with_args(
                "validation.equals_to",
                vec![FieldValue::from(self.other.as_str())],
            )
        })
    }

    fn meta(&self) -> ValidatorMeta {
        ValidatorMeta::connected_to(&self.other)
    }

    fn name(&self) -> &str {
        "EqualsTo"
    }
}

type CheckFn =
    dyn Fn(Option<&FieldValue>, &FieldValues) -> Result<ValidationOutcome, ValidatorError> + Send + Sync;

/// A validator backed by a synchronous closure.
///
/// The closure receives the value and read-only access to the other
/// fields. Structural metadata is declared with the builder methods.
///
/// # Examples
///
/// ```
/// use formstate_forms::validation::ValidationOutcome;
/// use formstate_forms::validators::FnValidator;
///
/// let even = FnValidator::new("even", |value, _| {
///     Ok(match value.and_then(|v| v.as_number()) {
///         Some(n) if n % 2.0 != 0.0 => ValidationOutcome::message("validation.even"),
///         _ => ValidationOutcome::Valid,
///     })
/// });
/// ```
#[derive(Clone)]
pub struct FnValidator {
    name: String,
    meta: ValidatorMeta,
    check: Arc<CheckFn>,
}

impl fmt::Debug for FnValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator")
            .field("name", &self.name)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

impl FnValidator {
    /// Wraps `check` as a validator named `name`.
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(Option<&FieldValue>, &FieldValues) -> Result<ValidationOutcome, ValidatorError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            meta: ValidatorMeta::default(),
            check: Arc::new(check),
        }
    }

    /// Declares that this validator demands a value.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.meta.is_required = true;
        self
    }

    /// Declares that this validator reads `field`.
    #[must_use]
    pub fn connected_to(mut self, field: impl Into<FieldId>) -> Self {
        self.meta.connected_fields.push(field.into());
        self
    }
}

#[async_trait]
impl Validator for FnValidator {
    async fn validate(
        &self,
        value: Option<&FieldValue>,
        scope: &ValidationScope,
    ) -> Result<ValidationOutcome, ValidatorError> {
        (self.check)(value, scope.values())
    }

    fn meta(&self) -> ValidatorMeta {
        self.meta.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope_with(values: Vec<(&str, Option<FieldValue>)>) -> ValidationScope {
        ValidationScope::detached("subject", FieldValues::detached(values))
    }

    fn empty_scope() -> ValidationScope {
        scope_with(Vec::new())
    }

    #[tokio::test]
    async fn test_required() {
        let scope = empty_scope();
        assert!(Required.validate(None, &scope).await.unwrap().is_invalid());
        assert!(Required
            .validate(Some(&FieldValue::from(" ")), &scope)
            .await
            .unwrap()
            .is_invalid());
        assert!(Required
            .validate(Some(&FieldValue::from("x")), &scope)
            .await
            .unwrap()
            .is_valid());
        assert!(Required.meta().is_required);
    }

    #[tokio::test]
    async fn test_range_reports_bounds() {
        let scope = empty_scope();
        let range = Range::new(18, 65);
        let outcome = range
            .validate(Some(&FieldValue::Int(10)), &scope)
            .await
            .unwrap();
        assert_eq!(outcome.message_id(), Some("validation.range"));
        assert_eq!(outcome.args(), &[FieldValue::Int(18), FieldValue::Int(65)]);

        for ok in [18, 30, 65] {
            assert!(range
                .validate(Some(&FieldValue::Int(ok)), &scope)
                .await
                .unwrap()
                .is_valid());
        }
        assert!(range.validate(None, &scope).await.unwrap().is_valid());
    }

    #[tokio::test]
    async fn test_range_mixed_numeric_and_incompatible() {
        let scope = empty_scope();
        let range = Range::new(0, 1);
        assert!(range
            .validate(Some(&FieldValue::Float(0.5)), &scope)
            .await
            .unwrap()
            .is_valid());
        assert!(range
            .validate(Some(&FieldValue::from("half")), &scope)
            .await
            .unwrap()
            .is_invalid());
    }

    #[tokio::test]
    async fn test_lengths() {
        let scope = empty_scope();
        let short = FieldValue::from("abc");
        let min = MinLength::new(5).validate(Some(&short), &scope).await.unwrap();
        assert_eq!(min.message_id(), Some("validation.min_length"));
        assert_eq!(min.args(), &[FieldValue::Int(5)]);
        assert!(MaxLength::new(3)
            .validate(Some(&short), &scope)
            .await
            .unwrap()
            .is_valid());
        assert!(MaxLength::new(2)
            .validate(Some(&short), &scope)
            .await
            .unwrap()
            .is_invalid());
        assert!(MinLength::new(5).validate(None, &scope).await.unwrap().is_valid());
    }

    #[tokio::test]
    async fn test_pattern() {
        let scope = empty_scope();
        let digits = Pattern::new(r"^\d+$").unwrap();
        assert_eq!(digits.as_str(), r"^\d+$");
        assert!(digits
            .validate(Some(&FieldValue::from("123")), &scope)
            .await
            .unwrap()
            .is_valid());
        assert_eq!(
            digits
                .validate(Some(&FieldValue::from("12a")), &scope)
                .await
                .unwrap()
                .message_id(),
            Some("validation.pattern")
        );
        assert!(Pattern::new("(").is_err());
    }

    #[tokio::test]
    async fn test_equals_to() {
        let validator = EqualsTo::new("password");
        assert_eq!(
            validator.meta().connected_fields,
            vec![FieldId::from("password")]
        );

        let scope = scope_with(vec![("password", Some(FieldValue::from("s3cret")))]);
        assert!(validator
            .validate(Some(&FieldValue::from("s3cret")), &scope)
            .await
            .unwrap()
            .is_valid());
        let mismatch = validator
            .validate(Some(&FieldValue::from("other")), &scope)
            .await
            .unwrap();
        assert_eq!(mismatch.message_id(), Some("validation.equals_to"));
        assert_eq!(mismatch.args(), &[FieldValue::from("password")]);
    }

    #[tokio::test]
    async fn test_equals_to_missing_field_fails() {
        let err = EqualsTo::new("password")
            .validate(Some(&FieldValue::from("x")), &empty_scope())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown field: password"));
    }

    #[tokio::test]
    async fn test_fn_validator_meta_and_values() {
        let validator = FnValidator::new("after_start", |value, values| {
            let start = values.get_as::<i64>("start").map_err(|e| ValidatorError::failed(e.to_string()))?;
            Ok(match (value, start) {
                (Some(FieldValue::Int(end)), Some(start)) if *end < start => {
                    ValidationOutcome::message("validation.after_start")
                }
                _ => ValidationOutcome::Valid,
            })
        })
        .required()
        .connected_to("start");

        let meta = validator.meta();
        assert!(meta.is_required);
        assert_eq!(meta.connected_fields, vec![FieldId::from("start")]);
        assert_eq!(validator.name(), "after_start");

        let scope = scope_with(vec![("start", Some(FieldValue::Int(10)))]);
        assert!(validator
            .validate(Some(&FieldValue::Int(5)), &scope)
            .await
            .unwrap()
            .is_invalid());
        assert!(validator
            .validate(Some(&FieldValue::Int(15)), &scope)
            .await
            .unwrap()
            .is_valid());
    }
}
