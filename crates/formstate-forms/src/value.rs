//! Field identifiers and field values.
//!
//! A form holds fields of heterogeneous types in one registry, so values
//! are carried as the tagged [`FieldValue`] enum. Each field declares a
//! [`ValueKind`] at registration, and typed reads go through
//! [`FromFieldValue`], which fails fast on a kind mismatch.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// An opaque, cheaply clonable field identifier.
///
/// `FieldId` dereferences to `str`, so it can be passed anywhere a field
/// name is expected, and maps keyed by `FieldId` can be queried with `&str`.
///
/// # Examples
///
/// ```
/// use formstate_forms::value::FieldId;
///
/// let id = FieldId::from("email");
/// assert_eq!(id.as_str(), "email");
/// assert_eq!(&*id, "email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(Arc<str>);

impl FieldId {
    /// Creates a new field id.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for FieldId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FieldId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FieldId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for FieldId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FieldId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for FieldId {
    fn from(id: &str) -> Self {
        Self(Arc::from(id))
    }
}

impl From<String> for FieldId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&FieldId> for FieldId {
    fn from(id: &FieldId) -> Self {
        id.clone()
    }
}

/// The declared type of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free text.
    Text,
    /// A signed integer.
    Int,
    /// A floating-point number.
    Float,
    /// A checkbox or switch.
    Bool,
    /// A calendar date.
    Date,
    /// A wall-clock time.
    Time,
    /// A date and time without timezone.
    DateTime,
    /// A multi-select list of choice keys.
    Choices,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Choices => "choices",
        };
        f.write_str(name)
    }
}

/// A field value.
///
/// Absence of a value is modelled as `Option<FieldValue>::None` rather than
/// as a variant, so every `FieldValue` carries data of its kind.
///
/// # Examples
///
/// ```
/// use formstate_forms::value::{FieldValue, ValueKind};
///
/// let v = FieldValue::from(42);
/// assert_eq!(v, FieldValue::Int(42));
/// assert_eq!(v.kind(), ValueKind::Int);
///
/// assert!(FieldValue::from("   ").is_blank());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Free text.
    Text(String),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A calendar date.
    Date(NaiveDate),
    /// A wall-clock time.
    Time(NaiveTime),
    /// A date and time without timezone.
    DateTime(NaiveDateTime),
    /// Selected choice keys.
    Choices(Vec<String>),
}

impl FieldValue {
    /// The kind of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Bool(_) => ValueKind::Bool,
            Self::Date(_) => ValueKind::Date,
            Self::Time(_) => ValueKind::Time,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Choices(_) => ValueKind::Choices,
        }
    }

    /// Returns `true` for whitespace-only text and empty choice lists.
    ///
    /// Non-textual scalars are never blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Choices(c) => c.is_empty(),
            _ => false,
        }
    }

    /// Returns the text, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the value as a number, if it is an `Int` or a `Float`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Length in characters for text, or number of selections for choices.
    pub fn length(&self) -> Option<usize> {
        match self {
            Self::Text(s) => Some(s.chars().count()),
            Self::Choices(c) => Some(c.len()),
            _ => None,
        }
    }

    /// Compares two values of compatible kinds.
    ///
    /// Integers and floats compare numerically with each other; every other
    /// kind only compares with itself. Returns `None` for incompatible kinds.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Time(a), Self::Time(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::Choices(c) => write!(f, "{}", c.join(", ")),
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveTime> for FieldValue {
    fn from(v: NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        Self::Choices(v)
    }
}

// ── Typed reads ────────────────────────────────────────────────────────

/// Extracts a concrete Rust type from a [`FieldValue`].
///
/// Implementations are strict: an `Int` is not silently read as `f64`.
pub trait FromFieldValue: Sized {
    /// The kind a value must have to convert.
    const KIND: ValueKind;

    /// Converts the value, or returns `None` on a kind mismatch.
    fn from_field_value(value: &FieldValue) -> Option<Self>;
}

macro_rules! impl_from_field_value {
    ($ty:ty, $kind:ident, $pat:pat => $out:expr) => {
        impl FromFieldValue for $ty {
            const KIND: ValueKind = ValueKind::$kind;

            fn from_field_value(value: &FieldValue) -> Option<Self> {
                match value {
                    $pat => Some($out),
                    _ => None,
                }
            }
        }
    };
}

impl_from_field_value!(String, Text, FieldValue::Text(s) => s.clone());
impl_from_field_value!(i64, Int, FieldValue::Int(i) => *i);
impl_from_field_value!(f64, Float, FieldValue::Float(f) => *f);
impl_from_field_value!(bool, Bool, FieldValue::Bool(b) => *b);
impl_from_field_value!(NaiveDate, Date, FieldValue::Date(d) => *d);
impl_from_field_value!(NaiveTime, Time, FieldValue::Time(t) => *t);
impl_from_field_value!(NaiveDateTime, DateTime, FieldValue::DateTime(dt) => *dt);
impl_from_field_value!(Vec<String>, Choices, FieldValue::Choices(c) => c.clone());

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_field_id_map_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(FieldId::from("age"), 1);
        assert_eq!(map.get("age"), Some(&1));
    }

    #[test]
    fn test_field_id_display() {
        assert_eq!(FieldId::new("confirm_password").to_string(), "confirm_password");
    }

    #[test]
    fn test_kind() {
        assert_eq!(FieldValue::from("x").kind(), ValueKind::Text);
        assert_eq!(FieldValue::from(1.5).kind(), ValueKind::Float);
        assert_eq!(FieldValue::from(true).kind(), ValueKind::Bool);
        assert_eq!(
            FieldValue::from(vec!["a".to_string()]).kind(),
            ValueKind::Choices
        );
        assert_eq!(ValueKind::DateTime.to_string(), "datetime");
    }

    #[test]
    fn test_is_blank() {
        assert!(FieldValue::from("").is_blank());
        assert!(FieldValue::from(" \t\n").is_blank());
        assert!(!FieldValue::from(" x ").is_blank());
        assert!(FieldValue::Choices(vec![]).is_blank());
        assert!(!FieldValue::Int(0).is_blank());
        assert!(!FieldValue::Bool(false).is_blank());
    }

    #[test]
    fn test_compare_mixed_numeric() {
        assert_eq!(
            FieldValue::Int(3).compare(&FieldValue::Float(3.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            FieldValue::Float(10.0).compare(&FieldValue::Int(10)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_compare_dates() {
        let early = FieldValue::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let late = FieldValue::from(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(early.compare(&late), Some(Ordering::Less));
    }

    #[test]
    fn test_compare_incompatible() {
        assert_eq!(FieldValue::from("1").compare(&FieldValue::Int(1)), None);
    }

    #[test]
    fn test_length_counts_chars() {
        assert_eq!(FieldValue::from("héllo").length(), Some(5));
        assert_eq!(FieldValue::Int(5).length(), None);
    }

    #[test]
    fn test_typed_reads_are_strict() {
        assert_eq!(i64::from_field_value(&FieldValue::Int(7)), Some(7));
        assert_eq!(f64::from_field_value(&FieldValue::Int(7)), None);
        assert_eq!(
            String::from_field_value(&FieldValue::from("hi")),
            Some("hi".to_string())
        );
        assert_eq!(<bool as FromFieldValue>::KIND, ValueKind::Bool);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(FieldValue::Int(18)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "int", "value": 18}));
        let back: FieldValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, FieldValue::Int(18));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            FieldValue::Choices(vec!["a".into(), "b".into()]).to_string(),
            "a, b"
        );
        assert_eq!(FieldValue::Int(65).to_string(), "65");
    }
}
