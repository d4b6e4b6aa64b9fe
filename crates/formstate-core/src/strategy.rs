//! Validation strategies.
//!
//! A [`ValidationStrategy`] decides when automatic validation fires for a
//! field. A form has one global default and each field may override it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Policy governing when automatic validation runs.
///
/// Strategies serialize with a `kind` tag so they can be written in
/// settings files:
///
/// ```
/// use std::time::Duration;
/// use formstate_core::strategy::ValidationStrategy;
///
/// let strategy: ValidationStrategy =
///     serde_json::from_str(r#"{"kind": "auto_inline", "delay_ms": 400}"#).unwrap();
/// assert_eq!(strategy, ValidationStrategy::AutoInline { delay: Duration::from_millis(400) });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationStrategy {
    /// Validate only when explicitly asked.
    #[default]
    Manual,
    /// Validate a field when it loses focus.
    AutoOnFocusClear,
    /// Validate a field after every edit, once `delay` passes without a
    /// further edit.
    AutoInline {
        /// Quiet period before validation runs.
        #[serde(rename = "delay_ms", with = "duration_ms")]
        delay: Duration,
    },
}

impl ValidationStrategy {
    /// Shorthand for [`ValidationStrategy::AutoInline`].
    pub const fn inline(delay: Duration) -> Self {
        Self::AutoInline { delay }
    }

    /// Returns `true` for [`ValidationStrategy::Manual`].
    pub const fn is_manual(self) -> bool {
        matches!(self, Self::Manual)
    }

    /// Returns `true` for [`ValidationStrategy::AutoInline`].
    pub const fn is_inline(self) -> bool {
        matches!(self, Self::AutoInline { .. })
    }

    /// The debounce delay, if this strategy has one.
    pub const fn delay(self) -> Option<Duration> {
        match self {
            Self::AutoInline { delay } => Some(delay),
            Self::Manual | Self::AutoOnFocusClear => None,
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(delay.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
