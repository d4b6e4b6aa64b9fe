//! Settings for formstate.
//!
//! [`FormSettings`] holds the knobs a host application may want to tune
//! without recompiling: the default validation strategy, the visibility
//! debounce window, and logging. [`LazySettings`] provides an optional
//! process-wide instance in the same shape as other framework settings.

use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::strategy::ValidationStrategy;

/// Default quiet period before visibility changes are folded into the
/// "all required fields filled" flag.
pub const DEFAULT_VISIBILITY_DEBOUNCE_MS: u64 = 300;

/// The complete set of formstate settings.
///
/// # Examples
///
/// ```
/// use formstate_core::settings::FormSettings;
/// use formstate_core::strategy::ValidationStrategy;
///
/// let settings = FormSettings::default();
/// assert_eq!(settings.default_strategy, ValidationStrategy::Manual);
/// assert_eq!(settings.visibility_debounce_ms, 300);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSettings {
    // ── Validation ───────────────────────────────────────────────────

    /// Strategy applied to fields that do not override it.
    pub default_strategy: ValidationStrategy,
    /// Trailing-edge debounce for visibility changes, in milliseconds.
    pub visibility_debounce_ms: u64,

    // ── Logging ──────────────────────────────────────────────────────

    /// Whether debug mode (human-readable logs) is enabled.
    pub debug: bool,
    /// The log level (e.g. "info", "debug", "formstate_forms=trace").
    pub log_level: String,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            default_strategy: ValidationStrategy::Manual,
            visibility_debounce_ms: DEFAULT_VISIBILITY_DEBOUNCE_MS,
            debug: true,
            log_level: "info".to_string(),
        }
    }
}

impl FormSettings {
    /// The visibility debounce window as a [`Duration`].
    pub const fn visibility_debounce(&self) -> Duration {
        Duration::from_millis(self.visibility_debounce_ms)
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup, then use
/// [`get`](LazySettings::get). Unconfigured reads fall back to defaults.
pub struct LazySettings {
    inner: OnceLock<FormSettings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings.
    ///
    /// Returns the rejected settings if they were already configured.
    pub fn configure(&self, settings: FormSettings) -> Result<(), FormSettings> {
        self.inner.set(settings)
    }

    /// Returns the configured settings, or the defaults if none were set.
    pub fn get(&self) -> &FormSettings {
        self.inner.get_or_init(FormSettings::default)
    }

    /// Returns `true` if [`configure`](LazySettings::configure) succeeded.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_debounce_duration() {
        let settings = FormSettings {
            visibility_debounce_ms: 50,
            ..FormSettings::default()
        };
        assert_eq!(settings.visibility_debounce(), Duration::from_millis(50));
    }

    #[test]
    fn test_lazy_settings_configure_once() {
        let lazy = LazySettings::new();
        assert!(!lazy.is_configured());
        let custom = FormSettings {
            log_level: "debug".into(),
            ..FormSettings::default()
        };
        assert!(lazy.configure(custom).is_ok());
        assert!(lazy.is_configured());
        assert_eq!(lazy.get().log_level, "debug");
        assert!(lazy.configure(FormSettings::default()).is_err());
    }

    #[test]
    fn test_lazy_settings_defaults_when_unconfigured() {
        let lazy = LazySettings::new();
        assert_eq!(lazy.get(), &FormSettings::default());
    }

    #[test]
    fn test_settings_serde_roundtrip_shape() {
        let json = serde_json::to_value(FormSettings::default()).unwrap();
        assert_eq!(json["default_strategy"]["kind"], "manual");
        assert_eq!(json["visibility_debounce_ms"], 300);
    }
}
