//! Settings loading from configuration files.
//!
//! Loads [`FormSettings`] from TOML or JSON and applies environment
//! variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON document (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FORMSTATE_DEBUG` | `debug` |
//! | `FORMSTATE_LOG_LEVEL` | `log_level` |
//! | `FORMSTATE_VISIBILITY_DEBOUNCE_MS` | `visibility_debounce_ms` |
//!
//! ## Examples
//!
//! ```rust
//! use formstate_core::settings_loader;
//! use formstate_core::strategy::ValidationStrategy;
//!
//! let settings = settings_loader::from_toml_str(r#"
//!     [default_strategy]
//!     kind = "auto_on_focus_clear"
//! "#).unwrap();
//! assert_eq!(settings.default_strategy, ValidationStrategy::AutoOnFocusClear);
//! assert_eq!(settings.visibility_debounce_ms, 300);
//! ```

use std::path::Path;

use crate::error::FormError;
use crate::settings::FormSettings;

/// Loads settings from a TOML string, keeping defaults for absent keys.
pub fn from_toml_str(toml_str: &str) -> Result<FormSettings, FormError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FormError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<FormSettings, FormError> {
    let content = read_file(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<FormSettings, FormError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string, keeping defaults for absent keys.
pub fn from_json_str(json_str: &str) -> Result<FormSettings, FormError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FormError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<FormSettings, FormError> {
    let content = read_file(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> FormSettings {
    let mut settings = FormSettings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// - `FORMSTATE_DEBUG` -> `debug` ("true"/"1"/"yes" => true, anything else => false)
/// - `FORMSTATE_LOG_LEVEL` -> `log_level`
/// - `FORMSTATE_VISIBILITY_DEBOUNCE_MS` -> `visibility_debounce_ms` (ignored if not a number)
pub fn apply_env_overrides(settings: &mut FormSettings) {
    if let Ok(val) = std::env::var("FORMSTATE_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("FORMSTATE_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("FORMSTATE_VISIBILITY_DEBOUNCE_MS") {
        if let Ok(ms) = val.trim().parse::<u64>() {
            settings.visibility_debounce_ms = ms;
        }
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_file(path: &Path, format: &str) -> Result<String, FormError> {
    std::fs::read_to_string(path).map_err(|e| {
        FormError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(
    value: serde_json::Value,
    format: &str,
) -> Result<FormSettings, FormError> {
    let default_json = serde_json::to_value(FormSettings::default()).map_err(|e| {
        FormError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        FormError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
///
/// A tagged strategy table replaces the default wholesale, since merging
/// `{"kind": "manual"}` with `{"delay_ms": 10}` would produce a value that
/// belongs to neither variant.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map))
            if !override_map.contains_key("kind") =>
        {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
