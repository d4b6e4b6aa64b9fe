//! # formstate
//!
//! Form-state and validation orchestration for UI toolkits.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient
//! access. You can depend on `formstate` to get everything, or depend on
//! individual crates for finer-grained control.
//!
//! ## Quick start
//!
//! ```
//! use formstate::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> FormResult<()> {
//! let manager = FormManager::new(
//!     vec![
//!         FieldDescriptor::new("password", ValueKind::Text).validator(Required),
//!         FieldDescriptor::new("confirm", ValueKind::Text)
//!             .validator(Required)
//!             .validator(EqualsTo::new("password")),
//!     ],
//!     ValidationStrategy::Manual,
//! )?;
//! manager.initialize(ExecutionContext::current()?, None)?;
//!
//! let password = manager.field("password")?;
//! password.set("correct horse")?;
//! manager.field("confirm")?.set("correct horse")?;
//!
//! assert!(manager.all_required_filled()?);
//! assert!(manager.validate_form().await?);
//! # Ok(())
//! # }
//! ```

/// Errors, settings, validation strategies, and logging setup.
pub use formstate_core as core;

/// Replay-latest observables and named-receiver signals.
#[cfg(feature = "signals")]
pub use formstate_signals as signals;

/// Field registry, validators, and the form manager.
#[cfg(feature = "forms")]
pub use formstate_forms as forms;

/// Third-party crates re-exported so applications build against the same
/// versions.
pub mod deps {
    pub use async_trait;
    pub use chrono;
    pub use serde;
    pub use serde_json;
    pub use tokio;
    pub use tokio_util;
    pub use tracing;
    pub use tracing_subscriber;
}

/// The commonly used types from every enabled sub-crate.
pub mod prelude {
    pub use formstate_core::logging::setup_logging;
    pub use formstate_core::settings_loader;
    pub use formstate_core::{FormError, FormResult, FormSettings, ValidationStrategy, ValidatorError, SETTINGS};

    #[cfg(feature = "signals")]
    pub use formstate_signals::{Observable, Signal, SignalReceiver};

    #[cfg(feature = "forms")]
    pub use formstate_forms::prelude::*;
    #[cfg(feature = "forms")]
    pub use formstate_forms::ValidationEvent;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_exposes_settings() {
        let settings = settings_loader::from_toml_str("visibility_debounce_ms = 50").unwrap();
        assert_eq!(settings.visibility_debounce_ms, 50);
        assert_eq!(settings.default_strategy, ValidationStrategy::Manual);
    }

    #[cfg(feature = "forms")]
    #[tokio::test(start_paused = true)]
    async fn test_manager_from_settings() {
        let settings = FormSettings {
            default_strategy: ValidationStrategy::AutoOnFocusClear,
            ..FormSettings::default()
        };
        let manager = FormManager::with_settings(
            vec![FieldDescriptor::new("email", ValueKind::Text).validator(Required)],
            &settings,
        )
        .unwrap();
        manager.initialize(ExecutionContext::current().unwrap(), None).unwrap();

        manager.field("email").unwrap().focus_cleared().unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;

        let state = manager.field_state("email").unwrap();
        assert_eq!(
            state.validation_result,
            Some(ValidationOutcome::message("validation.required"))
        );
    }
}
