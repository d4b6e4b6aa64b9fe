//! Logging integration for formstate.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`FormSettings`](crate::settings::FormSettings) and for creating the
//! spans that scheduled validation runs inside.

use crate::settings::FormSettings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level`. In debug mode a pretty,
/// human-readable format is used; otherwise a structured JSON format is
/// used. Installing a subscriber when one already exists is a no-op.
pub fn setup_logging(settings: &FormSettings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one scheduled validation run.
///
/// # Examples
///
/// ```
/// use formstate_core::logging::validation_span;
///
/// let span = validation_span("email", 7);
/// let _guard = span.enter();
/// tracing::debug!("validating");
/// ```
pub fn validation_span(field: &str, generation: u64) -> tracing::Span {
    tracing::debug_span!("validation", field, generation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_is_idempotent() {
        let settings = FormSettings {
            log_level: "not a [valid filter".into(),
            ..FormSettings::default()
        };
        setup_logging(&settings);
        setup_logging(&FormSettings::default());
    }
}
