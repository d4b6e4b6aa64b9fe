//! # formstate-core
//!
//! Core types shared by every formstate crate. This crate has no framework
//! dependencies.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`strategy`] - Validation strategies
//! - [`settings`] - Settings and the optional global instance
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod strategy;

// Re-export the most commonly used types at the crate root.
pub use error::{FormError, FormResult, ValidatorError};
pub use settings::{FormSettings, SETTINGS};
pub use strategy::ValidationStrategy;
