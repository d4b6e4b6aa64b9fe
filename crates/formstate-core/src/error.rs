//! Core error types for formstate.
//!
//! [`FormError`] covers every failure a caller of the form manager can see:
//! lifecycle misuse, lookups of unregistered fields, type mismatches, and
//! errors raised by validators. [`ValidatorError`] is what an individual
//! validator returns when it cannot produce an outcome at all (as opposed
//! to producing an `Invalid` outcome).

use thiserror::Error;

/// An error raised by a validator that could not decide on an outcome.
///
/// A validator that finds a value unacceptable does *not* return this; it
/// returns an invalid outcome. This type is for infrastructure failures
/// (an unreachable uniqueness service, a malformed pattern) and for
/// cooperative cancellation.
///
/// # Examples
///
/// ```
/// use formstate_core::error::ValidatorError;
///
/// let err = ValidatorError::failed("lookup service unavailable");
/// assert_eq!(err.to_string(), "Validator failed: lookup service unavailable");
/// assert!(!err.is_cancelled());
/// assert!(ValidatorError::Cancelled.is_cancelled());
/// ```
#[derive(Error, Debug)]
pub enum ValidatorError {
    /// The validator observed cancellation of its scope and gave up.
    #[error("Validation cancelled")]
    Cancelled,

    /// The validator failed with a message.
    #[error("Validator failed: {0}")]
    Failed(String),

    /// The validator failed because of an underlying error.
    #[error("Validator backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ValidatorError {
    /// Creates a [`ValidatorError::Failed`] from any message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wraps an arbitrary error as a [`ValidatorError::Backend`].
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }

    /// Returns `true` if this error signals cancellation rather than failure.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// The primary error type for formstate.
///
/// Most variants describe caller bugs: the set of field ids is closed at
/// registration time, value kinds are declared up front, and the manager
/// must be initialized before use. They are reported as errors so that the
/// caller decides how loudly to fail, but none of them are worth retrying.
#[derive(Error, Debug)]
pub enum FormError {
    // ── Lifecycle ────────────────────────────────────────────────────

    /// The manager was used before `initialize` was called.
    #[error("Form manager used before initialize()")]
    NotInitialized,

    /// `initialize` was called a second time.
    #[error("Form manager is already initialized")]
    AlreadyInitialized,

    // ── Registry ─────────────────────────────────────────────────────

    /// The field id is not registered with this manager.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Two descriptors share the same field id.
    #[error("Duplicate field: {0}")]
    DuplicateField(String),

    /// A value of the wrong kind was supplied for a field.
    #[error("Type mismatch for field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        /// The field the value was meant for.
        field: String,
        /// The kind the field declares.
        expected: String,
        /// The kind that was supplied.
        found: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    /// A validator for the given field returned an error.
    #[error("Validator for field '{field}' failed: {source}")]
    Validator {
        /// The field being validated.
        field: String,
        /// The underlying validator error.
        #[source]
        source: ValidatorError,
    },

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl FormError {
    /// Returns `true` if this error only carries a validator cancellation.
    ///
    /// Scheduled validation uses this to unwind silently instead of
    /// reporting cancellation as a failure.
    pub const fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::Validator {
                source: ValidatorError::Cancelled,
                ..
            }
        )
    }
}

/// A convenience type alias for `Result<T, FormError>`.
pub type FormResult<T> = Result<T, FormError>;
