//! The form manager.
//!
//! [`FormManager`] owns every field's observable state and the visibility
//! map, and is the only thing that writes to them. UI code drives it
//! through three entry points ([`value_changed`](FormManager::value_changed),
//! [`focus_cleared`](FormManager::focus_cleared) and
//! [`visibility_changed`](FormManager::visibility_changed)) and observes the
//! results through per-field state streams and two form-wide flags.
//!
//! # Scheduling
//!
//! Changing a field schedules background work when its effective strategy
//! is [`ValidationStrategy::AutoInline`] or when other fields have validators
//! connected to it. Each triggering field has one in-flight slot: a new
//! request for the same field cancels the previous one, while requests for
//! different fields run side by side. All work is spawned on the runtime
//! given to [`initialize`](FormManager::initialize) and is cancelled with
//! that context's token.
//!
//! # Examples
//!
//! ```
//! use formstate_forms::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> FormResult<()> {
//! let manager = FormManager::new(
//!     vec![
//!         FieldDescriptor::new("age", ValueKind::Int)
//!             .validator(Required)
//!             .validator(Range::new(18, 65)),
//!     ],
//!     ValidationStrategy::Manual,
//! )?;
//! manager.initialize(ExecutionContext::current()?, None)?;
//!
//! manager.value_changed("age", Some(FieldValue::Int(10)))?;
//! assert!(!manager.validate_field("age").await?);
//!
//! manager.value_changed("age", Some(FieldValue::Int(30)))?;
//! assert!(manager.validate_field("age").await?);
//! assert!(manager.all_required_filled()?);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use formstate_core::logging::validation_span;
use formstate_core::{FormError, FormResult, FormSettings, ValidationStrategy, ValidatorError, SETTINGS};
use formstate_signals::{Observable, Signal, SignalReceiver};

use crate::events::ValidationEvent;
use crate::fields::{FieldDescriptor, FieldState};
use crate::handle::FieldHandle;
use crate::registry::FieldRegistry;
use crate::scheduler::{ExecutionContext, Ticket, ValidationScheduler};
use crate::state::{FieldStore, ProgressTracker, VisibilityMap};
use crate::validation::{FieldValues, ValidationOutcome, ValidationScope};
use crate::value::{FieldId, FieldValue};

/// Receives errors raised by scheduled validations.
pub type ErrorHandler = Arc<dyn Fn(&FormError) + Send + Sync>;

struct Runtime {
    ctx: ExecutionContext,
    on_error: Option<ErrorHandler>,
}

struct ManagerInner {
    registry: FieldRegistry,
    store: Arc<FieldStore>,
    strategy: ValidationStrategy,
    visibility: VisibilityMap,
    visibility_version: watch::Sender<u64>,
    visibility_debounce: Duration,
    all_required_filled: Observable<bool>,
    progress: Arc<ProgressTracker>,
    scheduler: ValidationScheduler,
    events: Signal<ValidationEvent>,
    runtime: OnceLock<Runtime>,
}

/// Orchestrates field state and validation for one form.
///
/// Cloning is cheap and yields another handle to the same form.
#[derive(Clone)]
pub struct FormManager {
    inner: Arc<ManagerInner>,
}

impl fmt::Debug for FormManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormManager")
            .field("fields", &self.inner.registry.ids())
            .field("strategy", &self.inner.strategy)
            .field("initialized", &self.is_initialized())
            .field("pending_validations", &self.pending_validations())
            .finish_non_exhaustive()
    }
}

impl FormManager {
    /// Creates a manager over `fields` with a default `strategy`.
    ///
    /// The visibility debounce window comes from the global
    /// [`SETTINGS`].
    pub fn new(fields: Vec<FieldDescriptor>, strategy: ValidationStrategy) -> FormResult<Self> {
        Self::build(fields, strategy, SETTINGS.get().visibility_debounce())
    }

    /// Creates a manager using the strategy and debounce window of
    /// `settings`.
    pub fn with_settings(fields: Vec<FieldDescriptor>, settings: &FormSettings) -> FormResult<Self> {
        Self::build(fields, settings.default_strategy, settings.visibility_debounce())
    }

    fn build(
        fields: Vec<FieldDescriptor>,
        strategy: ValidationStrategy,
        visibility_debounce: Duration,
    ) -> FormResult<Self> {
        let registry = FieldRegistry::build(fields)?;
        let store = FieldStore::from_states(
            registry
                .descriptors()
                .map(|d| (d.id.clone(), d.initial_state())),
        );
        let visibility = VisibilityMap::new(registry.descriptors().map(|d| (d.id.clone(), d.visible)));

        let inner = ManagerInner {
            registry,
            store: Arc::new(store),
            strategy,
            visibility,
            visibility_version: watch::Sender::new(0),
            visibility_debounce,
            all_required_filled: Observable::new(false),
            progress: Arc::new(ProgressTracker::new()),
            scheduler: ValidationScheduler::new(),
            events: Signal::new(),
            runtime: OnceLock::new(),
        };
        inner.recompute_required();

        tracing::debug!(
            fields = inner.registry.len(),
            strategy = ?strategy,
            "Form manager created"
        );

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Binds the manager to an execution context and starts the visibility
    /// debounce loop.
    ///
    /// Must be called exactly once, before any mutator or validation.
    /// `on_error` receives errors from scheduled validations; without one
    /// they are logged at `warn`.
    pub fn initialize(&self, ctx: ExecutionContext, on_error: Option<ErrorHandler>) -> FormResult<()> {
        let token = ctx.token().clone();
        let handle = ctx.handle().clone();
        self.inner
            .runtime
            .set(Runtime { ctx, on_error })
            .map_err(|_| FormError::AlreadyInitialized)?;

        let weak = Arc::downgrade(&self.inner);
        let version = self.inner.visibility_version.subscribe();
        let window = self.inner.visibility_debounce;
        handle.spawn(
            debounce_visibility(weak, version, window, token)
                .instrument(tracing::debug_span!("visibility_debounce")),
        );

        tracing::debug!("Form manager initialized");
        Ok(())
    }

    /// Returns `true` once [`initialize`](Self::initialize) has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.inner.runtime.get().is_some()
    }

    // ── Mutators ─────────────────────────────────────────────────────

    /// Records a new value for a field.
    ///
    /// The new state (with no validation result) is published before this
    /// returns. Depending on the field's strategy and dependents, a
    /// validation may be scheduled in the background.
    pub fn value_changed(&self, id: &str, value: Option<FieldValue>) -> FormResult<()> {
        let runtime = self.inner.runtime()?;
        let descriptor = self.inner.registry.descriptor(id)?;
        descriptor.check_kind(value.as_ref())?;

        self.inner
            .store
            .slot(id)?
            .replace(FieldState::new(value, None));

        if self.inner.registry.is_required(id) {
            self.inner.recompute_required();
        }

        let strategy = self.inner.strategy_of(descriptor);
        let has_dependents = !self.inner.registry.dependents(id).is_empty();
        if strategy.is_inline() || has_dependents {
            self.inner.schedule(
                runtime,
                &descriptor.id,
                strategy.delay().unwrap_or_default(),
                strategy.is_inline(),
            );
        }
        Ok(())
    }

    /// Signals that a field lost focus.
    ///
    /// Schedules validation of the field and its filled dependents when the
    /// field's strategy is [`ValidationStrategy::AutoOnFocusClear`];
    /// otherwise does nothing.
    pub fn focus_cleared(&self, id: &str) -> FormResult<()> {
        let runtime = self.inner.runtime()?;
        let descriptor = self.inner.registry.descriptor(id)?;
        if self.inner.strategy_of(descriptor) == ValidationStrategy::AutoOnFocusClear {
            self.inner.schedule(runtime, &descriptor.id, Duration::ZERO, true);
        }
        Ok(())
    }

    /// Records whether a field is currently shown.
    ///
    /// Repeated signals with the same visibility are ignored. Returns `true`
    /// if the visibility changed. The "all required fields filled" flag
    /// picks up the change after the debounce window.
    pub fn visibility_changed(&self, id: &str, visible: bool) -> FormResult<bool> {
        self.inner.runtime()?;
        let descriptor = self.inner.registry.descriptor(id)?;
        if !self.inner.visibility.set(&descriptor.id, visible) {
            return Ok(false);
        }
        tracing::trace!(field = %descriptor.id, visible, "Visibility changed");
        self.inner.visibility_version.send_modify(|v| *v += 1);
        Ok(true)
    }

    // ── Validation ───────────────────────────────────────────────────

    /// Validates one field now and stores the result.
    ///
    /// Invisible fields are valid without running any validator. Returns
    /// whether the field is valid.
    pub async fn validate_field(&self, id: &str) -> FormResult<bool> {
        let runtime = self.inner.runtime()?;
        let token = runtime.ctx.token().child_token();
        self.inner.validate_one(id, &token).await
    }

    /// Validates every field and stores each result.
    ///
    /// Every field is validated even after one turns out invalid, so each
    /// failing field records its first invalid outcome. Returns `true` if
    /// all fields are valid.
    pub async fn validate_form(&self) -> FormResult<bool> {
        let runtime = self.inner.runtime()?;
        let _progress = self.inner.progress.enter();
        let token = runtime.ctx.token().child_token();

        let mut all_valid = true;
        for id in self.inner.registry.ids() {
            all_valid &= self.inner.validate_one(id, &token).await?;
        }
        tracing::debug!(valid = all_valid, "Form validated");
        Ok(all_valid)
    }

    // ── Bulk operations ──────────────────────────────────────────────

    /// Restores every field to its declared initial value and result.
    ///
    /// Pending and running scheduled validations are cancelled first.
    pub fn clear_form(&self) -> FormResult<()> {
        self.inner.runtime()?;
        let cancelled = self.inner.scheduler.cancel_all();
        for descriptor in self.inner.registry.descriptors() {
            self.inner
                .store
                .slot(&descriptor.id)?
                .replace(descriptor.initial_state());
        }
        self.inner.recompute_required();
        tracing::debug!(cancelled, "Form cleared");
        Ok(())
    }

    /// Marks every field invalid without a field-level reason, leaving
    /// values untouched.
    ///
    /// Pending scheduled validations are cancelled, and a run that is
    /// already past its cancellation checks has its result discarded.
    pub fn set_form_invalid(&self) -> FormResult<()> {
        self.inner.runtime()?;
        let cancelled = self.inner.scheduler.cancel_all();
        for id in self.inner.registry.ids() {
            self.inner.store.slot(id)?.force_outcome(ValidationOutcome::unknown());
        }
        tracing::debug!(cancelled, "Form marked invalid");
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────
    //
    // Anything that reads field or manager state requires `initialize`.
    // Lookups into the declared registry do not.

    /// A handle scoped to one field.
    pub fn field(&self, id: &str) -> FormResult<FieldHandle> {
        self.inner.runtime()?;
        let descriptor = self.inner.registry.descriptor(id)?;
        Ok(FieldHandle::new(self.clone(), descriptor.id.clone()))
    }

    /// A snapshot of a field's state.
    pub fn field_state(&self, id: &str) -> FormResult<FieldState> {
        self.inner.runtime()?;
        Ok(self.inner.store.slot(id)?.state())
    }

    /// A receiver for a field's state, positioned at the current value.
    pub fn subscribe_field(&self, id: &str) -> FormResult<watch::Receiver<FieldState>> {
        self.inner.runtime()?;
        Ok(self.inner.store.slot(id)?.observable().subscribe())
    }

    /// Connects a named callback to a field's state. The callback is called
    /// with the current state immediately. It must not mutate the field it
    /// observes.
    pub fn connect_field(
        &self,
        id: &str,
        receiver_id: impl Into<String>,
        callback: SignalReceiver<FieldState>,
    ) -> FormResult<()> {
        self.inner.runtime()?;
        self.inner
            .store
            .slot(id)?
            .observable()
            .connect(receiver_id, callback);
        Ok(())
    }

    /// Disconnects a named callback from a field's state.
    pub fn disconnect_field(&self, id: &str, receiver_id: &str) -> FormResult<bool> {
        self.inner.runtime()?;
        Ok(self.inner.store.slot(id)?.observable().disconnect(receiver_id))
    }

    /// Read-only access to every field's current value.
    pub fn values(&self) -> FormResult<FieldValues> {
        self.inner.runtime()?;
        Ok(FieldValues::new(Arc::clone(&self.inner.store)))
    }

    /// Whether a field is currently visible.
    pub fn is_visible(&self, id: &str) -> FormResult<bool> {
        self.inner.runtime()?;
        self.inner.registry.descriptor(id)?;
        Ok(self.inner.visibility.is_visible(id))
    }

    /// Whether every visible required field holds a value.
    pub fn all_required_filled(&self) -> FormResult<bool> {
        self.inner.runtime()?;
        Ok(self.inner.all_required_filled.get())
    }

    /// The observable behind [`all_required_filled`](Self::all_required_filled).
    pub fn all_required_filled_observable(&self) -> FormResult<&Observable<bool>> {
        self.inner.runtime()?;
        Ok(&self.inner.all_required_filled)
    }

    /// A receiver for [`all_required_filled`](Self::all_required_filled).
    pub fn subscribe_all_required_filled(&self) -> FormResult<watch::Receiver<bool>> {
        self.inner.runtime()?;
        Ok(self.inner.all_required_filled.subscribe())
    }

    /// Whether a scheduled validation or [`validate_form`](Self::validate_form)
    /// is running.
    pub fn validation_in_progress(&self) -> FormResult<bool> {
        self.inner.runtime()?;
        Ok(self.inner.progress.is_active())
    }

    /// The observable behind
    /// [`validation_in_progress`](Self::validation_in_progress).
    pub fn validation_in_progress_observable(&self) -> FormResult<&Observable<bool>> {
        self.inner.runtime()?;
        Ok(self.inner.progress.flag())
    }

    /// A receiver for [`validation_in_progress`](Self::validation_in_progress).
    pub fn subscribe_validation_in_progress(&self) -> FormResult<watch::Receiver<bool>> {
        self.inner.runtime()?;
        Ok(self.inner.progress.flag().subscribe())
    }

    /// Lifecycle events of scheduled validations.
    pub fn events(&self) -> &Signal<ValidationEvent> {
        &self.inner.events
    }

    /// Field ids in declaration order.
    pub fn field_ids(&self) -> &[FieldId] {
        self.inner.registry.ids()
    }

    /// Required field ids in declaration order.
    pub fn required_fields(&self) -> Vec<FieldId> {
        self.inner.registry.required()
    }

    /// Whether a field has a validator that demands a value.
    pub fn is_required(&self, id: &str) -> FormResult<bool> {
        self.inner.registry.descriptor(id)?;
        Ok(self.inner.registry.is_required(id))
    }

    /// Fields whose validators read `id`.
    pub fn dependents_of(&self, id: &str) -> FormResult<&[FieldId]> {
        self.inner.registry.descriptor(id)?;
        Ok(self.inner.registry.dependents(id))
    }

    /// The manager-wide default strategy.
    pub fn default_strategy(&self) -> ValidationStrategy {
        self.inner.strategy
    }

    /// The strategy in effect for a field.
    pub fn strategy_for(&self, id: &str) -> FormResult<ValidationStrategy> {
        let descriptor = self.inner.registry.descriptor(id)?;
        Ok(self.inner.strategy_of(descriptor))
    }

    /// Number of fields with a pending or running scheduled validation.
    pub fn pending_validations(&self) -> usize {
        self.inner.scheduler.in_flight()
    }
}

impl ManagerInner {
    fn runtime(&self) -> FormResult<&Runtime> {
        self.runtime.get().ok_or(FormError::NotInitialized)
    }

    fn strategy_of(&self, descriptor: &FieldDescriptor) -> ValidationStrategy {
        descriptor.strategy.unwrap_or(self.strategy)
    }

    /// Folds the current values and visibility into the required flag.
    fn recompute_required(&self) {
        let filled = self.registry.ids().iter().all(|id| {
            !self.registry.is_required(id)
                || !self.visibility.is_visible(id)
                || self
                    .store
                    .get(id)
                    .is_some_and(|slot| slot.with_state(FieldState::is_filled))
        });
        if self.all_required_filled.set_if_changed(filled) {
            tracing::debug!(all_required_filled = filled, "Required fields changed");
        }
    }

    /// Starts a background run for `field`, replacing any previous run for
    /// the same field.
    fn schedule(self: &Arc<Self>, runtime: &Runtime, field: &FieldId, delay: Duration, validate_self: bool) {
        let (ticket, superseded) = self.scheduler.begin(field, runtime.ctx.token());
        if let Some(previous) = superseded {
            tracing::debug!(
                field = %field,
                generation = previous,
                superseded_by = ticket.generation,
                "Validation superseded"
            );
            self.events.send(&ValidationEvent::Superseded {
                field: field.clone(),
                generation: previous,
                superseded_by: ticket.generation,
            });
        }
        self.events.send(&ValidationEvent::Scheduled {
            field: field.clone(),
            generation: ticket.generation,
            delay,
        });

        let progress = self.progress.enter();
        let span = validation_span(field, ticket.generation);
        let inner = Arc::clone(self);
        let field = field.clone();
        let on_error = runtime.on_error.clone();

        runtime.ctx.handle().spawn(
            async move {
                let _progress = progress;
                let Ticket { generation, token } = ticket;

                let body = async {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    if token.is_cancelled() || !inner.scheduler.is_current(&field, generation) {
                        return Ok(false);
                    }
                    inner.run_cascade(&field, validate_self, &token).await?;
                    Ok::<_, FormError>(true)
                };

                // The body is polled first so a validator racing the token
                // gets to observe the cancellation itself.
                let result = tokio::select! {
                    biased;
                    result = body => Some(result),
                    () = token.cancelled() => None,
                };
                inner.scheduler.finish(&field, generation);

                match result {
                    Some(Ok(true)) => {
                        tracing::debug!("Validation completed");
                        inner.events.send(&ValidationEvent::Completed { field, generation });
                    }
                    Some(Err(e)) if !e.is_cancellation() && !token.is_cancelled() => {
                        inner.events.send(&ValidationEvent::Failed {
                            field,
                            generation,
                            message: e.to_string(),
                        });
                        match on_error {
                            Some(handler) => handler(&e),
                            None => tracing::warn!(error = %e, "Scheduled validation failed"),
                        }
                    }
                    Some(Ok(false) | Err(_)) | None => {
                        tracing::debug!("Validation cancelled");
                        inner.events.send(&ValidationEvent::Cancelled { field, generation });
                    }
                }
            }
            .instrument(span),
        );
    }

    /// Validates `field` (optionally) and then reconsiders its filled
    /// dependents.
    ///
    /// A dependent whose own strategy is manual has its result cleared
    /// instead of being re-run.
    async fn run_cascade(&self, field: &FieldId, validate_self: bool, token: &CancellationToken) -> FormResult<()> {
        if validate_self {
            self.validate_one(field, token).await?;
        }

        for dependent in self.registry.dependents(field) {
            let slot = self.store.slot(dependent)?;
            if !slot.with_state(FieldState::is_filled) {
                continue;
            }
            let descriptor = self.registry.descriptor(dependent)?;
            if self.strategy_of(descriptor).is_manual() {
                if slot.clear_outcome() {
                    tracing::debug!(dependent = %dependent, "Dependent result cleared");
                    self.events.send(&ValidationEvent::OutcomeCleared {
                        field: dependent.clone(),
                    });
                }
            } else {
                self.validate_one(dependent, token).await?;
            }
        }
        Ok(())
    }

    /// Runs a field's validators in order, stopping at the first invalid
    /// outcome, and stores the result unless the value changed meanwhile.
    async fn validate_one(&self, id: &str, token: &CancellationToken) -> FormResult<bool> {
        let descriptor = self.registry.descriptor(id)?;
        if !self.visibility.is_visible(id) {
            tracing::trace!(field = id, "Skipping invisible field");
            return Ok(true);
        }

        let slot = self.store.slot(id)?;
        let (value, revision) = slot.snapshot();
        let _progress = slot.begin_validation();
        let scope = ValidationScope::new(
            descriptor.id.clone(),
            FieldValues::new(Arc::clone(&self.store)),
            token.clone(),
        );

        let mut outcome = ValidationOutcome::Valid;
        for validator in &descriptor.validators {
            if token.is_cancelled() {
                return Err(FormError::Validator {
                    field: id.to_string(),
                    source: ValidatorError::Cancelled,
                });
            }
            let result = validator
                .validate(value.as_ref(), &scope)
                .await
                .map_err(|source| FormError::Validator {
                    field: id.to_string(),
                    source,
                })?;
            if result.is_invalid() {
                tracing::trace!(field = id, validator = validator.name(), "Value rejected");
                outcome = result;
                break;
            }
        }

        let valid = outcome.is_valid();
        if !slot.store_outcome(outcome, revision) {
            tracing::debug!(field = id, revision, "Discarding stale validation result");
            self.events.send(&ValidationEvent::StaleDiscarded {
                field: descriptor.id.clone(),
                revision,
            });
        }
        Ok(valid)
    }
}

/// Recomputes the required flag once visibility has been quiet for
/// `window`.
async fn debounce_visibility(
    inner: std::sync::Weak<ManagerInner>,
    mut version: watch::Receiver<u64>,
    window: Duration,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            () = token.cancelled() => return,
            changed = version.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }

        // Trailing edge: every further change restarts the window.
        loop {
            tokio::select! {
                () = token.cancelled() => return,
                changed = version.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                () = tokio::time::sleep(window) => break,
            }
        }

        let Some(strong) = inner.upgrade() else {
            return;
        };
        strong.recompute_required();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::Required;
    use crate::value::ValueKind;

    fn manager() -> FormManager {
        FormManager::new(
            vec![
                FieldDescriptor::new("name", ValueKind::Text).validator(Required),
                FieldDescriptor::new("bio", ValueKind::Text),
            ],
            ValidationStrategy::Manual,
        )
        .unwrap()
    }

    #[test]
    fn test_use_before_initialize() {
        let manager = manager();
        assert!(!manager.is_initialized());
        assert!(matches!(
            manager.value_changed("name", None),
            Err(FormError::NotInitialized)
        ));
        assert!(matches!(manager.clear_form(), Err(FormError::NotInitialized)));
        assert!(matches!(
            manager.visibility_changed("name", false),
            Err(FormError::NotInitialized)
        ));
    }

    #[test]
    fn test_state_queries_before_initialize() {
        let manager = manager();
        assert!(matches!(manager.field_state("name"), Err(FormError::NotInitialized)));
        assert!(matches!(manager.field("name"), Err(FormError::NotInitialized)));
        assert!(matches!(manager.subscribe_field("name"), Err(FormError::NotInitialized)));
        assert!(matches!(manager.is_visible("bio"), Err(FormError::NotInitialized)));
        assert!(matches!(manager.values(), Err(FormError::NotInitialized)));
        assert!(matches!(manager.all_required_filled(), Err(FormError::NotInitialized)));
        assert!(matches!(
            manager.validation_in_progress(),
            Err(FormError::NotInitialized)
        ));
        assert!(manager.subscribe_all_required_filled().is_err());
        assert!(manager.validation_in_progress_observable().is_err());
    }

    #[test]
    fn test_declaration_lookups_before_initialize() {
        let manager = manager();
        assert_eq!(manager.field_ids().len(), 2);
        assert_eq!(manager.required_fields(), vec![FieldId::from("name")]);
        assert_eq!(manager.strategy_for("bio").unwrap(), ValidationStrategy::Manual);
        assert!(manager.is_required("name").unwrap());
        assert!(manager.dependents_of("name").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_twice() {
        let manager = manager();
        manager.initialize(ExecutionContext::current().unwrap(), None).unwrap();
        assert!(manager.is_initialized());
        assert!(matches!(
            manager.initialize(ExecutionContext::current().unwrap(), None),
            Err(FormError::AlreadyInitialized)
        ));
    }

    #[tokio::test]
    async fn test_value_changed_replaces_state() {
        let manager = manager();
        manager.initialize(ExecutionContext::current().unwrap(), None).unwrap();
        manager.set_form_invalid().unwrap();

        manager.value_changed("name", Some("Ada".into())).unwrap();
        let state = manager.field_state("name").unwrap();
        assert_eq!(state.value, Some(FieldValue::from("Ada")));
        assert_eq!(state.validation_result, None);
        assert!(!state.validation_in_progress);
        assert!(manager.all_required_filled().unwrap());
        assert_eq!(manager.pending_validations(), 0);
    }

    #[test]
    fn test_with_settings_uses_strategy() {
        let settings = FormSettings {
            default_strategy: ValidationStrategy::AutoOnFocusClear,
            ..FormSettings::default()
        };
        let manager = FormManager::with_settings(
            vec![FieldDescriptor::new("a", ValueKind::Text)],
            &settings,
        )
        .unwrap();
        assert_eq!(manager.default_strategy(), ValidationStrategy::AutoOnFocusClear);
    }

    #[tokio::test]
    async fn test_required_flag_at_construction() {
        let manager = FormManager::new(
            vec![FieldDescriptor::new("name", ValueKind::Text)
                .validator(Required)
                .initial("Grace")],
            ValidationStrategy::Manual,
        )
        .unwrap();
        manager.initialize(ExecutionContext::current().unwrap(), None).unwrap();
        assert!(manager.all_required_filled().unwrap());
    }
}
