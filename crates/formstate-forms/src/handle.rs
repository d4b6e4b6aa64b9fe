//! Per-field handles for UI widgets.

use tokio::sync::watch;

use formstate_core::{FormResult, ValidationStrategy};
use formstate_signals::SignalReceiver;

use crate::fields::FieldState;
use crate::manager::FormManager;
use crate::value::{FieldId, FieldValue, FromFieldValue};

/// A manager handle scoped to one field.
///
/// This is what a widget holds: it observes the field's state and forwards
/// the three UI events (value changed, focus cleared, visibility changed).
/// The id is known to be registered, so lookups cannot fail; errors come
/// only from lifecycle misuse and type mismatches.
#[derive(Debug, Clone)]
pub struct FieldHandle {
    manager: FormManager,
    id: FieldId,
}

impl FieldHandle {
    pub(crate) const fn new(manager: FormManager, id: FieldId) -> Self {
        Self { manager, id }
    }

    /// The field id.
    pub const fn id(&self) -> &FieldId {
        &self.id
    }

    /// The manager this handle belongs to.
    pub const fn manager(&self) -> &FormManager {
        &self.manager
    }

    /// A snapshot of the field's state.
    pub fn state(&self) -> FormResult<FieldState> {
        self.manager.field_state(&self.id)
    }

    /// A receiver for the field's state, positioned at the current value.
    pub fn subscribe(&self) -> FormResult<watch::Receiver<FieldState>> {
        self.manager.subscribe_field(&self.id)
    }

    /// Connects a named callback, called with the current state immediately
    /// and then with every change.
    pub fn connect(&self, receiver_id: impl Into<String>, callback: SignalReceiver<FieldState>) -> FormResult<()> {
        self.manager.connect_field(&self.id, receiver_id, callback)
    }

    /// Disconnects a named callback.
    pub fn disconnect(&self, receiver_id: &str) -> FormResult<bool> {
        self.manager.disconnect_field(&self.id, receiver_id)
    }

    /// Forwards a value change.
    pub fn value_changed(&self, value: Option<FieldValue>) -> FormResult<()> {
        self.manager.value_changed(&self.id, value)
    }

    /// Sets a value.
    pub fn set(&self, value: impl Into<FieldValue>) -> FormResult<()> {
        self.value_changed(Some(value.into()))
    }

    /// Empties the field.
    pub fn clear_value(&self) -> FormResult<()> {
        self.value_changed(None)
    }

    /// Forwards a focus loss.
    pub fn focus_cleared(&self) -> FormResult<()> {
        self.manager.focus_cleared(&self.id)
    }

    /// Forwards a visibility change. Returns `true` if it changed.
    pub fn visibility_changed(&self, visible: bool) -> FormResult<bool> {
        self.manager.visibility_changed(&self.id, visible)
    }

    /// Validates the field now.
    pub async fn validate(&self) -> FormResult<bool> {
        self.manager.validate_field(&self.id).await
    }

    /// The current value, read as a concrete type.
    pub fn value_as<T: FromFieldValue>(&self) -> FormResult<Option<T>> {
        self.manager.values()?.get_as(&self.id)
    }

    /// Whether the field is currently visible.
    pub fn is_visible(&self) -> FormResult<bool> {
        self.manager.is_visible(&self.id)
    }

    /// Whether the field has a validator that demands a value.
    pub fn is_required(&self) -> FormResult<bool> {
        self.manager.is_required(&self.id)
    }

    /// The strategy in effect for this field.
    pub fn strategy(&self) -> FormResult<ValidationStrategy> {
        self.manager.strategy_for(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::fields::FieldDescriptor;
    use crate::scheduler::ExecutionContext;
    use crate::validators::{MinLength, Required};
    use crate::value::ValueKind;

    async fn handle() -> FieldHandle {
        let manager = FormManager::new(
            vec![FieldDescriptor::new("username", ValueKind::Text)
                .validator(Required)
                .validator(MinLength::new(3))],
            ValidationStrategy::Manual,
        )
        .unwrap();
        manager
            .initialize(ExecutionContext::current().unwrap(), None)
            .unwrap();
        manager.field("username").unwrap()
    }

    #[tokio::test]
    async fn test_handle_forwards_and_reads() {
        let field = handle().await;
        assert_eq!(field.id().as_str(), "username");
        assert!(field.is_required().unwrap());
        assert!(field.is_visible().unwrap());

        field.set("al").unwrap();
        assert_eq!(field.value_as::<String>().unwrap(), Some("al".to_string()));
        assert!(!field.validate().await.unwrap());
        assert_eq!(
            field.state().unwrap().validation_result.unwrap().message_id(),
            Some("validation.min_length")
        );

        field.clear_value().unwrap();
        assert_eq!(field.state().unwrap().value, None);
        assert!(field.value_as::<i64>().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_handle_connect_replays_and_follows() {
        let field = handle().await;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        field
            .connect(
                "widget",
                Arc::new(move |state: &FieldState| sink.lock().unwrap().push(state.value.clone())),
            )
            .unwrap();
        field.set("ada").unwrap();
        assert!(field.disconnect("widget").unwrap());
        field.set("grace").unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some(FieldValue::from("ada"))]
        );
    }

    #[tokio::test]
    async fn test_handle_type_mismatch() {
        let field = handle().await;
        assert!(field.set(42).is_err());
        assert_eq!(field.strategy().unwrap(), ValidationStrategy::Manual);
    }
}
