//! The closed set of fields a manager works with.
//!
//! [`FieldRegistry::build`] checks descriptors once, up front, and derives
//! the two structures the manager consults on every change: the set of
//! required fields and the reverse dependency map (field → fields whose
//! validators read it).

use std::collections::{HashMap, HashSet};

use formstate_core::{FormError, FormResult};

use crate::fields::FieldDescriptor;
use crate::value::FieldId;

/// Validated field descriptors plus derived lookups.
#[derive(Debug)]
pub struct FieldRegistry {
    order: Vec<FieldId>,
    descriptors: HashMap<FieldId, FieldDescriptor>,
    required: HashSet<FieldId>,
    dependents: HashMap<FieldId, Vec<FieldId>>,
}

impl FieldRegistry {
    /// Builds a registry from descriptors, in declaration order.
    ///
    /// Fails on duplicate ids, initial values of the wrong kind, and
    /// validators connected to fields that are not registered.
    pub fn build(fields: Vec<FieldDescriptor>) -> FormResult<Self> {
        let mut order = Vec::with_capacity(fields.len());
        let mut descriptors = HashMap::with_capacity(fields.len());

        for field in fields {
            field.check_kind(field.initial_value.as_ref())?;
            if descriptors.contains_key(&field.id) {
                return Err(FormError::DuplicateField(field.id.to_string()));
            }
            order.push(field.id.clone());
            descriptors.insert(field.id.clone(), field);
        }

        let mut required = HashSet::new();
        let mut dependents: HashMap<FieldId, Vec<FieldId>> = HashMap::new();

        for id in &order {
            let field = &descriptors[id];
            for validator in &field.validators {
                let meta = validator.meta();
                if meta.is_required {
                    required.insert(id.clone());
                }
                for source in meta.connected_fields {
                    if !descriptors.contains_key(&source) {
                        return Err(FormError::UnknownField(source.to_string()));
                    }
                    let entry = dependents.entry(source).or_default();
                    if !entry.contains(id) {
                        entry.push(id.clone());
                    }
                }
            }
        }

        tracing::debug!(
            fields = order.len(),
            required = required.len(),
            connections = dependents.values().map(Vec::len).sum::<usize>(),
            "Field registry built"
        );

        Ok(Self {
            order,
            descriptors,
            required,
            dependents,
        })
    }

    /// Looks up a descriptor.
    pub fn descriptor(&self, id: &str) -> FormResult<&FieldDescriptor> {
        self.descriptors
            .get(id)
            .ok_or_else(|| FormError::UnknownField(id.to_string()))
    }

    /// Field ids in declaration order.
    pub fn ids(&self) -> &[FieldId] {
        &self.order
    }

    /// Descriptors in declaration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.order.iter().map(|id| &self.descriptors[id])
    }

    /// Whether any validator of the field demands a value.
    pub fn is_required(&self, id: &str) -> bool {
        self.required.contains(id)
    }

    /// Required field ids in declaration order.
    pub fn required(&self) -> Vec<FieldId> {
        self.order
            .iter()
            .filter(|id| self.required.contains(id.as_str()))
            .cloned()
            .collect()
    }

    /// Fields with a validator connected to `id`, in declaration order.
    pub fn dependents(&self, id: &str) -> &[FieldId] {
        self.dependents.get(id).map_or(&[][..], Vec::as_slice)
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no fields are registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{EqualsTo, MinLength, Required};
    use crate::value::{FieldValue, ValueKind};

    fn signup() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("password", ValueKind::Text)
                .validator(Required)
                .validator(MinLength::new(8)),
            FieldDescriptor::new("confirm", ValueKind::Text)
                .validator(Required)
                .validator(EqualsTo::new("password")),
            FieldDescriptor::new("nickname", ValueKind::Text),
        ]
    }

    #[test]
    fn test_build_derives_required_and_dependents() {
        let registry = FieldRegistry::build(signup()).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.is_required("password"));
        assert!(registry.is_required("confirm"));
        assert!(!registry.is_required("nickname"));
        assert_eq!(
            registry.required(),
            vec![FieldId::from("password"), FieldId::from("confirm")]
        );
        assert_eq!(registry.dependents("password"), &[FieldId::from("confirm")]);
        assert!(registry.dependents("confirm").is_empty());
    }

    #[test]
    fn test_declaration_order_preserved() {
        let registry = FieldRegistry::build(signup()).unwrap();
        let ids: Vec<&str> = registry.descriptors().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["password", "confirm", "nickname"]);
        assert_eq!(registry.ids()[2].as_str(), "nickname");
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let fields = vec![
            FieldDescriptor::new("a", ValueKind::Text),
            FieldDescriptor::new("a", ValueKind::Int),
        ];
        assert!(matches!(
            FieldRegistry::build(fields),
            Err(FormError::DuplicateField(id)) if id == "a"
        ));
    }

    #[test]
    fn test_unknown_connection_rejected() {
        let fields = vec![FieldDescriptor::new("confirm", ValueKind::Text)
            .validator(EqualsTo::new("password"))];
        assert!(matches!(
            FieldRegistry::build(fields),
            Err(FormError::UnknownField(id)) if id == "password"
        ));
    }

    #[test]
    fn test_initial_value_kind_checked() {
        let fields = vec![FieldDescriptor::new("age", ValueKind::Int).initial("ten")];
        assert!(matches!(
            FieldRegistry::build(fields),
            Err(FormError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_repeated_connection_deduplicated() {
        let fields = vec![
            FieldDescriptor::new("a", ValueKind::Text),
            FieldDescriptor::new("b", ValueKind::Text)
                .validator(EqualsTo::new("a"))
                .validator(EqualsTo::new("a")),
        ];
        let registry = FieldRegistry::build(fields).unwrap();
        assert_eq!(registry.dependents("a").len(), 1);
        assert_eq!(
            registry.descriptor("a").unwrap().initial_value,
            None::<FieldValue>
        );
    }

    #[test]
    fn test_descriptor_unknown() {
        let registry = FieldRegistry::build(Vec::new()).unwrap();
        assert!(registry.is_empty());
        assert!(registry.descriptor("x").is_err());
    }
}
