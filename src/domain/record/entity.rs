//! Entity trait

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

use super::schema::EntitySchema;
use super::value::{FieldValue, FieldValues, RecordId};
use crate::domain::DomainError;

/// A record type that can be edited through forms and kept in a record store
///
/// Fields are addressed by the names declared in [`Entity::schema`]. `Default`
/// produces the blank, not yet persisted instance.
pub trait Entity:
    Clone + Debug + Default + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Static schema of the entity type
    fn schema() -> &'static EntitySchema;

    /// Identity, `None` until the record store assigned one
    fn id(&self) -> Option<RecordId>;

    fn set_id(&mut self, id: RecordId);

    /// Value of a declared field, `None` for undeclared names
    fn get(&self, field: &str) -> Option<FieldValue>;

    /// Assign a declared field
    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), DomainError>;

    /// Canonical detail URL of the record, if the type has one
    fn absolute_url(&self) -> Option<String> {
        None
    }

    /// All declared field values plus the identity under `id`
    fn values(&self) -> FieldValues {
        let mut values: FieldValues = Self::schema()
            .fields
            .iter()
            .filter_map(|field| self.get(field.name).map(|v| (field.name.to_string(), v)))
            .collect();
        values.insert(EntitySchema::ID_FIELD.to_string(), FieldValue::from(self.id()));
        values
    }

    /// Look up an attribute by name, including `id`
    fn attribute(&self, name: &str) -> Option<FieldValue> {
        if name == EntitySchema::ID_FIELD {
            Some(FieldValue::from(self.id()))
        } else {
            self.get(name)
        }
    }

    /// Assign several fields at once
    fn apply(&mut self, values: &FieldValues) -> Result<(), DomainError> {
        for (field, value) in values {
            self.set(field, value.clone())?;
        }
        Ok(())
    }
}

/// Error for a field name the entity does not declare
pub(crate) fn unknown_field<E: Entity>(field: &str) -> DomainError {
    DomainError::validation(format!(
        "{} has no field '{}'",
        E::schema().name,
        field
    ))
}

/// Error for a value of the wrong kind
pub(crate) fn wrong_kind<E: Entity>(field: &str, value: &FieldValue) -> DomainError {
    DomainError::validation(format!(
        "{}.{} cannot hold {:?}",
        E::schema().name,
        field,
        value
    ))
}
