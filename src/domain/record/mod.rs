//! Record domain - entity values, schemas and the record store contract
//!
//! Entities expose their fields by name so that forms and the inline workflow can
//! be configured with plain field lists instead of being written per entity type.

mod entity;
mod schema;
mod store;
mod value;

pub use entity::Entity;
pub(crate) use entity::{unknown_field, wrong_kind};
pub use schema::{EntitySchema, FieldDef, FieldKind, RelationDef};
pub use store::RecordStore;
pub use value::{FieldValue, FieldValues, RecordId};

#[cfg(test)]
pub use store::mock;
