//! Author entity

use serde::{Deserialize, Serialize};

use super::MAX_TEXT_LENGTH;
use crate::domain::record::{
    unknown_field, wrong_kind, Entity, EntitySchema, FieldDef, FieldKind, FieldValue, RecordId,
    RelationDef,
};
use crate::domain::DomainError;

pub static AUTHOR_SCHEMA: EntitySchema = EntitySchema {
    name: "author",
    fields: &[FieldDef {
        name: "name",
        label: "Name",
        kind: FieldKind::Char {
            max_length: MAX_TEXT_LENGTH,
        },
        required: true,
    }],
    relations: &[RelationDef {
        name: "books",
        child: "book",
        foreign_key: "author",
    }],
};

/// Author entity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<RecordId>,
    name: String,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Detail URL for the author with the given id
    pub fn detail_url(id: RecordId) -> String {
        format!("/author/{}/", id)
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl Entity for Author {
    fn schema() -> &'static EntitySchema {
        &AUTHOR_SCHEMA
    }

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "name" => Some(FieldValue::text(&self.name)),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), DomainError> {
        match (field, value) {
            ("name", FieldValue::Text(name)) => {
                self.name = name;
                Ok(())
            }
            ("name", other) => Err(wrong_kind::<Self>(field, &other)),
            _ => Err(unknown_field::<Self>(field)),
        }
    }

    fn absolute_url(&self) -> Option<String> {
        self.id.map(Self::detail_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_fields() {
        let mut author = Author::new("Jane Austen");
        assert_eq!(author.get("name"), Some(FieldValue::text("Jane Austen")));
        assert_eq!(author.get("age"), None);

        author.set("name", FieldValue::text("Mary Shelley")).unwrap();
        assert_eq!(author.name(), "Mary Shelley");
    }

    #[test]
    fn test_author_set_rejects_bad_input() {
        let mut author = Author::default();
        assert!(author.set("name", FieldValue::Integer(1)).is_err());
        assert!(author.set("age", FieldValue::Integer(1)).is_err());
    }

    #[test]
    fn test_author_absolute_url() {
        let mut author = Author::new("Jane Austen");
        assert_eq!(author.absolute_url(), None);

        author.set_id(RecordId::new(3));
        assert_eq!(author.absolute_url().as_deref(), Some("/author/3/"));
    }

    #[test]
    fn test_author_values_include_id() {
        let mut author = Author::new("Jane Austen");
        author.set_id(RecordId::new(9));

        let values = author.values();
        assert_eq!(values.get("id"), Some(&FieldValue::Integer(9)));
        assert_eq!(values.get("name"), Some(&FieldValue::text("Jane Austen")));
    }
}
