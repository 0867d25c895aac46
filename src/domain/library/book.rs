//! Book entity

use serde::{Deserialize, Serialize};

use super::MAX_TEXT_LENGTH;
use crate::domain::record::{
    unknown_field, wrong_kind, Entity, EntitySchema, FieldDef, FieldKind, FieldValue, RecordId,
};
use crate::domain::DomainError;

pub static BOOK_SCHEMA: EntitySchema = EntitySchema {
    name: "book",
    fields: &[
        FieldDef {
            name: "title",
            label: "Title",
            kind: FieldKind::Char {
                max_length: MAX_TEXT_LENGTH,
            },
            required: true,
        },
        FieldDef {
            name: "author",
            label: "Author",
            kind: FieldKind::ForeignKey { to: "author" },
            required: true,
        },
    ],
    relations: &[],
};

/// Book entity, always written by one author
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<RecordId>,
    title: String,
    #[serde(default)]
    author: Option<RecordId>,
}

impl Book {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: None,
        }
    }

    /// Set the author (builder pattern)
    pub fn with_author(mut self, author: RecordId) -> Self {
        self.author = Some(author);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> Option<RecordId> {
        self.author
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

impl Entity for Book {
    fn schema() -> &'static EntitySchema {
        &BOOK_SCHEMA
    }

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "title" => Some(FieldValue::text(&self.title)),
            "author" => Some(FieldValue::from(self.author)),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), DomainError> {
        match (field, value) {
            ("title", FieldValue::Text(title)) => {
                self.title = title;
                Ok(())
            }
            ("author", FieldValue::Null) => {
                self.author = None;
                Ok(())
            }
            ("author", value) => match value.as_record_id() {
                Some(author) => {
                    self.author = Some(author);
                    Ok(())
                }
                None => Err(wrong_kind::<Self>(field, &value)),
            },
            ("title", other) => Err(wrong_kind::<Self>(field, &other)),
            _ => Err(unknown_field::<Self>(field)),
        }
    }
}
