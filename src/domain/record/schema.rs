//! Static entity schemas

/// Kind of a record field, drives form cleaning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text with a maximum length in characters
    Char { max_length: usize },
    /// Whole number
    Integer,
    /// Reference to a record of another entity type
    ForeignKey { to: &'static str },
}

/// A field declared by an entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// A one-to-many relation from a parent entity type to a child entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDef {
    /// Name of the relation on the parent, e.g. `books`
    pub name: &'static str,
    /// Entity type name of the children
    pub child: &'static str,
    /// Field on the child that references the parent
    pub foreign_key: &'static str,
}

/// Schema of an entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
    pub relations: &'static [RelationDef],
}

impl EntitySchema {
    /// Name of the identity attribute every entity carries
    pub const ID_FIELD: &'static str = "id";

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|relation| relation.name == name)
    }

    /// Relations from this entity type to the given child type
    pub fn relations_to<'a>(&'a self, child: &'a str) -> impl Iterator<Item = &'a RelationDef> {
        self.relations
            .iter()
            .filter(move |relation| relation.child == child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FieldDef] = &[FieldDef {
        name: "name",
        label: "Name",
        kind: FieldKind::Char { max_length: 10 },
        required: true,
    }];

    const RELATIONS: &[RelationDef] = &[
        RelationDef {
            name: "books",
            child: "book",
            foreign_key: "author",
        },
        RelationDef {
            name: "edited",
            child: "book",
            foreign_key: "editor",
        },
    ];

    const SCHEMA: EntitySchema = EntitySchema {
        name: "author",
        fields: FIELDS,
        relations: RELATIONS,
    };

    #[test]
    fn test_field_lookup() {
        assert!(SCHEMA.has_field("name"));
        assert!(!SCHEMA.has_field("id"));
        assert_eq!(
            SCHEMA.field("name").map(|f| f.kind),
            Some(FieldKind::Char { max_length: 10 })
        );
    }

    #[test]
    fn test_relation_lookup() {
        assert_eq!(SCHEMA.relation("books").map(|r| r.foreign_key), Some("author"));
        assert!(SCHEMA.relation("reviews").is_none());
        assert_eq!(SCHEMA.relations_to("book").count(), 2);
        assert_eq!(SCHEMA.relations_to("review").count(), 0);
    }
}
