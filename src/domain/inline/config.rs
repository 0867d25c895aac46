//! Workflow configuration and its validation

use serde::Deserialize;

use crate::domain::record::{Entity, EntitySchema, FieldValues, RelationDef};
use crate::domain::DomainError;

fn default_extra() -> usize {
    1
}

/// Static configuration bound to one inline workflow
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Main entity fields edited by the main form, in form order
    pub main_fields: Vec<String>,
    /// Inline entity fields edited by each row, in form order
    pub inline_fields: Vec<String>,
    /// Relation on the main entity linking it to the inline entity
    #[serde(default)]
    pub relation_field: Option<String>,
    /// Blank rows offered for new children
    #[serde(default = "default_extra")]
    pub extra: usize,
    /// Redirect target with `{attribute}` placeholders, e.g. `/author/{id}/`
    #[serde(default)]
    pub success_url_template: Option<String>,
    #[serde(default)]
    pub form_prefix: Option<String>,
    /// Initial values of the main form
    #[serde(default)]
    pub initial: FieldValues,
    #[serde(default)]
    pub template_name: Option<String>,
}

impl WorkflowConfig {
    pub fn new<S: Into<String>>(
        main_fields: impl IntoIterator<Item = S>,
        inline_fields: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            main_fields: main_fields.into_iter().map(Into::into).collect(),
            inline_fields: inline_fields.into_iter().map(Into::into).collect(),
            relation_field: None,
            extra: default_extra(),
            success_url_template: None,
            form_prefix: None,
            initial: FieldValues::new(),
            template_name: None,
        }
    }

    pub fn with_relation_field(mut self, relation: impl Into<String>) -> Self {
        self.relation_field = Some(relation.into());
        self
    }

    pub fn with_extra(mut self, extra: usize) -> Self {
        self.extra = extra;
        self
    }

    pub fn with_success_url_template(mut self, template: impl Into<String>) -> Self {
        self.success_url_template = Some(template.into());
        self
    }

    pub fn with_form_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.form_prefix = Some(prefix.into());
        self
    }

    pub fn with_initial(mut self, initial: FieldValues) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_template_name(mut self, template: impl Into<String>) -> Self {
        self.template_name = Some(template.into());
        self
    }
}

/// Check the field lists against the entity schemas
pub fn validate_fields<M: Entity, I: Entity>(config: &WorkflowConfig) -> Result<(), DomainError> {
    check_field_list(M::schema(), &config.main_fields)?;
    check_field_list(I::schema(), &config.inline_fields)?;

    for field in config.initial.keys() {
        if !M::schema().has_field(field) {
            return Err(DomainError::configuration(format!(
                "initial value given for unknown {} field '{}'",
                M::schema().name,
                field
            )));
        }
    }

    Ok(())
}

fn check_field_list(schema: &EntitySchema, fields: &[String]) -> Result<(), DomainError> {
    if fields.is_empty() {
        return Err(DomainError::configuration(format!(
            "no {} fields configured",
            schema.name
        )));
    }

    for field in fields {
        if field == EntitySchema::ID_FIELD {
            return Err(DomainError::configuration(format!(
                "'{}' is managed by the record store and cannot be edited",
                field
            )));
        }

        if !schema.has_field(field) {
            return Err(DomainError::configuration(format!(
                "{} has no field '{}'",
                schema.name, field
            )));
        }
    }

    Ok(())
}

/// Resolve the relation linking the main entity to the inline entity
///
/// A configured relation must exist and point at the inline type. Without one the
/// main type must declare exactly one relation to the inline type, unless
/// `required` forbids falling back.
pub fn resolve_relation<M: Entity, I: Entity>(
    config: &WorkflowConfig,
    required: bool,
) -> Result<&'static RelationDef, DomainError> {
    let main = M::schema();
    let inline = I::schema();

    let relation = match config.relation_field.as_deref() {
        Some(name) => {
            let relation = main.relation(name).ok_or_else(|| {
                DomainError::configuration(format!("{} has no relation '{}'", main.name, name))
            })?;

            if relation.child != inline.name {
                return Err(DomainError::configuration(format!(
                    "relation '{}' links {} to {}, not {}",
                    name, main.name, relation.child, inline.name
                )));
            }

            relation
        }
        None if required => {
            return Err(DomainError::configuration(format!(
                "a relation field linking {} to {} is required",
                main.name, inline.name
            )));
        }
        None => {
            let mut candidates = main.relations_to(inline.name);
            match (candidates.next(), candidates.next()) {
                (Some(relation), None) => relation,
                (None, _) => {
                    return Err(DomainError::configuration(format!(
                        "{} has no relation to {}",
                        main.name, inline.name
                    )));
                }
                (Some(_), Some(_)) => {
                    return Err(DomainError::configuration(format!(
                        "{} has several relations to {}; configure the relation field",
                        main.name, inline.name
                    )));
                }
            }
        }
    };

    if config.inline_fields.iter().any(|f| f == relation.foreign_key) {
        return Err(DomainError::configuration(format!(
            "'{}' links each {} to its {} and cannot be an inline field",
            relation.foreign_key, inline.name, main.name
        )));
    }

    Ok(relation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::library::{Author, Book};
    use crate::domain::record::FieldValue;

    fn config() -> WorkflowConfig {
        WorkflowConfig::new(["name"], ["title"])
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.extra, 1);
        assert!(config.relation_field.is_none());
        assert!(config.success_url_template.is_none());
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: WorkflowConfig = serde_json::from_value(serde_json::json!({
            "main_fields": ["name"],
            "inline_fields": ["title"],
        }))
        .unwrap();
        assert_eq!(config.extra, 1);
    }

    #[test]
    fn test_valid_fields() {
        assert!(validate_fields::<Author, Book>(&config()).is_ok());
    }

    #[test]
    fn test_rejects_empty_or_unknown_fields() {
        let empty = WorkflowConfig::new(Vec::<String>::new(), vec!["title".to_string()]);
        assert!(validate_fields::<Author, Book>(&empty).is_err());

        let unknown = WorkflowConfig::new(["name"], ["isbn"]);
        assert!(validate_fields::<Author, Book>(&unknown).is_err());

        let id = WorkflowConfig::new(["id"], ["title"]);
        assert!(validate_fields::<Author, Book>(&id).is_err());
    }

    #[test]
    fn test_rejects_unknown_initial_field() {
        let mut initial = FieldValues::new();
        initial.insert("age".to_string(), FieldValue::Integer(3));
        let config = config().with_initial(initial);

        assert!(validate_fields::<Author, Book>(&config).is_err());
    }

    #[test]
    fn test_resolve_configured_relation() {
        let config = config().with_relation_field("books");
        let relation = resolve_relation::<Author, Book>(&config, true).unwrap();
        assert_eq!(relation.foreign_key, "author");
    }

    #[test]
    fn test_resolve_relation_required() {
        let err = resolve_relation::<Author, Book>(&config(), true).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[test]
    fn test_resolve_relation_discovered() {
        let relation = resolve_relation::<Author, Book>(&config(), false).unwrap();
        assert_eq!(relation.name, "books");
    }

    #[test]
    fn test_resolve_unknown_relation() {
        let config = config().with_relation_field("reviews");
        assert!(resolve_relation::<Author, Book>(&config, false).is_err());
    }

    #[test]
    fn test_resolve_relation_to_wrong_type() {
        assert!(resolve_relation::<Book, Author>(&config(), false).is_err());
    }

    #[test]
    fn test_foreign_key_is_not_an_inline_field() {
        let config = WorkflowConfig::new(["name"], ["title", "author"]).with_relation_field("books");
        assert!(resolve_relation::<Author, Book>(&config, true).is_err());
    }
}
