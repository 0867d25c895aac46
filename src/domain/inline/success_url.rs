//! Redirect targets built from record attributes

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::domain::record::{Entity, EntitySchema};
use crate::domain::DomainError;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// A URL template such as `/author/{id}/`, checked against a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessUrl {
    template: String,
}

impl SuccessUrl {
    /// Every placeholder must name `id` or a field of `schema`
    pub fn parse(template: impl Into<String>, schema: &EntitySchema) -> Result<Self, DomainError> {
        let template = template.into();

        for captures in PLACEHOLDER.captures_iter(&template) {
            let name = &captures[1];
            if name != EntitySchema::ID_FIELD && !schema.has_field(name) {
                return Err(DomainError::configuration(format!(
                    "success URL '{}' refers to unknown {} attribute '{}'",
                    template, schema.name, name
                )));
            }
        }

        Ok(Self { template })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitute the record's attributes; null attributes render empty
    pub fn render<E: Entity>(&self, record: &E) -> String {
        PLACEHOLDER
            .replace_all(&self.template, |captures: &Captures| {
                record
                    .attribute(&captures[1])
                    .map(|value| value.to_string())
                    .unwrap_or_default()
            })
            .into_owned()
    }
}
