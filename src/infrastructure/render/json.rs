//! Renderer answering with the template context as JSON

use serde_json::{Map, Value};

use crate::domain::{DomainError, RenderedBody, TemplateRenderer};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Serializes the context with the template name under `template`
///
/// Stands in for an HTML engine; clients build their own markup from the
/// bound fields, their errors and the management form.
#[derive(Debug, Clone, Default)]
pub struct JsonTemplateRenderer {
    pretty: bool,
}

impl JsonTemplateRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl TemplateRenderer for JsonTemplateRenderer {
    fn render(&self, template: &str, context: &Value) -> Result<RenderedBody, DomainError> {
        let mut document = Map::new();
        document.insert("template".to_string(), Value::String(template.to_string()));

        match context {
            Value::Object(fields) => {
                document.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Value::Null => {}
            other => {
                document.insert("context".to_string(), other.clone());
            }
        }

        let document = Value::Object(document);
        let body = if self.pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        }
        .map_err(|e| DomainError::internal(format!("Failed to render {}: {}", template, e)))?;

        Ok(RenderedBody {
            content_type: JSON_CONTENT_TYPE.to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_merges_context() {
        let renderer = JsonTemplateRenderer::new();
        let rendered = renderer
            .render("author_create_with_books", &json!({"mainForm": {"is_bound": false}}))
            .unwrap();

        assert_eq!(rendered.content_type, JSON_CONTENT_TYPE);
        let body: Value = serde_json::from_str(&rendered.body).unwrap();
        assert_eq!(body["template"], "author_create_with_books");
        assert_eq!(body["mainForm"]["is_bound"], false);
    }

    #[test]
    fn test_render_wraps_non_object_context() {
        let rendered = JsonTemplateRenderer::pretty().render("authors", &json!([1, 2])).unwrap();
        let body: Value = serde_json::from_str(&rendered.body).unwrap();
        assert_eq!(body["context"], json!([1, 2]));
        assert!(rendered.body.contains('\n'));
    }
}
