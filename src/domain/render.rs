//! Rendering boundary - turns a context mapping into a response body

use serde_json::Value;

use crate::domain::DomainError;

/// A rendered response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    pub content_type: String,
    pub body: String,
}

/// Renders named templates against a context
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, context: &Value) -> Result<RenderedBody, DomainError>;
}
