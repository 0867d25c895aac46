//! Template renderers

mod json;

pub use json::JsonTemplateRenderer;
