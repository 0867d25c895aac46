//! Domain layer - Core business logic and entities

pub mod error;
pub mod form;
pub mod inline;
pub mod library;
pub mod record;
pub mod render;

pub use error::DomainError;
pub use form::{
    BlankExtraRowPolicy, Form, FormData, FormSet, FormSetSpec, FormSpec, FormValidator,
    SchemaFormValidator,
};
pub use inline::{
    FormContext, InlineWorkflow, RenderedForm, RequestContext, RequestMethod, VariantKind,
    WorkflowConfig, WorkflowResponse,
};
pub use library::{Author, Book, AUTHOR_SCHEMA, BOOK_SCHEMA};
pub use record::{Entity, EntitySchema, FieldValue, FieldValues, RecordId, RecordStore};
pub use render::{RenderedBody, TemplateRenderer};
