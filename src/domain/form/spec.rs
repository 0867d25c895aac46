//! Form and formset specifications

use crate::domain::record::{EntitySchema, FieldDef, FieldValues};

/// Default cap on the number of inline rows a formset accepts
pub const DEFAULT_MAX_NUM: usize = 1000;

/// Describes the form for one entity: which fields it edits and how they are named
#[derive(Debug, Clone)]
pub struct FormSpec {
    pub schema: &'static EntitySchema,
    pub fields: Vec<String>,
    pub prefix: Option<String>,
    pub initial: FieldValues,
}

impl FormSpec {
    pub fn new(schema: &'static EntitySchema, fields: Vec<String>) -> Self {
        Self {
            schema,
            fields,
            prefix: None,
            initial: FieldValues::new(),
        }
    }

    /// Set the prefix (builder pattern)
    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Set initial values (builder pattern)
    pub fn with_initial(mut self, initial: FieldValues) -> Self {
        self.initial = initial;
        self
    }

    /// Declared fields edited by the form, in form order
    pub fn field_defs(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields
            .iter()
            .filter_map(|name| self.schema.field(name))
    }
}

/// Describes a set of inline forms for the child entity of a relation
#[derive(Debug, Clone)]
pub struct FormSetSpec {
    /// Per-row form; its own prefix is replaced by `<prefix>-<index>`
    pub form: FormSpec,
    pub prefix: String,
    /// Number of blank rows offered for new children
    pub extra: usize,
    /// Whether rows carry a deletion flag
    pub can_delete: bool,
    pub max_num: usize,
}

impl FormSetSpec {
    pub fn new(form: FormSpec, prefix: impl Into<String>) -> Self {
        Self {
            form,
            prefix: prefix.into(),
            extra: 1,
            can_delete: false,
            max_num: DEFAULT_MAX_NUM,
        }
    }

    pub fn with_extra(mut self, extra: usize) -> Self {
        self.extra = extra;
        self
    }

    pub fn with_can_delete(mut self, can_delete: bool) -> Self {
        self.can_delete = can_delete;
        self
    }

    /// Hard limit on processed rows regardless of the submitted total
    pub fn absolute_max(&self) -> usize {
        self.max_num + DEFAULT_MAX_NUM
    }

    /// Prefix of the form at the given row
    pub fn row_prefix(&self, index: usize) -> String {
        format!("{}-{}", self.prefix, index)
    }
}
