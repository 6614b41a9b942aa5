//! Error types raised while loading schemas and building form sessions.
//!
//! Validation failures are not errors: they travel through the store as
//! [`ValidationError`](crate::data::state::ValidationError) records.

use thiserror::Error;

/// Problems found while parsing a schema or a UI schema element.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    /// A UI schema element lacks a field its `type` requires.
    #[error("UI schema element `{element}` at `{pointer}` is missing required field `{field}`")]
    MissingField {
        pointer: String,
        element: String,
        field: &'static str,
    },
    /// A field is present but has the wrong JSON type.
    #[error("field `{field}` at `{pointer}` should be {expected}, found {actual}")]
    TypeMismatch {
        pointer: String,
        field: String,
        expected: String,
        actual: String,
    },
    /// A rule names an effect outside HIDE/SHOW/ENABLE/DISABLE.
    #[error("unknown rule effect `{effect}` at `{pointer}`")]
    UnknownEffect { pointer: String, effect: String },
    /// The JSON Schema root is not an object (or boolean schema).
    #[error("schema root should be an object, found {0}")]
    InvalidRoot(String),
}

/// Errors raised by a form session.
#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// The JSON Schema could not be compiled by the validator.
    #[error("invalid JSON Schema: {0}")]
    InvalidSchema(String),
    /// An event targeted a widget id that the last render did not produce.
    #[error("no widget with id `{0}` in the rendered form")]
    UnknownWidget(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias for form session operations.
pub type Result<T, E = FormError> = std::result::Result<T, E>;

/// Short JSON type name used in error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
