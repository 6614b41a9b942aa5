use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::uischema::UiSchemaElement;

/// One validator finding, addressed by data path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Dot-joined data path, same shape as a control's path.
    pub data_path: String,
    pub message: String,
}

impl ValidationError {
    /// Error addressed to `data_path`.
    pub fn new(data_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            data_path: data_path.into(),
            message: message.into(),
        }
    }
}

/// The single mutable entity of a form session.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub data: Value,
    pub schema: Value,
    pub uischema: UiSchemaElement,
    /// Result of the latest validation run, in validator order.
    pub errors: Vec<ValidationError>,
}

impl AppState {
    /// State with no validation errors yet.
    pub fn new(data: Value, schema: Value, uischema: UiSchemaElement) -> Self {
        Self {
            data,
            schema,
            uischema,
            errors: Vec::new(),
        }
    }

    /// Errors addressed exactly to `path`, in order.
    pub fn errors_at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors.iter().filter(move |e| e.data_path == path)
    }
}
