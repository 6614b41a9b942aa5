//! Validation bridge.
//!
//! Runs a [`Validator`] over the current data and maps its findings onto
//! control paths. Every run yields the complete list; the store replaces
//! the previous one wholesale.

use jsonschema::error::{TypeKind, ValidationErrorKind};
use serde_json::Value;

use crate::data::{path::compose, state::ValidationError};

/// Black-box JSON Schema validator.
pub trait Validator {
    /// Validate `data` against `schema`, returning findings in order.
    fn validate(&self, data: &Value, schema: &Value) -> Vec<ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&Value, &Value) -> Vec<ValidationError>,
{
    fn validate(&self, data: &Value, schema: &Value) -> Vec<ValidationError> {
        self(data, schema)
    }
}

/// [`Validator`] backed by the `jsonschema` crate.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    validate_formats: bool,
}

impl SchemaValidator {
    /// Validator; `validate_formats` turns on `format` assertions.
    pub fn new(validate_formats: bool) -> Self {
        Self { validate_formats }
    }

    /// Compile `schema`, reporting why it is unusable.
    pub fn check_schema(&self, schema: &Value) -> Result<(), String> {
        self.compile(schema).map(|_| ()).map_err(|e| e.to_string())
    }

    fn compile(
        &self,
        schema: &Value,
    ) -> Result<jsonschema::Validator, jsonschema::ValidationError<'static>> {
        jsonschema::options()
            .should_validate_formats(self.validate_formats)
            .build(schema)
    }
}

impl Validator for SchemaValidator {
    fn validate(&self, data: &Value, schema: &Value) -> Vec<ValidationError> {
        let compiled = match self.compile(schema) {
            Ok(compiled) => compiled,
            Err(e) => {
                warn!("schema does not compile, reporting it as a root error: {e}");
                return vec![ValidationError::new("", format!("invalid schema: {e}"))];
            }
        };
        let errors: Vec<ValidationError> = compiled
            .iter_errors(data)
            .map(|error| to_record(&error))
            .collect();
        info!("validation finished with {} error(s)", errors.len());
        errors
    }
}

fn to_record(error: &jsonschema::ValidationError<'_>) -> ValidationError {
    let instance_path = normalize_data_path(&error.instance_path.to_string());

    // Missing properties are reported on the property itself.
    if let ValidationErrorKind::Required { property } = &error.kind {
        let name = match property {
            Value::String(name) => name.clone(),
            other => other.to_string(),
        };
        return ValidationError::new(compose(&instance_path, &name), "is a required property");
    }

    let message = kind_message(&error.kind).unwrap_or_else(|| error.to_string());
    ValidationError::new(instance_path, message)
}

/// Message for an error kind, independent of where the keyword sits in the
/// schema (inline or behind a `$ref`).
fn kind_message(kind: &ValidationErrorKind) -> Option<String> {
    let message = match kind {
        ValidationErrorKind::Type { kind } => match kind {
            TypeKind::Single(ty) => format!("should be {ty}"),
            TypeKind::Multiple(types) => {
                let types: Vec<String> = (*types).into_iter().map(|ty| ty.to_string()).collect();
                format!("should be {}", types.join(","))
            }
        },
        ValidationErrorKind::Enum { .. } => {
            "should be equal to one of the allowed values".to_string()
        }
        ValidationErrorKind::Constant { .. } => "should be equal to constant".to_string(),
        ValidationErrorKind::MinLength { limit } => {
            format!("should NOT be shorter than {limit} characters")
        }
        ValidationErrorKind::MaxLength { limit } => {
            format!("should NOT be longer than {limit} characters")
        }
        ValidationErrorKind::Minimum { limit } => format!("should be >= {limit}"),
        ValidationErrorKind::Maximum { limit } => format!("should be <= {limit}"),
        ValidationErrorKind::ExclusiveMinimum { limit } => format!("should be > {limit}"),
        ValidationErrorKind::ExclusiveMaximum { limit } => format!("should be < {limit}"),
        ValidationErrorKind::MultipleOf { multiple_of } => {
            format!("should be multiple of {multiple_of}")
        }
        ValidationErrorKind::Pattern { pattern } => format!("should match pattern \"{pattern}\""),
        ValidationErrorKind::Format { format } => format!("should match format \"{format}\""),
        ValidationErrorKind::MinItems { limit } => {
            format!("should NOT have fewer than {limit} items")
        }
        ValidationErrorKind::MaxItems { limit } => {
            format!("should NOT have more than {limit} items")
        }
        ValidationErrorKind::UniqueItems => "should NOT have duplicate items".to_string(),
        ValidationErrorKind::AdditionalProperties { .. } => {
            "should NOT have additional properties".to_string()
        }
        _ => return None,
    };
    Some(message)
}

/// Convert a validator data path (`/a/0/b`, `.a[0].b` or `a.0.b`) to the
/// dot-joined form controls use.
pub fn normalize_data_path(raw: &str) -> String {
    if raw.starts_with('/') {
        return raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.replace("~1", "/").replace("~0", "~"))
            .collect::<Vec<_>>()
            .join(".");
    }
    raw.replace('[', ".")
        .replace(']', "")
        .split('.')
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_matches('\'').to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Join the messages of one control.
pub fn format_error_message<S: AsRef<str>>(messages: &[S], separator: &str) -> String {
    messages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_error_message() {
        let schema = json!({ "type": "object", "properties": { "foo": { "type": "string" } } });
        let errors = SchemaValidator::default().validate(&json!({ "foo": 2 }), &schema);
        assert_eq!(errors, vec![ValidationError::new("foo", "should be string")]);

        let schema = json!({
            "type": "object",
            "definitions": { "Name": { "type": "string", "minLength": 2 } },
            "properties": { "foo": { "$ref": "#/definitions/Name" } }
        });
        let errors = SchemaValidator::default().validate(&json!({ "foo": 2 }), &schema);
        assert_eq!(errors, vec![ValidationError::new("foo", "should be string")]);
        let errors = SchemaValidator::default().validate(&json!({ "foo": "x" }), &schema);
        assert_eq!(
            errors,
            vec![ValidationError::new("foo", "should NOT be shorter than 2 characters")]
        );
    }

    #[test]
    fn test_required_is_moved_onto_property() {
        let schema = json!({
            "type": "object",
            "properties": {
                "personalData": {
                    "type": "object",
                    "properties": {
                        "middleName": { "type": "string" },
                        "lastName": { "type": "string" }
                    },
                    "required": ["middleName", "lastName"]
                }
            }
        });
        let errors =
            SchemaValidator::default().validate(&json!({ "personalData": {} }), &schema);
        let paths: Vec<&str> = errors.iter().map(|e| e.data_path.as_str()).collect();
        assert!(paths.contains(&"personalData.middleName"));
        assert!(paths.contains(&"personalData.lastName"));
        assert!(errors.iter().all(|e| e.message == "is a required property"));
    }

    #[test]
    fn test_enum_and_min_length() {
        let schema = json!({
            "type": "object",
            "properties": {
                "color": { "enum": ["red", "green"] },
                "code": { "type": "string", "minLength": 3 }
            }
        });
        let errors =
            SchemaValidator::default().validate(&json!({ "color": "blue", "code": "x" }), &schema);
        assert!(errors.contains(&ValidationError::new(
            "color",
            "should be equal to one of the allowed values"
        )));
        assert!(errors.contains(&ValidationError::new(
            "code",
            "should NOT be shorter than 3 characters"
        )));
    }

    #[test]
    fn test_closure_validator() {
        let validator = |_: &Value, _: &Value| vec![ValidationError::new("a", "nope")];
        assert_eq!(validator.validate(&json!({}), &json!({})).len(), 1);
    }

    #[test]
    fn test_normalize_data_path() {
        assert_eq!(normalize_data_path("/personalData/middleName"), "personalData.middleName");
        assert_eq!(normalize_data_path(".personalData.middleName"), "personalData.middleName");
        assert_eq!(normalize_data_path(".tags[1]"), "tags.1");
        assert_eq!(normalize_data_path(""), "");
    }

    #[test]
    fn test_format_error_message() {
        assert_eq!(format_error_message(&["a", "b"], " and "), "a and b");
        assert_eq!(format_error_message::<&str>(&[], " and "), "");
    }
}
