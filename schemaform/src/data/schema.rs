use serde_json::{Map, Value};

use crate::error::{SchemaError, json_type_name};

/// Read-only accessors over a JSON Schema fragment.
///
/// Schemas stay plain [`Value`]s so the validator can consume the exact
/// document the renderers navigate.
pub trait SchemaNode {
    /// Primary declared type, skipping `"null"` in type unions.
    fn schema_type(&self) -> Option<&str>;

    /// Whether `ty` is one of the declared types.
    fn is_type(&self, ty: &str) -> bool;

    /// The `properties` mapping of an object schema.
    fn properties(&self) -> Option<&Map<String, Value>>;

    /// The allowed literal values, in declared order.
    fn enum_values(&self) -> Option<&[Value]>;

    /// Whether `name` is listed in this node's own `required` set.
    fn is_required(&self, name: &str) -> bool;

    /// The `format` keyword.
    fn format(&self) -> Option<&str>;

    /// The `items` schema of an array schema (single-schema form only).
    fn items(&self) -> Option<&Value>;

    /// Local `$ref` target, when this node is a reference.
    fn reference(&self) -> Option<&str>;
}

impl SchemaNode for Value {
    fn schema_type(&self) -> Option<&str> {
        match self.get("type")? {
            Value::String(s) => Some(s.as_str()),
            Value::Array(types) => types
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null"),
            _ => None,
        }
    }

    fn is_type(&self, ty: &str) -> bool {
        match self.get("type") {
            Some(Value::String(s)) => s == ty,
            Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(ty)),
            _ => false,
        }
    }

    fn properties(&self) -> Option<&Map<String, Value>> {
        self.get("properties")?.as_object()
    }

    fn enum_values(&self) -> Option<&[Value]> {
        self.get("enum")?.as_array().map(Vec::as_slice)
    }

    fn is_required(&self, name: &str) -> bool {
        self.get("required")
            .and_then(Value::as_array)
            .is_some_and(|req| req.iter().any(|r| r.as_str() == Some(name)))
    }

    fn format(&self) -> Option<&str> {
        self.get("format")?.as_str()
    }

    fn items(&self) -> Option<&Value> {
        self.get("items").filter(|items| items.is_object())
    }

    fn reference(&self) -> Option<&str> {
        self.get("$ref")?.as_str()
    }
}

/// Follow local `$ref` chains starting at `node`.
///
/// Returns `None` when a reference is not a local pointer, designates
/// nothing, or the chain is longer than `max_depth` (cycles included).
pub fn deref<'a>(root: &'a Value, node: &'a Value, max_depth: usize) -> Option<&'a Value> {
    let mut current = node;
    for _ in 0..=max_depth {
        let Some(reference) = current.reference() else {
            return Some(current);
        };
        let pointer = reference.strip_prefix('#')?;
        current = if pointer.is_empty() {
            root
        } else {
            root.pointer(pointer)?
        };
    }
    debug!("$ref chain exceeds {max_depth} hops, treating node as unresolved");
    None
}

/// Reject schema roots no form can be built from.
pub fn check_root(schema: &Value) -> Result<(), SchemaError> {
    match schema {
        Value::Object(_) | Value::Bool(_) => Ok(()),
        other => Err(SchemaError::InvalidRoot(json_type_name(other).to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_union_skips_null() {
        let schema = json!({ "type": ["null", "integer"] });
        assert_eq!(schema.schema_type(), Some("integer"));
        assert!(schema.is_type("null"));
        assert!(!schema.is_type("string"));
    }

    #[test]
    fn test_required_is_local() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "required": ["a"]
        });
        assert!(schema.is_required("a"));
        assert!(!schema.is_required("b"));
    }

    #[test]
    fn test_deref_definitions() {
        let root = json!({
            "definitions": { "Address": { "type": "object" } },
            "properties": { "home": { "$ref": "#/definitions/Address" } }
        });
        let home = &root["properties"]["home"];
        assert_eq!(deref(&root, home, 8), Some(&json!({ "type": "object" })));
    }

    #[test]
    fn test_deref_cycle_is_unresolved() {
        let root = json!({
            "$defs": {
                "a": { "$ref": "#/$defs/b" },
                "b": { "$ref": "#/$defs/a" }
            }
        });
        assert_eq!(deref(&root, &root["$defs"]["a"], 8), None);
    }

    #[test]
    fn test_check_root() {
        assert!(check_root(&json!({ "type": "object" })).is_ok());
        assert_eq!(
            check_root(&json!("string")),
            Err(SchemaError::InvalidRoot("string".into()))
        );
    }
}
