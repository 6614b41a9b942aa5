//! Generators for schemas and UI schemas.
//!
//! - [`default_uischema`]: one control per property, nested objects grouped
//! - [`json_schema`]: schema inferred from a data instance
//! - [`schema_for`]: schema of a Rust type deriving [`schemars::JsonSchema`]

use schemars::JsonSchema;
use serde_json::{Map, Value, json};

use crate::{
    data::{
        path::resolve_path,
        schema::{SchemaNode, deref},
        uischema::{LayoutElement, LayoutKind, UiSchemaElement},
    },
    render::projection::title_case,
    tester::TESTER_REF_DEPTH,
};

/// Default UI schema for `schema`.
///
/// Objects become a vertical layout of their properties, nested objects
/// become groups labelled after the property; anything else is a single
/// control on the root scope.
pub fn default_uischema(schema: &Value) -> UiSchemaElement {
    default_uischema_at(schema, "#")
}

/// Default UI schema for the sub-schema of `root` at `scope`.
///
/// Generated scopes are absolute, so `$ref`s anywhere below `scope` resolve
/// against `root`.
pub fn default_uischema_at(root: &Value, scope: &str) -> UiSchemaElement {
    let node = resolve_path(scope, root, TESTER_REF_DEPTH).schema;
    match node {
        Some(node) if node.properties().is_some() => UiSchemaElement::layout(
            LayoutKind::Vertical,
            object_elements(root, node, scope, 0),
        ),
        _ => UiSchemaElement::control(scope),
    }
}

fn object_elements(root: &Value, node: &Value, prefix: &str, depth: usize) -> Vec<UiSchemaElement> {
    let Some(properties) = node.properties() else {
        return Vec::new();
    };
    properties
        .iter()
        .map(|(name, property)| {
            let scope = format!("{prefix}/properties/{}", name.replace('~', "~0").replace('/', "~1"));
            let resolved = deref(root, property, TESTER_REF_DEPTH).unwrap_or(property);
            if resolved.properties().is_some() && depth < TESTER_REF_DEPTH {
                UiSchemaElement::Layout(LayoutElement {
                    kind: LayoutKind::Group,
                    elements: object_elements(root, resolved, &scope, depth + 1),
                    label: Some(title_case(name)),
                    options: Map::new(),
                    rule: None,
                })
            } else {
                UiSchemaElement::control(scope)
            }
        })
        .collect()
}

/// Schema inferred from a data instance.
pub fn json_schema(data: &Value) -> Value {
    match data {
        Value::Null => json!({ "type": "null" }),
        Value::Bool(_) => json!({ "type": "boolean" }),
        Value::Number(n) if n.is_i64() || n.is_u64() => json!({ "type": "integer" }),
        Value::Number(_) => json!({ "type": "number" }),
        Value::String(_) => json!({ "type": "string" }),
        Value::Array(items) => match items.first() {
            Some(first) => json!({ "type": "array", "items": json_schema(first) }),
            None => json!({ "type": "array", "items": {} }),
        },
        Value::Object(obj) => {
            let properties: Map<String, Value> = obj
                .iter()
                .map(|(key, value)| (key.clone(), json_schema(value)))
                .collect();
            json!({ "type": "object", "properties": properties })
        }
    }
}

/// Schema of a typed configuration.
pub fn schema_for<T: JsonSchema>() -> serde_json::Result<Value> {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(&schema)
}

/// Starting value for a new element of `schema`.
pub fn default_value(schema: Option<&Value>) -> Value {
    let Some(schema) = schema else {
        return Value::Null;
    };
    if let Some(default) = schema.get("default") {
        return default.clone();
    }
    match schema.schema_type() {
        Some("object") => Value::Object(Map::new()),
        Some("array") => Value::Array(Vec::new()),
        Some("string") if schema.enum_values().is_none() => Value::String(String::new()),
        Some("integer" | "number") => json!(0),
        Some("boolean") => Value::Bool(false),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uischema_groups_nested_objects() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "personalData": {
                    "type": "object",
                    "properties": { "middleName": { "type": "string" } }
                }
            }
        });
        assert_eq!(
            default_uischema(&schema).to_json(),
            json!({
                "type": "VerticalLayout",
                "elements": [
                    { "type": "Control", "scope": "#/properties/name" },
                    {
                        "type": "Group",
                        "label": "Personal Data",
                        "elements": [
                            {
                                "type": "Control",
                                "scope": "#/properties/personalData/properties/middleName"
                            }
                        ]
                    }
                ]
            })
        );
    }

    #[test]
    fn test_default_uischema_primitive() {
        let ui = default_uischema(&json!({ "type": "string" }));
        assert_eq!(ui, UiSchemaElement::control("#"));
    }

    #[test]
    fn test_default_uischema_at_array_items() {
        let schema = json!({
            "type": "object",
            "$defs": {
                "Address": { "type": "object", "properties": { "street": { "type": "string" } } },
                "Person": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "home": { "$ref": "#/$defs/Address" }
                    }
                }
            },
            "properties": {
                "people": { "type": "array", "items": { "$ref": "#/$defs/Person" } },
                "tags": { "type": "array", "items": { "type": "string" } }
            }
        });
        assert_eq!(
            default_uischema_at(&schema, "#/properties/people/items").to_json(),
            json!({
                "type": "VerticalLayout",
                "elements": [
                    { "type": "Control", "scope": "#/properties/people/items/properties/name" },
                    {
                        "type": "Group",
                        "label": "Home",
                        "elements": [
                            {
                                "type": "Control",
                                "scope": "#/properties/people/items/properties/home/properties/street"
                            }
                        ]
                    }
                ]
            })
        );
        assert_eq!(
            default_uischema_at(&schema, "#/properties/tags/items"),
            UiSchemaElement::control("#/properties/tags/items")
        );
    }

    #[test]
    fn test_json_schema_inference() {
        let schema = json!({ "name": "x", "age": 3, "tags": ["a"], "ok": true, "ratio": 0.5 });
        assert_eq!(
            json_schema(&schema),
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "age": { "type": "integer" },
                    "tags": { "type": "array", "items": { "type": "string" } },
                    "ok": { "type": "boolean" },
                    "ratio": { "type": "number" }
                }
            })
        );
    }

    #[test]
    fn test_schema_for_struct_with_nested_ref() {
        #[allow(dead_code)]
        #[derive(JsonSchema)]
        struct Address {
            street: String,
        }

        #[allow(dead_code)]
        #[derive(JsonSchema)]
        struct Person {
            name: String,
            home: Address,
        }

        let schema = schema_for::<Person>().unwrap();
        assert!(schema.is_required("name"));
        let ui = default_uischema(&schema);
        let layout = ui.as_layout().unwrap();
        assert_eq!(layout.elements.len(), 2);
        let group = layout.elements[1].as_layout().unwrap();
        assert_eq!(group.label.as_deref(), Some("Home"));
        assert_eq!(
            group.elements[0].as_control().map(|c| c.scope.as_str()),
            Some("#/properties/home/properties/street")
        );
    }

    #[test]
    fn test_default_value() {
        assert_eq!(default_value(Some(&json!({ "type": "object" }))), json!({}));
        assert_eq!(default_value(Some(&json!({ "type": "string", "default": "x" }))), json!("x"));
        assert_eq!(default_value(Some(&json!({ "enum": ["a"] }))), Value::Null);
        assert_eq!(default_value(None), Value::Null);
    }
}
