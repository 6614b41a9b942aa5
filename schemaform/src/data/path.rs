//! Scope resolution and data paths.
//!
//! A scope such as `#/properties/personalData/properties/middleName` is
//! resolved against the schema root into the sub-schema it designates and
//! the dot-joined data path `personalData.middleName`.

use serde_json::{Map, Value};

use crate::data::schema::{SchemaNode, deref};

/// Outcome of resolving a scope against a schema root.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedScope<'a> {
    /// Sub-schema at the scope, `None` when any segment is missing.
    pub schema: Option<&'a Value>,
    /// Object schema that declares the final property.
    pub parent: Option<&'a Value>,
    /// Final property name, used for labels and required-ness.
    pub property: Option<String>,
    /// Data path, computed even when the schema did not resolve.
    pub path: String,
}

impl ResolvedScope<'_> {
    /// Whether every segment of the scope designated a sub-schema.
    pub fn is_resolved(&self) -> bool {
        self.schema.is_some()
    }

    /// Whether the parent object schema lists the property as required.
    pub fn is_required(&self) -> bool {
        match (self.parent, &self.property) {
            (Some(parent), Some(property)) => parent.is_required(property),
            _ => false,
        }
    }
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Pointer segments of a scope, without the leading `#` anchor.
pub fn scope_segments(scope: &str) -> Vec<String> {
    let scope = scope.strip_prefix('#').unwrap_or(scope);
    scope
        .split('/')
        .filter(|s| !s.is_empty())
        .map(unescape)
        .collect()
}

/// Resolve `scope` against `root`.
///
/// `properties` and `items` segments navigate the schema without showing up
/// in the data path; every other segment is a data path component. Local
/// `$ref`s met on the way are followed, at most `max_ref_depth` hops each.
pub fn resolve_path<'a>(scope: &str, root: &'a Value, max_ref_depth: usize) -> ResolvedScope<'a> {
    let mut current = deref(root, root, max_ref_depth);
    let mut parent = None;
    let mut property = None;
    let mut data_path: Vec<String> = Vec::new();

    let segments = scope_segments(scope);
    let mut iter = segments.into_iter();
    while let Some(segment) = iter.next() {
        match segment.as_str() {
            "properties" => {
                let Some(name) = iter.next() else {
                    current = None;
                    break;
                };
                parent = current;
                current = current
                    .and_then(|node| node.properties())
                    .and_then(|props| props.get(&name))
                    .and_then(|node| deref(root, node, max_ref_depth));
                property = Some(name.clone());
                data_path.push(name);
            }
            "items" => {
                parent = None;
                property = None;
                current = current
                    .and_then(|node| node.items())
                    .and_then(|node| deref(root, node, max_ref_depth));
            }
            _ => {
                parent = current;
                current = current
                    .and_then(|node| node.get(&segment))
                    .and_then(|node| deref(root, node, max_ref_depth));
                property = Some(segment.clone());
                data_path.push(segment);
            }
        }
    }

    if current.is_none() {
        debug!("scope `{scope}` does not resolve against the schema");
    }

    ResolvedScope {
        schema: current,
        parent,
        property,
        path: data_path.join("."),
    }
}

/// Data path of a scope, without consulting any schema.
pub fn to_data_path(scope: &str) -> String {
    let mut data_path = Vec::new();
    let segments = scope_segments(scope);
    let mut iter = segments.into_iter();
    while let Some(segment) = iter.next() {
        match segment.as_str() {
            "properties" => {
                if let Some(name) = iter.next() {
                    data_path.push(name);
                }
            }
            "items" => {}
            _ => data_path.push(segment),
        }
    }
    data_path.join(".")
}

/// Data path of `scope` in a context where `scope_base` stands for `base_path`.
///
/// Scopes under `scope_base` have it replaced by `base_path`; any other
/// scope is read relative to `base_path`.
pub fn rebase(scope: &str, scope_base: &str, base_path: &str) -> String {
    let relative = scope
        .strip_prefix(scope_base)
        .filter(|rest| !scope_base.is_empty() && (rest.is_empty() || rest.starts_with('/')))
        .unwrap_or(scope);
    compose(base_path, &to_data_path(relative))
}

/// Join a base path and a relative path.
pub fn compose(base: &str, relative: &str) -> String {
    match (base.is_empty(), relative.is_empty()) {
        (true, _) => relative.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{base}.{relative}"),
    }
}

/// Value at `path`, if present.
pub fn get<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .try_fold(data, |node, segment| match node {
            Value::Object(obj) => obj.get(segment),
            Value::Array(arr) => segment.parse::<usize>().ok().and_then(|idx| arr.get(idx)),
            _ => None,
        })
}

/// Write `value` at `path`, creating intermediate objects.
///
/// `None` removes an object key (the value becomes undefined); inside an
/// array it leaves `null` so sibling indices stay stable.
pub fn set(data: &mut Value, path: &str, value: Option<Value>) {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        *data = value.unwrap_or(Value::Null);
        return;
    };

    let mut node = data;
    for segment in parents {
        node = child_mut(node, segment);
    }

    let index = if node.is_array() {
        last.parse::<usize>().ok()
    } else {
        None
    };
    match (node, index) {
        (Value::Array(arr), Some(idx)) => {
            if arr.len() <= idx {
                arr.resize(idx + 1, Value::Null);
            }
            arr[idx] = value.unwrap_or(Value::Null);
        }
        (node, _) => {
            let obj = ensure_object(node);
            match value {
                Some(value) => {
                    obj.insert((*last).to_string(), value);
                }
                None => {
                    obj.remove(*last);
                }
            }
        }
    }
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(obj) => obj,
        _ => unreachable!("node was just replaced by an object"),
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = if node.is_array() {
        segment.parse::<usize>().ok()
    } else {
        None
    };
    match (node, index) {
        (Value::Array(arr), Some(idx)) => {
            if arr.len() <= idx {
                arr.resize(idx + 1, Value::Null);
            }
            &mut arr[idx]
        }
        (node, _) => ensure_object(node)
            .entry(segment.to_string())
            .or_insert(Value::Null),
    }
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// CSS class derived from a scope: `#/properties/foo` becomes `root_properties_foo`.
pub fn class_name(scope: &str) -> String {
    let mut out = String::from("root");
    for segment in scope_segments(scope) {
        out.push('_');
        out.push_str(&sanitize(&segment));
    }
    out
}

/// Escape a path segment so the result only holds ASCII alphanumerics and
/// `_`: `_` doubles, any other byte becomes `_` and two hex digits.
fn escape_id_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if c == '_' {
            out.push_str("__");
        } else {
            let mut buf = [0; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("_{byte:02x}"));
            }
        }
    }
    out
}

/// DOM-safe widget id derived from a data path.
///
/// Segments are joined with `-`, which escaped segments never contain, so
/// distinct paths get distinct ids. Ids never contain `--`; widgets that
/// belong to a control append a `--` suffix to its id.
pub fn dom_id(path: &str) -> String {
    let mut out = String::from("control");
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        out.push('-');
        out.push_str(&escape_id_segment(segment));
    }
    out
}

/// Id of a widget that is part of the control with id `control_id`.
pub fn part_id(control_id: &str, part: &str) -> String {
    format!("{control_id}--{part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "personalData": {
                    "type": "object",
                    "properties": {
                        "middleName": { "type": "string" },
                        "lastName": { "type": "string" }
                    },
                    "required": ["middleName", "lastName"]
                }
            },
            "required": ["name"]
        })
    }

    #[test]
    fn test_resolve_nested_scope() {
        let schema = nested_schema();
        let resolved = resolve_path(
            "#/properties/personalData/properties/middleName",
            &schema,
            32,
        );
        assert_eq!(resolved.path, "personalData.middleName");
        assert_eq!(resolved.schema, Some(&json!({ "type": "string" })));
        assert_eq!(resolved.property.as_deref(), Some("middleName"));
        assert!(resolved.is_required());
    }

    #[test]
    fn test_resolve_missing_segment_is_neutral() {
        let schema = nested_schema();
        let resolved = resolve_path("#/properties/personalData/properties/nope", &schema, 32);
        assert!(!resolved.is_resolved());
        assert_eq!(resolved.path, "personalData.nope");

        let resolved = resolve_path("#/properties/ghost/properties/deeper", &schema, 32);
        assert!(!resolved.is_resolved());
        assert_eq!(resolved.path, "ghost.deeper");
    }

    #[test]
    fn test_root_scope() {
        let schema = nested_schema();
        let resolved = resolve_path("#", &schema, 32);
        assert_eq!(resolved.schema, Some(&schema));
        assert_eq!(resolved.path, "");
    }

    #[test]
    fn test_items_segment_navigates_schema_only() {
        let schema = json!({
            "type": "object",
            "properties": {
                "tags": { "type": "array", "items": { "type": "string", "enum": ["a", "b"] } }
            }
        });
        let resolved = resolve_path("#/properties/tags/items", &schema, 32);
        assert_eq!(resolved.path, "tags");
        assert_eq!(resolved.schema.and_then(|s| s.get("enum")), Some(&json!(["a", "b"])));
    }

    #[test]
    fn test_property_named_properties() {
        let schema = json!({
            "type": "object",
            "properties": { "properties": { "type": "string" } }
        });
        let resolved = resolve_path("#/properties/properties", &schema, 32);
        assert!(resolved.is_resolved());
        assert_eq!(resolved.path, "properties");
    }

    #[test]
    fn test_get_and_set() {
        let mut data = json!({ "personalData": {} });
        assert_eq!(get(&data, "personalData.middleName"), None);

        set(&mut data, "personalData.middleName", Some(json!("Q")));
        assert_eq!(get(&data, "personalData.middleName"), Some(&json!("Q")));

        set(&mut data, "personalData.middleName", None);
        assert_eq!(data, json!({ "personalData": {} }));

        set(&mut data, "tags", Some(json!(["a"])));
        set(&mut data, "tags.2", Some(json!("c")));
        assert_eq!(get(&data, "tags"), Some(&json!(["a", null, "c"])));
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut data = Value::Null;
        set(&mut data, "a.b.c", Some(json!(1)));
        assert_eq!(data, json!({ "a": { "b": { "c": 1 } } }));
    }

    #[test]
    fn test_class_and_id() {
        assert_eq!(class_name("#/properties/foo"), "root_properties_foo");
        assert_eq!(dom_id("personalData.middleName"), "control-personalData-middleName");
        assert_eq!(dom_id(""), "control");
        assert_eq!(dom_id("first_name"), "control-first__name");
        assert_eq!(to_data_path("#/properties/a/properties/b"), "a.b");
    }

    #[test]
    fn test_ids_are_distinct_per_path() {
        let paths = ["a.b", "a-b", "a_b", "a_2db", "tags.add", "tags-add", "a b"];
        let ids: Vec<String> = paths.iter().map(|p| dom_id(p)).collect();
        for (i, id) in ids.iter().enumerate() {
            assert!(!id.contains("--"), "{id}");
            assert!(ids[i + 1..].iter().all(|other| other != id), "{id} repeats");
        }
        assert_eq!(dom_id("a-b"), "control-a_2db");
        assert_eq!(dom_id("a_2db"), "control-a__2db");
        assert_ne!(part_id(&dom_id("tags"), "add"), dom_id("tags.add"));
    }

    #[test]
    fn test_rebase() {
        let base = "#/properties/tags/items";
        assert_eq!(
            rebase("#/properties/tags/items/properties/name", base, "tags.2"),
            "tags.2.name"
        );
        assert_eq!(rebase(base, base, "tags.2"), "tags.2");
        assert_eq!(rebase("#/properties/other", base, "tags.2"), "tags.2.other");
        assert_eq!(rebase("#/properties/a/properties/b", "", ""), "a.b");
        assert_eq!(to_data_path("#/properties/a/properties/b"), "a.b");
    }
}
