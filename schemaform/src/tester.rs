//! Testers decide which renderer draws a UI schema element.
//!
//! A tester maps `(element, root schema)` to a rank; [`NOT_APPLICABLE`]
//! means the renderer cannot draw the element. Testers are composed from
//! predicates with [`and`], [`or`] and [`rank_with`].

use serde_json::Value;

use crate::data::{
    path::resolve_path,
    schema::SchemaNode,
    uischema::{LayoutKind, UiSchemaElement},
};

/// Rank returned when a tester does not apply.
pub const NOT_APPLICABLE: i32 = -1;

/// `$ref` hops followed by testers that resolve a control scope.
pub const TESTER_REF_DEPTH: usize = 32;

/// Ranks a UI schema element against the root schema.
pub trait Tester {
    fn rank(&self, element: &UiSchemaElement, schema: &Value) -> i32;
}

impl<F> Tester for F
where
    F: Fn(&UiSchemaElement, &Value) -> i32,
{
    fn rank(&self, element: &UiSchemaElement, schema: &Value) -> i32 {
        self(element, schema)
    }
}

/// Rank `rank` when `predicate` holds, otherwise [`NOT_APPLICABLE`].
pub fn rank_with<P>(rank: i32, predicate: P) -> impl Fn(&UiSchemaElement, &Value) -> i32
where
    P: Fn(&UiSchemaElement, &Value) -> bool,
{
    move |element: &UiSchemaElement, schema: &Value| {
        if predicate(element, schema) {
            rank
        } else {
            NOT_APPLICABLE
        }
    }
}

/// Both predicates hold.
pub fn and<A, B>(a: A, b: B) -> impl Fn(&UiSchemaElement, &Value) -> bool
where
    A: Fn(&UiSchemaElement, &Value) -> bool,
    B: Fn(&UiSchemaElement, &Value) -> bool,
{
    move |element: &UiSchemaElement, schema: &Value| a(element, schema) && b(element, schema)
}

/// Either predicate holds.
pub fn or<A, B>(a: A, b: B) -> impl Fn(&UiSchemaElement, &Value) -> bool
where
    A: Fn(&UiSchemaElement, &Value) -> bool,
    B: Fn(&UiSchemaElement, &Value) -> bool,
{
    move |element: &UiSchemaElement, schema: &Value| a(element, schema) || b(element, schema)
}

/// The element's `type` tag equals `ty`.
pub fn ui_type_is(ty: impl Into<String>) -> impl Fn(&UiSchemaElement, &Value) -> bool {
    let ty = ty.into();
    move |element: &UiSchemaElement, _schema: &Value| element.type_name() == ty
}

/// The element is a control whose scope resolves to a sub-schema matching `matcher`.
pub fn schema_matches<M>(matcher: M) -> impl Fn(&UiSchemaElement, &Value) -> bool
where
    M: Fn(&Value) -> bool,
{
    move |element: &UiSchemaElement, schema: &Value| {
        let Some(control) = element.as_control() else {
            return false;
        };
        resolve_path(&control.scope, schema, TESTER_REF_DEPTH)
            .schema
            .is_some_and(&matcher)
    }
}

/// The control's sub-schema declares type `ty`.
pub fn schema_type_is(ty: &'static str) -> impl Fn(&UiSchemaElement, &Value) -> bool {
    schema_matches(move |sub: &Value| sub.is_type(ty))
}

/// The control's sub-schema declares `format: fmt`.
pub fn format_is(fmt: &'static str) -> impl Fn(&UiSchemaElement, &Value) -> bool {
    schema_matches(move |sub: &Value| sub.format() == Some(fmt))
}

/// The element's `options[key]` equals `expected`.
pub fn option_is(key: &'static str, expected: Value) -> impl Fn(&UiSchemaElement, &Value) -> bool {
    move |element: &UiSchemaElement, _schema: &Value| element.options().get(key) == Some(&expected)
}

/// The control's scope ends with `suffix`.
pub fn scope_ends_with(suffix: &'static str) -> impl Fn(&UiSchemaElement, &Value) -> bool {
    move |element: &UiSchemaElement, _schema: &Value| {
        element
            .as_control()
            .is_some_and(|control| control.scope.ends_with(suffix))
    }
}

/// Boolean control: rank 2 when the schema type is `boolean`.
pub fn boolean_control_tester(element: &UiSchemaElement, schema: &Value) -> i32 {
    rank_with(2, and(ui_type_is("Control"), schema_type_is("boolean")))(element, schema)
}

/// Enum control: rank 2 when the schema has an `enum`, whatever its type.
pub fn enum_control_tester(element: &UiSchemaElement, schema: &Value) -> i32 {
    rank_with(
        2,
        and(
            ui_type_is("Control"),
            schema_matches(|sub: &Value| sub.get("enum").is_some()),
        ),
    )(element, schema)
}

/// Generic input control: rank 1 for any control.
pub fn input_control_tester(element: &UiSchemaElement, schema: &Value) -> i32 {
    rank_with(1, ui_type_is("Control"))(element, schema)
}

/// Array control: rank 3 for `type: array` schemas with a single `items` schema.
pub fn array_control_tester(element: &UiSchemaElement, schema: &Value) -> i32 {
    rank_with(
        3,
        and(
            ui_type_is("Control"),
            schema_matches(|sub: &Value| sub.is_type("array") && sub.items().is_some()),
        ),
    )(element, schema)
}

/// Layout renderers: rank 1 when the element's tag is the layout's tag.
pub fn layout_tester(kind: LayoutKind) -> impl Fn(&UiSchemaElement, &Value) -> i32 {
    rank_with(1, ui_type_is(kind.tag()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn enum_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "foo": { "type": "string", "enum": ["a", "b"] },
                "bar": { "type": "string" },
                "flag": { "type": "boolean" },
                "tags": { "type": "array", "items": { "type": "string" } }
            }
        })
    }

    #[test]
    fn test_enum_tester() {
        let schema = enum_schema();
        let foo = UiSchemaElement::control("#/properties/foo");
        let bar = UiSchemaElement::control("#/properties/bar");
        assert_eq!(enum_control_tester(&foo, &schema), 2);
        assert_eq!(enum_control_tester(&bar, &schema), NOT_APPLICABLE);
    }

    #[test]
    fn test_enum_without_type() {
        let schema = json!({ "type": "object", "properties": { "foo": { "enum": [1, 2] } } });
        let foo = UiSchemaElement::control("#/properties/foo");
        assert_eq!(enum_control_tester(&foo, &schema), 2);
    }

    #[test]
    fn test_input_tester() {
        let schema = enum_schema();
        let custom = UiSchemaElement::parse(&json!({ "type": "Foo" })).unwrap();
        assert_eq!(input_control_tester(&custom, &schema), NOT_APPLICABLE);
        let bar = UiSchemaElement::control("#/properties/bar");
        assert_eq!(input_control_tester(&bar, &schema), 1);
        // The catch-all also applies to unresolved scopes.
        let ghost = UiSchemaElement::control("#/properties/ghost");
        assert_eq!(input_control_tester(&ghost, &schema), 1);
    }

    #[test]
    fn test_boolean_and_array_testers() {
        let schema = enum_schema();
        let flag = UiSchemaElement::control("#/properties/flag");
        let tags = UiSchemaElement::control("#/properties/tags");
        assert_eq!(boolean_control_tester(&flag, &schema), 2);
        assert_eq!(boolean_control_tester(&tags, &schema), NOT_APPLICABLE);
        assert_eq!(array_control_tester(&tags, &schema), 3);
        assert_eq!(array_control_tester(&flag, &schema), NOT_APPLICABLE);
    }

    #[test]
    fn test_layout_testers_are_disjoint_from_controls() {
        let schema = enum_schema();
        let layout = UiSchemaElement::layout(LayoutKind::Horizontal, vec![]);
        assert_eq!(layout_tester(LayoutKind::Horizontal)(&layout, &schema), 1);
        assert_eq!(layout_tester(LayoutKind::Vertical)(&layout, &schema), NOT_APPLICABLE);
        assert_eq!(input_control_tester(&layout, &schema), NOT_APPLICABLE);
    }

    #[test]
    fn test_combinators() {
        let schema = enum_schema();
        let foo = UiSchemaElement::control("#/properties/foo");
        let either = rank_with(5, or(scope_ends_with("bar"), scope_ends_with("foo")));
        assert_eq!(either(&foo, &schema), 5);
        let date = rank_with(4, format_is("date"));
        assert_eq!(date(&foo, &schema), NOT_APPLICABLE);
    }
}
