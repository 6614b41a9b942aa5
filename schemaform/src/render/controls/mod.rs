//! Built-in control renderers.
//!
//! Every control draws the same frame: a wrapper carrying the scope class,
//! a label bound to the widget id, the widget itself, and a validation line.

use serde_json::{Number, Value};

use crate::{
    config::FormsConfig,
    data::schema::SchemaNode,
    render::{ControlState, WidgetNode},
    store::{Action, update},
};

mod array;
mod boolean;
mod enum_control;
mod input;

pub use array::ArrayControlRenderer;
pub use boolean::BooleanControlRenderer;
pub use enum_control::EnumControlRenderer;
pub use input::InputControlRenderer;

/// Wrap `widget` in the standard control frame.
pub(crate) fn control_frame(
    control: &ControlState,
    widget: WidgetNode,
    config: &FormsConfig,
) -> WidgetNode {
    let mut validation = WidgetNode::new("div")
        .with_class("validation")
        .with_text(control.error_text(&config.error_separator));
    if !control.is_valid() {
        validation = validation.with_class("validation_error");
    }

    WidgetNode::new("div")
        .with_class("control")
        .with_class(control.class_name.clone())
        .hidden(!control.visible)
        .with_child(
            WidgetNode::new("label")
                .with_attr("for", control.id.clone())
                .with_text(control.label.clone()),
        )
        .with_child(widget)
        .with_child(validation)
}

/// Text shown for a JSON value inside a widget.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Convert raw widget input to a value of the control's schema type.
///
/// Empty text clears the value; text that does not parse as the declared
/// type is kept as a string so validation reports it.
pub(crate) fn coerce_input(raw: Value, schema: Option<&Value>) -> Option<Value> {
    let Value::String(text) = raw else {
        return Some(raw);
    };
    if text.is_empty() {
        return None;
    }
    let parsed = match schema.and_then(SchemaNode::schema_type) {
        Some("integer") => text.trim().parse::<i64>().ok().map(Value::from),
        Some("number") => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        Some("boolean") => text.trim().parse::<bool>().ok().map(Value::Bool),
        _ => None,
    };
    Some(parsed.unwrap_or(Value::String(text)))
}

/// Set `path` to `value`.
pub(crate) fn set_value(path: &str, value: Option<Value>) -> Action {
    update(path.to_string(), move |_| value)
}
