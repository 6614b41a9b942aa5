use serde_json::Value;

use crate::{
    data::{schema::SchemaNode, state::AppState, uischema::UiSchemaElement},
    render::{
        Binding, RenderContext, Renderer, Trigger, WidgetEvent, WidgetNode,
        controls::{coerce_input, control_frame, display_value, set_value},
    },
    store::Action,
};

/// Catch-all editable field for string, number and integer controls.
///
/// A control whose scope does not resolve is drawn as a disabled, empty
/// field, and edits on it are ignored so the data at its path is left as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputControlRenderer;

/// Input type for a schema: `number`, `date`, `datetime-local`, `time` or `text`.
pub fn input_type(schema: Option<&Value>) -> &'static str {
    let Some(schema) = schema else {
        return "text";
    };
    match (schema.schema_type(), schema.format()) {
        (Some("integer" | "number"), _) => "number",
        (_, Some("date")) => "date",
        (_, Some("date-time")) => "datetime-local",
        (_, Some("time")) => "time",
        _ => "text",
    }
}

impl Renderer for InputControlRenderer {
    fn name(&self) -> &'static str {
        "input-control"
    }

    fn render(&self, ctx: &RenderContext<'_>, element: &UiSchemaElement) -> WidgetNode {
        let Some(control) = element.as_control() else {
            return WidgetNode::new("div");
        };
        let state = ctx.project(control);
        ctx.bind(state.id.clone(), &state, Trigger::Value);

        let resolved = state.schema.is_some();
        let mut input = WidgetNode::new("input")
            .with_id(state.id.clone())
            .with_class("input")
            .with_attr("type", input_type(state.schema.as_ref()))
            .disabled(!state.enabled || !resolved)
            .focused(resolved && ctx.claim_focus(&state));
        if !resolved {
            input = input.with_class("unresolved");
        }
        if let Some(value) = &state.value {
            input = input.with_attr("value", display_value(value));
        }
        control_frame(&state, input, ctx.config)
    }

    fn on_event(&self, binding: &Binding, event: WidgetEvent, _state: &AppState) -> Option<Action> {
        let schema = binding.schema.as_ref()?;
        match event {
            WidgetEvent::Change(raw) => {
                Some(set_value(&binding.path, coerce_input(raw, Some(schema))))
            }
            WidgetEvent::Click => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_type() {
        assert_eq!(input_type(Some(&json!({ "type": "integer" }))), "number");
        assert_eq!(input_type(Some(&json!({ "type": "string", "format": "date" }))), "date");
        assert_eq!(
            input_type(Some(&json!({ "type": "string", "format": "date-time" }))),
            "datetime-local"
        );
        assert_eq!(input_type(Some(&json!({ "type": "string" }))), "text");
        assert_eq!(input_type(None), "text");
    }
}
