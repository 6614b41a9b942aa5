use serde_json::Value;

use crate::{
    data::{schema::SchemaNode, state::AppState, uischema::UiSchemaElement},
    render::{
        Binding, RenderContext, Renderer, Trigger, WidgetEvent, WidgetNode,
        controls::{control_frame, display_value, set_value},
    },
    store::Action,
};

/// Single-choice selector over a schema's `enum`.
///
/// The first option is an empty placeholder; choosing it clears the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumControlRenderer;

impl Renderer for EnumControlRenderer {
    fn name(&self) -> &'static str {
        "enum-control"
    }

    fn render(&self, ctx: &RenderContext<'_>, element: &UiSchemaElement) -> WidgetNode {
        let Some(control) = element.as_control() else {
            return WidgetNode::new("div");
        };
        let state = ctx.project(control);
        ctx.bind(state.id.clone(), &state, Trigger::Value);

        let current = state.value.as_ref().map(display_value).unwrap_or_default();
        let mut options = vec![WidgetNode::new("option").with_attr("value", "")];
        for literal in state
            .schema
            .as_ref()
            .and_then(|s| s.enum_values())
            .unwrap_or_default()
        {
            let text = display_value(literal);
            let mut option = WidgetNode::new("option")
                .with_attr("value", text.clone())
                .with_text(text.clone());
            if state.value.is_some() && text == current {
                option = option.with_attr("selected", "true");
            }
            options.push(option);
        }

        let select = WidgetNode::new("select")
            .with_id(state.id.clone())
            .with_class("select")
            .with_attr("value", current)
            .disabled(!state.enabled)
            .focused(ctx.claim_focus(&state))
            .with_children(options);
        control_frame(&state, select, ctx.config)
    }

    fn on_event(&self, binding: &Binding, event: WidgetEvent, _state: &AppState) -> Option<Action> {
        let WidgetEvent::Change(raw) = event else {
            return None;
        };
        let literals = binding
            .schema
            .as_ref()
            .and_then(|s| s.enum_values())
            .unwrap_or_default();

        let chosen = match &raw {
            Value::Null => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(
                literals
                    .iter()
                    .find(|literal| display_value(literal) == *text)?
                    .clone(),
            ),
            other => Some(literals.iter().find(|literal| *literal == other)?.clone()),
        };
        Some(set_value(&binding.path, chosen))
    }
}
