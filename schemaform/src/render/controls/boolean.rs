use serde_json::Value;

use crate::{
    data::{state::AppState, uischema::UiSchemaElement},
    render::{
        Binding, RenderContext, Renderer, Trigger, WidgetEvent, WidgetNode,
        controls::{control_frame, set_value},
    },
    store::{Action, update},
};

/// Checkbox for `type: boolean` controls.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanControlRenderer;

impl Renderer for BooleanControlRenderer {
    fn name(&self) -> &'static str {
        "boolean-control"
    }

    fn render(&self, ctx: &RenderContext<'_>, element: &UiSchemaElement) -> WidgetNode {
        let Some(control) = element.as_control() else {
            return WidgetNode::new("div");
        };
        let state = ctx.project(control);
        ctx.bind(state.id.clone(), &state, Trigger::Value);

        let mut checkbox = WidgetNode::new("input")
            .with_id(state.id.clone())
            .with_class("input")
            .with_attr("type", "checkbox")
            .disabled(!state.enabled)
            .focused(ctx.claim_focus(&state));
        if state.value.as_ref().and_then(Value::as_bool) == Some(true) {
            checkbox = checkbox.with_attr("checked", "true");
        }
        control_frame(&state, checkbox, ctx.config)
    }

    fn on_event(&self, binding: &Binding, event: WidgetEvent, _state: &AppState) -> Option<Action> {
        match event {
            WidgetEvent::Change(Value::Bool(checked)) => {
                Some(set_value(&binding.path, Some(Value::Bool(checked))))
            }
            WidgetEvent::Change(Value::Null) => Some(set_value(&binding.path, None)),
            WidgetEvent::Change(_) => None,
            WidgetEvent::Click => Some(update(binding.path.clone(), |old| {
                let checked = old.as_ref().and_then(Value::as_bool).unwrap_or(false);
                Some(Value::Bool(!checked))
            })),
        }
    }
}
