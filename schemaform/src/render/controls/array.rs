use serde_json::Value;

use crate::{
    data::{
        path::{compose, part_id, resolve_path},
        schema::{SchemaNode, deref},
        state::AppState,
        uischema::UiSchemaElement,
    },
    generate::{default_uischema_at, default_value},
    render::{
        Binding, Constraints, RenderContext, Renderer, Trigger, WidgetEvent, WidgetNode,
        controls::control_frame,
    },
    store::{Action, update},
    tester::TESTER_REF_DEPTH,
};

/// List editor for `type: array` controls with an `items` schema.
///
/// Every element is drawn with the default UI schema generated at
/// `<scope>/items`, in a context where that scope prefix stands for the
/// element's data path.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayControlRenderer;

impl Renderer for ArrayControlRenderer {
    fn name(&self) -> &'static str {
        "array-control"
    }

    fn render(&self, ctx: &RenderContext<'_>, element: &UiSchemaElement) -> WidgetNode {
        let Some(control) = element.as_control() else {
            return WidgetNode::new("div");
        };
        let state = ctx.project(control);
        let items_scope = format!("{}/items", control.scope.trim_end_matches('/'));
        let depth = ctx.config.max_ref_depth;
        let items = resolve_path(&items_scope, &ctx.state.schema, depth).schema;

        let add_id = part_id(&state.id, "add");
        ctx.bind(add_id.clone(), &state, Trigger::AddItem);

        let len = state
            .value
            .as_ref()
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        let mut list = WidgetNode::new("div").with_class("array-items");
        if items.is_some() {
            let item_ui = default_uischema_at(&ctx.state.schema, &items_scope);
            let inherited = Constraints {
                visible: state.visible,
                enabled: state.enabled,
            };
            for index in 0..len {
                let item_ctx = ctx
                    .nested(items_scope.as_str(), compose(&state.path, &index.to_string()))
                    .with_constraints(inherited);
                let remove_id = part_id(&state.id, &format!("remove-{index}"));
                ctx.bind(remove_id.clone(), &state, Trigger::RemoveItem(index));

                let mut row = WidgetNode::new("div").with_class("array-item");
                if let Some(child) = item_ctx.render_element(&item_ui) {
                    row = row.with_child(child);
                }
                list = list.with_child(
                    row.with_child(
                        WidgetNode::new("button")
                            .with_id(remove_id)
                            .with_class("array-remove")
                            .with_text("Remove")
                            .disabled(!state.enabled),
                    ),
                );
            }
        }

        let add = WidgetNode::new("button")
            .with_id(add_id)
            .with_class("array-add")
            .with_text("Add")
            .disabled(!state.enabled)
            .focused(ctx.claim_focus(&state));
        control_frame(&state, add, ctx.config)
            .with_class("array-control")
            .with_child(list)
    }

    fn on_event(&self, binding: &Binding, event: WidgetEvent, state: &AppState) -> Option<Action> {
        if event != WidgetEvent::Click {
            return None;
        }
        match binding.trigger {
            Trigger::AddItem => {
                let item = default_value(
                    binding
                        .schema
                        .as_ref()
                        .and_then(SchemaNode::items)
                        .and_then(|items| deref(&state.schema, items, TESTER_REF_DEPTH)),
                );
                Some(update(binding.path.clone(), move |old| {
                    let mut list = match old {
                        Some(Value::Array(list)) => list,
                        _ => Vec::new(),
                    };
                    list.push(item);
                    Some(Value::Array(list))
                }))
            }
            Trigger::RemoveItem(index) => Some(update(binding.path.clone(), move |old| {
                match old {
                    Some(Value::Array(mut list)) => {
                        if index < list.len() {
                            list.remove(index);
                        }
                        Some(Value::Array(list))
                    }
                    other => other,
                }
            })),
            Trigger::Value => None,
        }
    }
}
