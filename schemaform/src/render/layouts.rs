use crate::{
    data::uischema::{LayoutKind, UiSchemaElement},
    render::{RenderContext, Renderer, WidgetNode},
};

/// Draws a layout's children in order, passing its rule down.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRenderer {
    kind: LayoutKind,
}

impl LayoutRenderer {
    pub fn new(kind: LayoutKind) -> Self {
        Self { kind }
    }

    fn class(&self) -> &'static str {
        match self.kind {
            LayoutKind::Horizontal => "horizontal-layout",
            LayoutKind::Vertical => "vertical-layout",
            LayoutKind::Group => "group-layout",
        }
    }
}

impl Renderer for LayoutRenderer {
    fn name(&self) -> &'static str {
        self.class()
    }

    fn render(&self, ctx: &RenderContext<'_>, element: &UiSchemaElement) -> WidgetNode {
        let Some(layout) = element.as_layout() else {
            return WidgetNode::new("div");
        };
        let constraints = ctx.ancestors.apply(
            layout.rule.as_ref(),
            &ctx.state.data,
            &ctx.scope_base,
            &ctx.base_path,
        );
        let inner = ctx.with_constraints(constraints);

        let mut node = match self.kind {
            LayoutKind::Group => {
                let mut fieldset = WidgetNode::new("fieldset").with_class("group");
                if let Some(label) = &layout.label {
                    fieldset = fieldset.with_child(WidgetNode::new("legend").with_text(label.clone()));
                }
                fieldset
            }
            _ => WidgetNode::new("div"),
        };
        node = node
            .with_class("layout")
            .with_class(self.class())
            .hidden(!constraints.visible)
            .disabled(!constraints.enabled);

        for child in &layout.elements {
            if let Some(rendered) = inner.render_element(child) {
                node = node.with_child(rendered);
            }
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::FormsConfig,
        data::state::AppState,
        registry::RendererRegistry,
        render::RenderSession,
    };
    use serde_json::json;

    fn render(schema: serde_json::Value, data: serde_json::Value, ui: serde_json::Value) -> WidgetNode {
        let state = AppState::new(data, schema, UiSchemaElement::parse(&ui).unwrap());
        let registry = RendererRegistry::with_defaults();
        let config = FormsConfig::default();
        let session = RenderSession::default();
        let ctx = RenderContext::root(&state, &registry, &config, &session);
        ctx.render_element(&state.uischema).unwrap()
    }

    #[test]
    fn test_group_has_legend_and_children_in_order() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "string" }, "b": { "type": "string" } }
        });
        let ui = json!({
            "type": "Group",
            "label": "Names",
            "elements": [
                { "type": "Control", "scope": "#/properties/a" },
                { "type": "Control", "scope": "#/properties/b" }
            ]
        });
        let node = render(schema, json!({}), ui);
        assert_eq!(node.tag, "fieldset");
        assert!(node.has_class("group-layout"));
        assert_eq!(node.find_by_tag("legend").unwrap().text_content(), "Names");
        let controls = node.find_all_by_class("control");
        assert_eq!(controls.len(), 2);
        assert!(controls[0].has_class("root_properties_a"));
        assert!(controls[1].has_class("root_properties_b"));
    }

    #[test]
    fn test_hidden_layout_hides_controls() {
        let schema = json!({
            "type": "object",
            "properties": { "show": { "type": "boolean" }, "name": { "type": "string" } }
        });
        let ui = json!({
            "type": "HorizontalLayout",
            "rule": {
                "effect": "HIDE",
                "condition": { "scope": "#/properties/show", "expectedValue": false }
            },
            "elements": [{ "type": "Control", "scope": "#/properties/name" }]
        });
        let node = render(schema, json!({ "show": false }), ui);
        assert!(node.hidden);
        assert!(node.find_by_class("root_properties_name").unwrap().hidden);
    }
}
