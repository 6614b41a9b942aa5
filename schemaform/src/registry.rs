//! Registry of `(tester, renderer)` pairs.

use std::rc::Rc;

use serde_json::Value;

use crate::{
    data::uischema::{LayoutKind, UiSchemaElement},
    render::{
        Renderer,
        controls::{ArrayControlRenderer, BooleanControlRenderer, EnumControlRenderer, InputControlRenderer},
        layouts::LayoutRenderer,
    },
    tester::{
        NOT_APPLICABLE, Tester, array_control_tester, boolean_control_tester, enum_control_tester,
        input_control_tester, layout_tester,
    },
};

/// Handle identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RendererHandle(u64);

struct RendererEntry {
    handle: RendererHandle,
    tester: Box<dyn Tester>,
    renderer: Rc<dyn Renderer>,
}

/// Ordered set of renderers with their testers.
///
/// Selection scans every entry and keeps the highest rank; on equal ranks
/// the later registration wins, so custom renderers shadow built-ins.
#[derive(Default)]
pub struct RendererRegistry {
    entries: Vec<RendererEntry>,
    next_handle: u64,
}

impl RendererRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in control and layout renderers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(input_control_tester, InputControlRenderer);
        registry.register(boolean_control_tester, BooleanControlRenderer);
        registry.register(enum_control_tester, EnumControlRenderer);
        registry.register(array_control_tester, ArrayControlRenderer);
        for kind in [LayoutKind::Horizontal, LayoutKind::Vertical, LayoutKind::Group] {
            registry.register(layout_tester(kind), LayoutRenderer::new(kind));
        }
        registry
    }

    /// Add a renderer; later registrations win rank ties.
    pub fn register(
        &mut self,
        tester: impl Tester + 'static,
        renderer: impl Renderer + 'static,
    ) -> RendererHandle {
        self.register_rc(tester, Rc::new(renderer))
    }

    /// Add a shared renderer.
    pub fn register_rc(
        &mut self,
        tester: impl Tester + 'static,
        renderer: Rc<dyn Renderer>,
    ) -> RendererHandle {
        let handle = RendererHandle(self.next_handle);
        self.next_handle += 1;
        debug!("register renderer `{}`", renderer.name());
        self.entries.push(RendererEntry {
            handle,
            tester: Box::new(tester),
            renderer,
        });
        handle
    }

    /// Remove a registration; returns whether it existed.
    pub fn unregister(&mut self, handle: RendererHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() != before
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best renderer for `element`, if any tester applies.
    pub fn select(&self, element: &UiSchemaElement, schema: &Value) -> Option<Rc<dyn Renderer>> {
        let mut best: Option<(i32, &RendererEntry)> = None;
        for entry in &self.entries {
            let rank = entry.tester.rank(element, schema);
            if rank <= NOT_APPLICABLE {
                continue;
            }
            if best.is_none_or(|(best_rank, _)| rank >= best_rank) {
                best = Some((rank, entry));
            }
        }
        best.map(|(rank, entry)| {
            debug!(
                "`{}` element drawn by `{}` (rank {rank})",
                element.type_name(),
                entry.renderer.name()
            );
            entry.renderer.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        render::{RenderContext, WidgetNode},
        tester::{rank_with, ui_type_is},
    };
    use serde_json::json;

    struct Named(&'static str);

    impl Renderer for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn render(&self, _ctx: &RenderContext<'_>, _element: &UiSchemaElement) -> WidgetNode {
            WidgetNode::new(self.0)
        }
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "foo": { "type": "string", "enum": ["a"] },
                "bar": { "type": "string" },
                "flag": { "type": "boolean" }
            }
        })
    }

    fn selected(registry: &RendererRegistry, element: &UiSchemaElement) -> Option<&'static str> {
        registry.select(element, &schema()).map(|r| r.name())
    }

    #[test]
    fn test_defaults_pick_most_specific() {
        let registry = RendererRegistry::with_defaults();
        assert_eq!(
            selected(&registry, &UiSchemaElement::control("#/properties/foo")),
            Some("enum-control")
        );
        assert_eq!(
            selected(&registry, &UiSchemaElement::control("#/properties/bar")),
            Some("input-control")
        );
        assert_eq!(
            selected(&registry, &UiSchemaElement::control("#/properties/flag")),
            Some("boolean-control")
        );
        assert_eq!(
            selected(
                &registry,
                &UiSchemaElement::layout(LayoutKind::Group, vec![])
            ),
            Some("group-layout")
        );
    }

    #[test]
    fn test_no_tester_matches() {
        let registry = RendererRegistry::with_defaults();
        let custom = UiSchemaElement::parse(&json!({ "type": "Foo" })).unwrap();
        assert!(registry.select(&custom, &schema()).is_none());
        assert!(RendererRegistry::new().is_empty());
    }

    #[test]
    fn test_equal_rank_latest_registration_wins() {
        let mut registry = RendererRegistry::with_defaults();
        let bar = UiSchemaElement::control("#/properties/bar");
        let first = registry.register(rank_with(1, ui_type_is("Control")), Named("custom-a"));
        assert_eq!(selected(&registry, &bar), Some("custom-a"));
        registry.register(rank_with(1, ui_type_is("Control")), Named("custom-b"));
        assert_eq!(selected(&registry, &bar), Some("custom-b"));

        // A lower rank never shadows, whatever the order.
        registry.register(rank_with(0, ui_type_is("Control")), Named("custom-c"));
        assert_eq!(selected(&registry, &bar), Some("custom-b"));

        assert!(registry.unregister(first));
        assert!(!registry.unregister(first));
    }

    #[test]
    fn test_selection_is_repeatable() {
        let registry = RendererRegistry::with_defaults();
        let foo = UiSchemaElement::control("#/properties/foo");
        let picks: Vec<_> = (0..5).map(|_| selected(&registry, &foo)).collect();
        assert!(picks.iter().all(|p| *p == Some("enum-control")));
    }
}
