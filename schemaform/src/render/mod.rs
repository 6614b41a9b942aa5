//! Renderer base and the built-in renderers.
//!
//! A [`Renderer`] turns one UI schema element into a [`WidgetNode`] subtree
//! using the state projected for it, and turns widget events back into
//! store actions. Layouts recurse through [`RenderContext::render_element`],
//! which asks the registry for the best renderer of every child.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    rc::Rc,
};

use serde_json::Value;

use crate::{
    config::FormsConfig,
    data::{
        state::AppState,
        uischema::{ControlElement, UiSchemaElement},
    },
    registry::RendererRegistry,
    store::Action,
};

/// Control renderers (input, boolean, enum, array).
pub mod controls;

/// Horizontal, vertical and group layouts.
pub mod layouts;

/// Per-control state projection.
pub mod projection;

/// Rendered widget tree.
pub mod widget;

pub use projection::{Constraints, ControlState, Placement, project_control};
pub use widget::WidgetNode;

/// Policy object drawing one kind of UI schema element.
pub trait Renderer {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Draw `element`.
    fn render(&self, ctx: &RenderContext<'_>, element: &UiSchemaElement) -> WidgetNode;

    /// Turn an event on a widget this renderer bound into an action.
    fn on_event(&self, binding: &Binding, event: WidgetEvent, state: &AppState) -> Option<Action> {
        let _ = (binding, event, state);
        None
    }
}

/// User interaction with a rendered widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// The widget's raw value changed (text, checkbox state, selection).
    Change(Value),
    /// A button-like widget was activated.
    Click,
}

/// What part of a control a widget drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Value,
    AddItem,
    RemoveItem(usize),
}

/// Link between a rendered widget id and the renderer that handles it.
#[derive(Clone)]
pub struct Binding {
    /// Data path of the control.
    pub path: String,
    /// Resolved sub-schema of the control, `None` for unresolved scopes.
    pub schema: Option<Value>,
    pub trigger: Trigger,
    renderer: Rc<dyn Renderer>,
}

impl Binding {
    /// Renderer that drew the widget.
    pub fn renderer(&self) -> &Rc<dyn Renderer> {
        &self.renderer
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("path", &self.path)
            .field("trigger", &self.trigger)
            .field("renderer", &self.renderer.name())
            .finish()
    }
}

/// Per-render scratch state shared by every context of one pass.
#[derive(Default)]
pub struct RenderSession {
    focus_claimed: Cell<bool>,
    bindings: RefCell<HashMap<String, Binding>>,
    controls: RefCell<Vec<ControlState>>,
}

impl RenderSession {
    /// Widget bindings made during the pass, keyed by widget id.
    pub fn into_bindings(self) -> HashMap<String, Binding> {
        self.bindings.into_inner()
    }

    /// Every control projected during the pass, in document order.
    pub fn into_controls(self) -> Vec<ControlState> {
        self.controls.into_inner()
    }
}

/// Everything a renderer may read while drawing.
#[derive(Clone)]
pub struct RenderContext<'a> {
    pub state: &'a AppState,
    pub registry: &'a RendererRegistry,
    pub config: &'a FormsConfig,
    /// Scope prefix standing for `base_path`, e.g. `#/properties/tags/items`
    /// inside an array element. Empty at the top of the form.
    pub scope_base: String,
    /// Data path `scope_base` designates.
    pub base_path: String,
    /// Constraints inherited from enclosing layouts.
    pub ancestors: Constraints,
    session: &'a RenderSession,
    current: Option<Rc<dyn Renderer>>,
}

impl<'a> RenderContext<'a> {
    /// Context for the top of the UI schema.
    pub fn root(
        state: &'a AppState,
        registry: &'a RendererRegistry,
        config: &'a FormsConfig,
        session: &'a RenderSession,
    ) -> Self {
        Self {
            state,
            registry,
            config,
            scope_base: String::new(),
            base_path: String::new(),
            ancestors: Constraints::default(),
            session,
            current: None,
        }
    }

    /// Render `element` with the best-ranked renderer, or nothing.
    pub fn render_element(&self, element: &UiSchemaElement) -> Option<WidgetNode> {
        let Some(renderer) = self.registry.select(element, &self.state.schema) else {
            debug!(
                "no renderer applicable to `{}` element, skipping it",
                element.type_name()
            );
            return None;
        };
        let ctx = Self {
            current: Some(renderer.clone()),
            ..self.clone()
        };
        Some(renderer.render(&ctx, element))
    }

    /// Same context with different inherited constraints.
    pub fn with_constraints(&self, ancestors: Constraints) -> Self {
        Self {
            ancestors,
            ..self.clone()
        }
    }

    /// Context for elements whose scopes start with `scope_base`, their data
    /// rooted at `base_path`. Scopes still resolve against the root schema.
    pub fn nested(&self, scope_base: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            scope_base: scope_base.into(),
            base_path: base_path.into(),
            ..self.clone()
        }
    }

    /// Placement of controls drawn in this context.
    pub fn placement(&self) -> Placement<'_> {
        Placement {
            scope_base: &self.scope_base,
            base_path: &self.base_path,
            ancestors: self.ancestors,
        }
    }

    /// Project a control in this context.
    pub fn project(&self, control: &ControlElement) -> ControlState {
        let state = project_control(control, self.state, self.placement(), self.config);
        self.session.controls.borrow_mut().push(state.clone());
        state
    }

    /// Grant focus to the first control asking for it in this pass.
    pub fn claim_focus(&self, control: &ControlState) -> bool {
        if !control.wants_focus || self.session.focus_claimed.get() {
            return false;
        }
        self.session.focus_claimed.set(true);
        true
    }

    /// Route events on widget `id` to the renderer drawing now.
    pub fn bind(&self, id: impl Into<String>, control: &ControlState, trigger: Trigger) {
        let Some(renderer) = self.current.clone() else {
            return;
        };
        self.session.bindings.borrow_mut().insert(
            id.into(),
            Binding {
                path: control.path.clone(),
                schema: control.schema.clone(),
                trigger,
                renderer,
            },
        );
    }
}
