//! Form session: store, registry and the widget bindings of the last render.

use std::collections::HashMap;

use serde_json::Value;

use crate::{
    config::FormsConfig,
    data::{
        app_data::FormDocument,
        path,
        schema::check_root,
        state::{AppState, ValidationError},
        uischema::{LayoutKind, UiSchemaElement},
    },
    error::{FormError, Result},
    generate::default_uischema,
    registry::RendererRegistry,
    render::{
        Binding, ControlState, RenderContext, RenderSession, WidgetEvent, WidgetNode,
    },
    store::{self, Action, Store, SubscriptionId},
    validation::{SchemaValidator, Validator},
};

/// One editing session over a schema, a UI schema and a data instance.
///
/// ```
/// use schemaform::{Form, WidgetEvent};
/// use serde_json::json;
///
/// let schema = json!({
///     "type": "object",
///     "properties": { "name": { "type": "string" } }
/// });
/// let mut form = Form::from_json(json!({}), schema, None).unwrap();
/// form.render();
/// form.handle_event("control-name", WidgetEvent::Change(json!("Ada"))).unwrap();
/// assert_eq!(form.data(), &json!({ "name": "Ada" }));
/// ```
pub struct Form {
    store: Store,
    registry: RendererRegistry,
    config: FormsConfig,
    bindings: HashMap<String, Binding>,
}

impl Form {
    /// Session with the default configuration, built-in renderers and the
    /// `jsonschema` validator.
    pub fn new(data: Value, schema: Value, uischema: UiSchemaElement) -> Result<Self> {
        let config = FormsConfig::default();
        let validator = SchemaValidator::new(config.validate_formats);
        Self::with_parts(
            data,
            schema,
            uischema,
            config,
            RendererRegistry::with_defaults(),
            validator,
        )
    }

    /// Session from raw JSON; without a UI schema the default one is generated.
    pub fn from_json(data: Value, schema: Value, uischema: Option<&Value>) -> Result<Self> {
        let uischema = match uischema {
            Some(raw) => UiSchemaElement::parse(raw)?,
            None => default_uischema(&schema),
        };
        Self::new(data, schema, uischema)
    }

    /// Session over a document loaded from disk.
    pub fn from_document(document: FormDocument, config: FormsConfig) -> Result<Self> {
        let validator = SchemaValidator::new(config.validate_formats);
        Self::with_parts(
            document.data,
            document.schema,
            document.uischema,
            config,
            RendererRegistry::with_defaults(),
            validator,
        )
    }

    /// Session with every part supplied by the caller.
    pub fn with_parts(
        data: Value,
        schema: Value,
        uischema: UiSchemaElement,
        config: FormsConfig,
        registry: RendererRegistry,
        validator: impl Validator + 'static,
    ) -> Result<Self> {
        check_root(&schema)?;
        SchemaValidator::new(config.validate_formats)
            .check_schema(&schema)
            .map_err(FormError::InvalidSchema)?;

        let empty = AppState::new(
            Value::Null,
            Value::Null,
            UiSchemaElement::layout(LayoutKind::Vertical, Vec::new()),
        );
        let mut store = Store::new(empty, validator, &config);
        store.dispatch(store::init(data, schema, uischema));
        info!(
            "form session started with {} validation error(s)",
            store.state().errors.len()
        );

        Ok(Self {
            store,
            registry,
            config,
            bindings: HashMap::new(),
        })
    }

    /// Current application state.
    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    /// Current data instance.
    pub fn data(&self) -> &Value {
        &self.store.state().data
    }

    /// Errors of the last validation run, in validator order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.store.state().errors
    }

    /// Session configuration.
    pub fn config(&self) -> &FormsConfig {
        &self.config
    }

    /// Renderers consulted by [`Form::render`].
    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    /// Registry access for adding or removing renderers; takes effect on
    /// the next [`Form::render`].
    pub fn registry_mut(&mut self) -> &mut RendererRegistry {
        &mut self.registry
    }

    /// Apply `action` and notify subscribers.
    pub fn dispatch(&mut self, action: Action) {
        self.store.dispatch(action);
    }

    /// Replace the value at `path`; `None` removes it.
    pub fn set_value(&mut self, path: impl Into<String>, value: Option<Value>) {
        self.dispatch(store::update(path, move |_| value));
    }

    /// Re-run the validator.
    pub fn validate(&mut self) {
        self.dispatch(store::validate());
    }

    /// Projection of every control a render would draw, in document order.
    ///
    /// Runs the same renderer walk as [`Form::render`], so array elements
    /// and controls drawn by custom renderers are included, and controls no
    /// renderer applies to are not.
    pub fn controls(&self) -> Vec<ControlState> {
        let (_, session) = self.render_pass();
        session.into_controls()
    }

    fn render_pass(&self) -> (Option<WidgetNode>, RenderSession) {
        let session = RenderSession::default();
        let state = self.store.state();
        let root = RenderContext::root(state, &self.registry, &self.config, &session)
            .render_element(&state.uischema);
        (root, session)
    }

    /// Draw the whole form and remember which renderer owns each widget.
    pub fn render(&mut self) -> WidgetNode {
        let (root, session) = self.render_pass();
        self.bindings = session.into_bindings();

        let form = WidgetNode::new("form").with_class("form");
        match root {
            Some(root) => form.with_child(root),
            None => {
                warn!("no renderer applies to the UI schema root, nothing rendered");
                form
            }
        }
    }

    /// Widget ids produced by the last render.
    pub fn widget_ids(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Route a widget event to its renderer and dispatch the resulting
    /// action. Returns whether an action was dispatched.
    pub fn handle_event(&mut self, id: &str, event: WidgetEvent) -> Result<bool> {
        let binding = self
            .bindings
            .get(id)
            .cloned()
            .ok_or_else(|| FormError::UnknownWidget(id.to_string()))?;
        let action = binding
            .renderer()
            .on_event(&binding, event, self.store.state());
        match action {
            Some(action) => {
                self.dispatch(action);
                Ok(true)
            }
            None => {
                debug!("event on `{id}` ignored by `{}`", binding.renderer().name());
                Ok(false)
            }
        }
    }

    /// Call `listener` with the new state after every dispatch.
    pub fn subscribe(&mut self, listener: impl FnMut(&AppState) + 'static) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Drop a subscription; `false` when `id` is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Call `callback` whenever the value at `path` changes.
    pub fn watch(
        &mut self,
        path: impl Into<String>,
        mut callback: impl FnMut(Option<&Value>) + 'static,
    ) -> SubscriptionId {
        let path = path.into();
        let mut last = path::get(self.data(), &path).cloned();
        self.store.subscribe(move |state| {
            let current = path::get(&state.data, &path);
            if current != last.as_ref() {
                last = current.cloned();
                callback(current);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object_schema() {
        let err = Form::from_json(json!({}), json!("nope"), None).err().unwrap();
        assert!(matches!(err, FormError::Schema(_)));
    }

    #[test]
    fn test_rejects_uncompilable_schema() {
        let err = Form::from_json(json!({}), json!({ "type": 12 }), None)
            .err()
            .unwrap();
        assert!(matches!(err, FormError::InvalidSchema(_)));
    }

    #[test]
    fn test_unknown_widget() {
        let mut form = Form::from_json(json!({}), json!({ "type": "object" }), None).unwrap();
        form.render();
        let err = form.handle_event("control-missing", WidgetEvent::Click).unwrap_err();
        assert!(matches!(err, FormError::UnknownWidget(id) if id == "control-missing"));
    }

    #[test]
    fn test_custom_validator_runs_on_init() {
        let validator = |_: &Value, _: &Value| vec![ValidationError::new("", "always")];
        let form = Form::with_parts(
            json!({}),
            json!({ "type": "object" }),
            UiSchemaElement::control("#"),
            FormsConfig::default(),
            RendererRegistry::with_defaults(),
            validator,
        )
        .unwrap();
        assert_eq!(form.errors(), [ValidationError::new("", "always")]);
    }
}
