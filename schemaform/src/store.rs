//! Central store: the only place [`AppState`] changes.
//!
//! Actions are reduced synchronously in dispatch order and every
//! subscriber is notified once per dispatch with the completed state.

use std::fmt;

use serde_json::Value;

use crate::{
    config::FormsConfig,
    data::{path, state::AppState, uischema::UiSchemaElement},
    validation::Validator,
};

/// Pure `old value -> new value` function carried by an update.
///
/// `None` stands for an absent (undefined) value on both sides.
pub type Updater = Box<dyn FnOnce(Option<Value>) -> Option<Value>>;

/// State transitions understood by the [`Store`].
pub enum Action {
    /// Replace the whole session.
    Init {
        data: Value,
        schema: Value,
        uischema: UiSchemaElement,
    },
    /// Rewrite the value at `path`.
    Update { path: String, updater: Updater },
    /// Re-run the validator, replacing every error.
    Validate,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Init { .. } => f.write_str("Init"),
            Action::Update { path, .. } => f.debug_struct("Update").field("path", path).finish(),
            Action::Validate => f.write_str("Validate"),
        }
    }
}

/// Build an update action.
pub fn update<F>(path: impl Into<String>, updater: F) -> Action
where
    F: FnOnce(Option<Value>) -> Option<Value> + 'static,
{
    Action::Update {
        path: path.into(),
        updater: Box::new(updater),
    }
}

/// Build a validate action.
pub fn validate() -> Action {
    Action::Validate
}

/// Build an init action.
pub fn init(data: Value, schema: Value, uischema: UiSchemaElement) -> Action {
    Action::Init {
        data,
        schema,
        uischema,
    }
}

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback notified after each dispatch.
pub type Listener = Box<dyn FnMut(&AppState)>;

/// Single owner of the [`AppState`]; every change goes through
/// [`Store::dispatch`].
pub struct Store {
    state: AppState,
    validator: Box<dyn Validator>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
    validate_on_init: bool,
    validate_on_change: bool,
}

impl Store {
    /// Store over `state`, validating with `validator` as `config` asks.
    pub fn new(state: AppState, validator: impl Validator + 'static, config: &FormsConfig) -> Self {
        Self {
            state,
            validator: Box::new(validator),
            listeners: Vec::new(),
            next_id: 0,
            validate_on_init: config.validate_on_init,
            validate_on_change: config.validate_on_change,
        }
    }

    /// Current state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply `action`, then notify subscribers.
    pub fn dispatch(&mut self, action: Action) {
        debug!("dispatch {action:?}");
        match action {
            Action::Init {
                data,
                schema,
                uischema,
            } => {
                self.state = AppState::new(data, schema, uischema);
                if self.validate_on_init {
                    self.run_validation();
                }
            }
            Action::Update { path, updater } => {
                let old = path::get(&self.state.data, &path).cloned();
                let new = updater(old);
                path::set(&mut self.state.data, &path, new);
                if self.validate_on_change {
                    self.run_validation();
                }
            }
            Action::Validate => self.run_validation(),
        }

        for (_, listener) in &mut self.listeners {
            listener(&self.state);
        }
    }

    fn run_validation(&mut self) {
        self.state.errors = self.validator.validate(&self.state.data, &self.state.schema);
    }

    /// Call `listener` with the new state after every dispatch, in
    /// subscription order.
    pub fn subscribe(&mut self, listener: impl FnMut(&AppState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a subscriber; returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != before
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{data::state::ValidationError, validation::SchemaValidator};
    use serde_json::json;

    fn store() -> Store {
        let state = AppState::new(
            json!({ "foo": "bar" }),
            json!({ "type": "object", "properties": { "foo": { "type": "string" } } }),
            UiSchemaElement::control("#/properties/foo"),
        );
        Store::new(state, SchemaValidator::default(), &FormsConfig::default())
    }

    #[test]
    fn test_update_passes_old_value() {
        let mut store = store();
        store.dispatch(update("foo", |old| {
            assert_eq!(old, Some(json!("bar")));
            Some(json!("baz"))
        }));
        assert_eq!(store.state().data, json!({ "foo": "baz" }));
    }

    #[test]
    fn test_validate_replaces_errors() {
        let mut store = store();
        store.dispatch(update("foo", |_| Some(json!(2))));
        assert!(store.state().errors.is_empty());
        store.dispatch(validate());
        assert_eq!(
            store.state().errors,
            vec![ValidationError::new("foo", "should be string")]
        );
        store.dispatch(update("foo", |_| Some(json!("bar"))));
        store.dispatch(validate());
        assert!(store.state().errors.is_empty());
    }

    #[test]
    fn test_subscribers_see_each_dispatch_in_order() {
        let mut store = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = store.subscribe(move |state| sink.borrow_mut().push(state.data["foo"].clone()));

        store.dispatch(update("foo", |_| Some(json!("a"))));
        store.dispatch(update("foo", |_| Some(json!("b"))));
        assert!(store.unsubscribe(id));
        store.dispatch(update("foo", |_| Some(json!("c"))));

        assert_eq!(*seen.borrow(), vec![json!("a"), json!("b")]);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_validate_on_change() {
        let config = FormsConfig {
            validate_on_change: true,
            ..Default::default()
        };
        let state = AppState::new(
            json!({}),
            json!({ "type": "object", "properties": { "n": { "type": "integer" } } }),
            UiSchemaElement::control("#/properties/n"),
        );
        let mut store = Store::new(state, SchemaValidator::default(), &config);
        store.dispatch(update("n", |_| Some(json!("x"))));
        assert_eq!(store.state().errors.len(), 1);
    }
}
