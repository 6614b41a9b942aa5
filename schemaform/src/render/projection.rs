//! Per-control projection of the application state.
//!
//! Everything a control draws is recomputed from [`AppState`] and the
//! control's path on every store update; nothing is cached between
//! dispatches.

use serde_json::Value;

use crate::{
    config::FormsConfig,
    data::{
        path::{self, class_name, dom_id, rebase, resolve_path},
        state::AppState,
        uischema::{ControlElement, Label, Rule, RuleEffect},
    },
    validation::format_error_message,
};

/// Visibility and enablement inherited from enclosing layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraints {
    pub visible: bool,
    pub enabled: bool,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            visible: true,
            enabled: true,
        }
    }
}

impl Constraints {
    /// Apply an element's own rule on top of the inherited constraints.
    ///
    /// The rule's condition scope is mapped to a data path the way control
    /// scopes are, see [`rebase`].
    pub fn apply(
        self,
        rule: Option<&Rule>,
        data: &Value,
        scope_base: &str,
        base_path: &str,
    ) -> Self {
        let Some(rule) = rule else {
            return self;
        };
        let target = rebase(&rule.condition.scope, scope_base, base_path);
        let holds = path::get(data, &target) == Some(&rule.condition.expected)
            || (rule.condition.expected.is_null() && path::get(data, &target).is_none());
        let (visible, enabled) = match rule.effect {
            RuleEffect::Hide => (!holds, true),
            RuleEffect::Show => (holds, true),
            RuleEffect::Enable => (true, holds),
            RuleEffect::Disable => (true, !holds),
        };
        Self {
            visible: self.visible && visible,
            enabled: self.enabled && enabled,
        }
    }
}

/// What a control renders, derived from the state.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    /// Data path of the control.
    pub path: String,
    /// Resolved sub-schema, `None` when the scope did not resolve.
    pub schema: Option<Value>,
    /// Value at `path`; always `None` for unresolved scopes.
    pub value: Option<Value>,
    pub visible: bool,
    pub enabled: bool,
    /// Messages of errors addressed exactly to `path`, in validator order.
    pub errors: Vec<String>,
    pub label: String,
    pub required: bool,
    /// Widget id for label/input association.
    pub id: String,
    /// Scope-derived CSS class.
    pub class_name: String,
    /// `options.focus` was set on the control.
    pub wants_focus: bool,
}

impl ControlState {
    /// No error is addressed to the control.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors joined for display.
    pub fn error_text(&self, separator: &str) -> String {
        format_error_message(&self.errors, separator)
    }
}

/// Where a control sits: the scope prefix standing for `base_path`, and the
/// constraints of its enclosing layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Placement<'a> {
    pub scope_base: &'a str,
    pub base_path: &'a str,
    pub ancestors: Constraints,
}

/// Project `control` out of `state`.
pub fn project_control(
    control: &ControlElement,
    state: &AppState,
    placement: Placement<'_>,
    config: &FormsConfig,
) -> ControlState {
    let resolved = resolve_path(&control.scope, &state.schema, config.max_ref_depth);
    let path = rebase(&control.scope, placement.scope_base, placement.base_path);
    let required = resolved.is_required();

    let value = if resolved.is_resolved() {
        path::get(&state.data, &path).cloned()
    } else {
        None
    };

    let constraints = placement.ancestors.apply(
        control.rule.as_ref(),
        &state.data,
        placement.scope_base,
        placement.base_path,
    );

    let errors = state
        .errors_at(&path)
        .map(|e| e.message.clone())
        .collect();

    let label = match &control.label {
        Label::Hidden => String::new(),
        Label::Text(text) => mark_required(text.clone(), required),
        Label::Default => mark_required(
            title_case(resolved.property.as_deref().unwrap_or_default()),
            required,
        ),
    };

    ControlState {
        id: dom_id(&path),
        class_name: class_name(&control.scope),
        schema: resolved.schema.cloned(),
        value,
        visible: constraints.visible,
        enabled: constraints.enabled,
        errors,
        label,
        required,
        wants_focus: control.options.get("focus") == Some(&Value::Bool(true)),
        path,
    }
}

fn mark_required(mut label: String, required: bool) -> String {
    if required && !label.is_empty() {
        label.push('*');
    }
    label
}

/// Human-readable title of a property name.
///
/// `dateField` becomes `Date Field`, `first_name` becomes `First Name`,
/// `HTTPServer` becomes `HTTP Server`.
pub fn title_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (idx, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(prev) = current.chars().last() {
            let next = chars.get(idx + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.is_some_and(char::is_lowercase))
                || (prev.is_alphabetic() && c.is_numeric())
                || (prev.is_numeric() && c.is_alphabetic());
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
