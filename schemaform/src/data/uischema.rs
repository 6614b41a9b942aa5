use serde_json::{Map, Value, json};

use crate::error::{SchemaError, json_type_name};

/// Node of a UI schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum UiSchemaElement {
    /// Value-bound widget for one scope.
    Control(ControlElement),
    /// Container rendering its children in order.
    Layout(LayoutElement),
    /// Element with a `type` no built-in renderer knows; custom renderers
    /// may still claim it.
    Custom(CustomElement),
}

/// `Control` element.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlElement {
    /// Schema reference such as `#/properties/foo`.
    pub scope: String,
    pub label: Label,
    pub options: Map<String, Value>,
    pub rule: Option<Rule>,
}

/// Label override carried by a control.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Label {
    /// Derived from the property name.
    #[default]
    Default,
    Text(String),
    /// `label: false`.
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Horizontal,
    Vertical,
    Group,
}

impl LayoutKind {
    /// The `type` tag of this layout in UI schema JSON.
    pub fn tag(self) -> &'static str {
        match self {
            LayoutKind::Horizontal => "HorizontalLayout",
            LayoutKind::Vertical => "VerticalLayout",
            LayoutKind::Group => "Group",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "HorizontalLayout" => Some(LayoutKind::Horizontal),
            "VerticalLayout" => Some(LayoutKind::Vertical),
            "Group" => Some(LayoutKind::Group),
            _ => None,
        }
    }
}

/// `HorizontalLayout`, `VerticalLayout` or `Group`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutElement {
    pub kind: LayoutKind,
    pub elements: Vec<UiSchemaElement>,
    pub label: Option<String>,
    pub options: Map<String, Value>,
    pub rule: Option<Rule>,
}

/// Element of any other `type`, drawn only by renderers registered for it.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomElement {
    pub kind: String,
    pub options: Map<String, Value>,
    pub rule: Option<Rule>,
}

/// Data-driven visibility or enablement.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub effect: RuleEffect,
    pub condition: Condition,
}

/// What a rule does when its condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleEffect {
    Hide,
    Show,
    Enable,
    Disable,
}

/// Leaf condition: the value at `scope` equals `expected`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub scope: String,
    pub expected: Value,
}

impl UiSchemaElement {
    /// The `type` tag of the element.
    pub fn type_name(&self) -> &str {
        match self {
            UiSchemaElement::Control(_) => "Control",
            UiSchemaElement::Layout(layout) => layout.kind.tag(),
            UiSchemaElement::Custom(custom) => &custom.kind,
        }
    }

    /// Rule of a control or layout.
    pub fn rule(&self) -> Option<&Rule> {
        match self {
            UiSchemaElement::Control(c) => c.rule.as_ref(),
            UiSchemaElement::Layout(l) => l.rule.as_ref(),
            UiSchemaElement::Custom(c) => c.rule.as_ref(),
        }
    }

    /// The element's `options` object, empty when absent.
    pub fn options(&self) -> &Map<String, Value> {
        match self {
            UiSchemaElement::Control(c) => &c.options,
            UiSchemaElement::Layout(l) => &l.options,
            UiSchemaElement::Custom(c) => &c.options,
        }
    }

    /// The control, when this element is one.
    pub fn as_control(&self) -> Option<&ControlElement> {
        match self {
            UiSchemaElement::Control(c) => Some(c),
            _ => None,
        }
    }

    /// The layout, when this element is one.
    pub fn as_layout(&self) -> Option<&LayoutElement> {
        match self {
            UiSchemaElement::Layout(l) => Some(l),
            _ => None,
        }
    }

    /// Build a control for `scope` with no label override or options.
    pub fn control(scope: impl Into<String>) -> Self {
        UiSchemaElement::Control(ControlElement {
            scope: scope.into(),
            label: Label::Default,
            options: Map::new(),
            rule: None,
        })
    }

    /// Build a layout of the given kind.
    pub fn layout(kind: LayoutKind, elements: Vec<UiSchemaElement>) -> Self {
        UiSchemaElement::Layout(LayoutElement {
            kind,
            elements,
            label: None,
            options: Map::new(),
            rule: None,
        })
    }

    /// Parse a UI schema tree, failing on the first malformed element.
    pub fn parse(value: &Value) -> Result<Self, SchemaError> {
        parse_element(value, "#")
    }

    /// Serialize back to UI schema JSON.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".into(), Value::String(self.type_name().to_string()));
        match self {
            UiSchemaElement::Control(c) => {
                obj.insert("scope".into(), Value::String(c.scope.clone()));
                match &c.label {
                    Label::Default => {}
                    Label::Text(text) => {
                        obj.insert("label".into(), Value::String(text.clone()));
                    }
                    Label::Hidden => {
                        obj.insert("label".into(), Value::Bool(false));
                    }
                }
            }
            UiSchemaElement::Layout(l) => {
                if let Some(label) = &l.label {
                    obj.insert("label".into(), Value::String(label.clone()));
                }
                obj.insert(
                    "elements".into(),
                    Value::Array(l.elements.iter().map(UiSchemaElement::to_json).collect()),
                );
            }
            UiSchemaElement::Custom(_) => {}
        }
        if !self.options().is_empty() {
            obj.insert("options".into(), Value::Object(self.options().clone()));
        }
        if let Some(rule) = self.rule() {
            let effect = match rule.effect {
                RuleEffect::Hide => "HIDE",
                RuleEffect::Show => "SHOW",
                RuleEffect::Enable => "ENABLE",
                RuleEffect::Disable => "DISABLE",
            };
            obj.insert(
                "rule".into(),
                json!({
                    "effect": effect,
                    "condition": {
                        "type": "LEAF",
                        "scope": rule.condition.scope,
                        "expectedValue": rule.condition.expected,
                    }
                }),
            );
        }
        Value::Object(obj)
    }
}

impl TryFrom<&Value> for UiSchemaElement {
    type Error = SchemaError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        UiSchemaElement::parse(value)
    }
}

fn mismatch(pointer: &str, field: &str, expected: &str, actual: &Value) -> SchemaError {
    SchemaError::TypeMismatch {
        pointer: pointer.to_string(),
        field: field.to_string(),
        expected: expected.to_string(),
        actual: json_type_name(actual).to_string(),
    }
}

/// Scopes are either `"#/properties/foo"` or `{ "$ref": "#/properties/foo" }`.
fn parse_scope(value: &Value, pointer: &str, field: &str) -> Result<String, SchemaError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Object(obj) => match obj.get("$ref") {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(mismatch(pointer, "$ref", "string", other)),
            None => Err(SchemaError::MissingField {
                pointer: pointer.to_string(),
                element: field.to_string(),
                field: "$ref",
            }),
        },
        other => Err(mismatch(pointer, field, "string or {\"$ref\": string}", other)),
    }
}

fn parse_options(obj: &Map<String, Value>, pointer: &str) -> Result<Map<String, Value>, SchemaError> {
    match obj.get("options") {
        None => Ok(Map::new()),
        Some(Value::Object(options)) => Ok(options.clone()),
        Some(other) => Err(mismatch(pointer, "options", "object", other)),
    }
}

fn parse_rule(obj: &Map<String, Value>, pointer: &str) -> Result<Option<Rule>, SchemaError> {
    let Some(rule) = obj.get("rule") else {
        return Ok(None);
    };
    let pointer = format!("{pointer}/rule");
    let rule = rule
        .as_object()
        .ok_or_else(|| mismatch(&pointer, "rule", "object", rule))?;

    let effect = match rule.get("effect") {
        Some(Value::String(effect)) => match effect.to_ascii_uppercase().as_str() {
            "HIDE" => RuleEffect::Hide,
            "SHOW" => RuleEffect::Show,
            "ENABLE" => RuleEffect::Enable,
            "DISABLE" => RuleEffect::Disable,
            _ => {
                return Err(SchemaError::UnknownEffect {
                    pointer,
                    effect: effect.clone(),
                });
            }
        },
        Some(other) => return Err(mismatch(&pointer, "effect", "string", other)),
        None => {
            return Err(SchemaError::MissingField {
                pointer,
                element: "rule".into(),
                field: "effect",
            });
        }
    };

    let condition = rule.get("condition").ok_or_else(|| SchemaError::MissingField {
        pointer: pointer.clone(),
        element: "rule".into(),
        field: "condition",
    })?;
    let cond_pointer = format!("{pointer}/condition");
    let condition = condition
        .as_object()
        .ok_or_else(|| mismatch(&cond_pointer, "condition", "object", condition))?;
    let scope = condition
        .get("scope")
        .ok_or_else(|| SchemaError::MissingField {
            pointer: cond_pointer.clone(),
            element: "condition".into(),
            field: "scope",
        })
        .and_then(|scope| parse_scope(scope, &cond_pointer, "scope"))?;
    let expected = condition
        .get("expectedValue")
        .cloned()
        .unwrap_or(Value::Null);

    Ok(Some(Rule {
        effect,
        condition: Condition { scope, expected },
    }))
}

fn parse_element(value: &Value, pointer: &str) -> Result<UiSchemaElement, SchemaError> {
    let obj = value
        .as_object()
        .ok_or_else(|| mismatch(pointer, "element", "object", value))?;

    let kind = match obj.get("type") {
        Some(Value::String(kind)) => kind.as_str(),
        Some(other) => return Err(mismatch(pointer, "type", "string", other)),
        None => {
            return Err(SchemaError::MissingField {
                pointer: pointer.to_string(),
                element: "<untyped>".into(),
                field: "type",
            });
        }
    };
    let options = parse_options(obj, pointer)?;
    let rule = parse_rule(obj, pointer)?;

    if kind == "Control" {
        let scope = obj.get("scope").ok_or_else(|| SchemaError::MissingField {
            pointer: pointer.to_string(),
            element: kind.to_string(),
            field: "scope",
        })?;
        let scope = parse_scope(scope, pointer, "scope")?;
        let label = match obj.get("label") {
            None | Some(Value::Bool(true)) | Some(Value::Null) => Label::Default,
            Some(Value::Bool(false)) => Label::Hidden,
            Some(Value::String(text)) => Label::Text(text.clone()),
            Some(other) => return Err(mismatch(pointer, "label", "string or boolean", other)),
        };
        return Ok(UiSchemaElement::Control(ControlElement {
            scope,
            label,
            options,
            rule,
        }));
    }

    if let Some(layout_kind) = LayoutKind::from_tag(kind) {
        let elements = match obj.get("elements") {
            Some(Value::Array(children)) => children
                .iter()
                .enumerate()
                .map(|(idx, child)| parse_element(child, &format!("{pointer}/elements/{idx}")))
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => return Err(mismatch(pointer, "elements", "array", other)),
            None => {
                return Err(SchemaError::MissingField {
                    pointer: pointer.to_string(),
                    element: kind.to_string(),
                    field: "elements",
                });
            }
        };
        let label = match obj.get("label") {
            None => None,
            Some(Value::String(label)) => Some(label.clone()),
            Some(other) => return Err(mismatch(pointer, "label", "string", other)),
        };
        return Ok(UiSchemaElement::Layout(LayoutElement {
            kind: layout_kind,
            elements,
            label,
            options,
            rule,
        }));
    }

    Ok(UiSchemaElement::Custom(CustomElement {
        kind: kind.to_string(),
        options,
        rule,
    }))
}
