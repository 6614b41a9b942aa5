use std::{collections::BTreeMap, fmt};

/// Framework-neutral rendered node.
///
/// Renderers emit these trees; front-ends (the cursive UI, the CLI printer,
/// tests) interpret them. Hidden nodes stay in the tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WidgetNode {
    /// Element kind, named after its HTML counterpart (`input`, `select`, `div`...).
    pub tag: String,
    /// Widget id; set on widgets that take events.
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
    pub hidden: bool,
    pub disabled: bool,
    /// Set on the one widget granted autofocus.
    pub focused: bool,
    pub children: Vec<WidgetNode>,
}

impl WidgetNode {
    /// Empty node with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set the widget id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class; empty and repeated classes are skipped.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !class.is_empty() && !self.has_class(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Set an attribute, replacing any previous value.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the node's own text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: WidgetNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append children in order.
    pub fn with_children(mut self, children: impl IntoIterator<Item = WidgetNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Mark the node hidden.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Mark the node disabled.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Mark the node focused.
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Nodes of this subtree in document order, self first.
    pub fn descendants(&self) -> Vec<&WidgetNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub fn find_all_by_class(&self, class: &str) -> Vec<&WidgetNode> {
        self.descendants()
            .into_iter()
            .filter(|n| n.has_class(class))
            .collect()
    }

    pub fn find_by_class(&self, class: &str) -> Option<&WidgetNode> {
        self.descendants().into_iter().find(|n| n.has_class(class))
    }

    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&WidgetNode> {
        self.descendants()
            .into_iter()
            .filter(|n| n.tag == tag)
            .collect()
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<&WidgetNode> {
        self.descendants().into_iter().find(|n| n.tag == tag)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&WidgetNode> {
        self.descendants()
            .into_iter()
            .find(|n| n.id.as_deref() == Some(id))
    }

    /// The focused node, if any.
    pub fn focused_node(&self) -> Option<&WidgetNode> {
        self.descendants().into_iter().find(|n| n.focused)
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        self.descendants()
            .into_iter()
            .filter_map(|n| n.text.as_deref())
            .collect()
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        write!(f, "{pad}<{}", self.tag)?;
        if let Some(id) = &self.id {
            write!(f, " id=\"{}\"", escape(id))?;
        }
        if !self.classes.is_empty() {
            write!(f, " class=\"{}\"", escape(&self.classes.join(" ")))?;
        }
        for (key, value) in &self.attributes {
            write!(f, " {key}=\"{}\"", escape(value))?;
        }
        if self.hidden {
            write!(f, " hidden")?;
        }
        if self.disabled {
            write!(f, " disabled")?;
        }
        if self.focused {
            write!(f, " autofocus")?;
        }

        let text = self.text.as_deref().unwrap_or_default();
        if self.children.is_empty() {
            return writeln!(f, ">{}</{}>", escape(text), self.tag);
        }
        writeln!(f, ">{}", escape(text))?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        writeln!(f, "{pad}</{}>", self.tag)
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl fmt::Display for WidgetNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
