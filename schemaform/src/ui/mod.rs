//! Terminal front-end: maps rendered [`WidgetNode`] trees onto cursive views.
//!
//! Widget ids become view names, so a refresh after an event only touches
//! the error lines and visibility of the controls it names. When the set
//! of widgets or their enablement changes the layer is rebuilt.

use cursive::{
    Cursive, View,
    traits::{Nameable, Resizable, Scrollable},
    view::IntoBoxedView,
    views::{
        BoxedView, Button, Checkbox, DummyView, EditView, HideableView, LinearLayout, Panel,
        SelectView, TextView,
    },
};
use serde_json::Value;

use crate::{
    data::path::part_id,
    form::Form,
    render::{WidgetEvent, WidgetNode},
};

/// Name of the layer holding the form.
pub const FORM_LAYER: &str = "schemaform";

/// Cursive user data of the editor.
pub struct EditorData {
    pub form: Form,
    pub title: String,
    /// Set when the user asked to save on exit.
    pub needs_save: bool,
    /// `id:disabled` of every widget in the last render, in document order.
    widget_ids: Vec<String>,
}

impl EditorData {
    /// Editor state for `form`, shown under `title`.
    pub fn new(form: Form, title: impl Into<String>) -> Self {
        Self {
            form,
            title: title.into(),
            needs_save: false,
            widget_ids: Vec::new(),
        }
    }

    /// Render, remembering which widgets exist and whether they are enabled.
    fn render(&mut self) -> WidgetNode {
        let tree = self.form.render();
        self.widget_ids = tree
            .descendants()
            .into_iter()
            .filter_map(|node| {
                let id = node.id.as_ref()?;
                Some(format!("{id}:{}", node.disabled))
            })
            .collect();
        tree
    }
}

fn frame_name(id: &str) -> String {
    part_id(id, "frame")
}

fn errors_name(id: &str) -> String {
    part_id(id, "errors")
}

/// Build the form layer from a freshly rendered tree.
pub fn form_view(title: &str, tree: &WidgetNode) -> impl View + use<> {
    Panel::new(BoxedView::new(build(tree)).scrollable())
        .title(title)
        .full_screen()
        .with_name(FORM_LAYER)
}

/// Render the form held in user data and show it as the only layer.
pub fn show_form(siv: &mut Cursive) {
    let Some((title, tree)) = siv.with_user_data(|app: &mut EditorData| {
        let tree = app.render();
        (app.title.clone(), tree)
    }) else {
        return;
    };
    while siv.pop_layer().is_some() {}
    siv.add_fullscreen_layer(form_view(&title, &tree));
    if let Some(id) = tree.focused_node().and_then(|node| node.id.clone()) {
        let _ = siv.focus_name(&id);
    }
}

/// Route an event to the form, then bring the views up to date.
fn emit(siv: &mut Cursive, id: &str, event: WidgetEvent) {
    let outcome = siv.with_user_data(|app: &mut EditorData| {
        let before = app.widget_ids.clone();
        let result = app.form.handle_event(id, event);
        if matches!(result, Ok(true)) && !app.form.config().validate_on_change {
            app.form.validate();
        }
        let tree = app.render();
        (result, before != app.widget_ids, tree)
    });
    let Some((result, structure_changed, tree)) = outcome else {
        return;
    };
    if let Err(e) = result {
        warn!("{e}");
        return;
    }
    if structure_changed {
        show_form(siv);
        let _ = siv.focus_name(id);
    } else {
        refresh(siv, &tree);
    }
}

/// Update error lines and visibility of every control in `tree`.
fn refresh(siv: &mut Cursive, tree: &WidgetNode) {
    for control in tree.find_all_by_class("control") {
        let Some(id) = control_id(control) else {
            continue;
        };
        let errors = control
            .find_by_class("validation")
            .map(WidgetNode::text_content)
            .unwrap_or_default();
        siv.call_on_name(&errors_name(&id), |view: &mut TextView| {
            view.set_content(errors)
        });
        let visible = !control.hidden;
        siv.call_on_name(&frame_name(&id), |view: &mut HideableView<LinearLayout>| {
            view.set_visible(visible)
        });
    }
}

fn control_id(control: &WidgetNode) -> Option<String> {
    control
        .find_by_tag("label")
        .and_then(|label| label.attr("for"))
        .map(str::to_string)
}

fn build(node: &WidgetNode) -> Box<dyn View> {
    if node.has_class("control") {
        return build_control(node);
    }
    match node.tag.as_str() {
        "fieldset" => {
            let title = node
                .find_by_tag("legend")
                .map(WidgetNode::text_content)
                .unwrap_or_default();
            let inner = children_layout(node, LinearLayout::vertical());
            let panel = Panel::new(inner).title(title);
            HideableView::new(panel).visible(!node.hidden).into_boxed_view()
        }
        "legend" => DummyView.into_boxed_view(),
        _ if node.has_class("horizontal-layout") => {
            let inner = children_layout(node, LinearLayout::horizontal());
            HideableView::new(inner).visible(!node.hidden).into_boxed_view()
        }
        _ => {
            let inner = children_layout(node, LinearLayout::vertical());
            HideableView::new(inner).visible(!node.hidden).into_boxed_view()
        }
    }
}

fn children_layout(node: &WidgetNode, mut layout: LinearLayout) -> LinearLayout {
    for child in &node.children {
        layout.add_child(build(child));
    }
    layout
}

fn build_control(node: &WidgetNode) -> Box<dyn View> {
    let id = control_id(node).unwrap_or_default();
    let mut layout = LinearLayout::vertical();
    for child in &node.children {
        match child.tag.as_str() {
            "label" => layout.add_child(TextView::new(child.text_content())),
            _ if child.has_class("validation") => {
                layout.add_child(TextView::new(child.text_content()).with_name(errors_name(&id)))
            }
            _ if child.has_class("array-items") => {
                for item in &child.children {
                    layout.add_child(build_array_item(item));
                }
            }
            _ => layout.add_child(build_widget(child)),
        }
    }
    layout.add_child(DummyView);
    HideableView::new(layout)
        .visible(!node.hidden)
        .with_name(frame_name(&id))
        .into_boxed_view()
}

fn build_array_item(item: &WidgetNode) -> Box<dyn View> {
    let mut row = LinearLayout::horizontal();
    for child in &item.children {
        match child.tag.as_str() {
            "button" => row.add_child(build_widget(child)),
            _ => row.add_child(build(child)),
        }
    }
    Panel::new(row).into_boxed_view()
}

fn build_widget(node: &WidgetNode) -> Box<dyn View> {
    let id = node.id.clone().unwrap_or_default();
    let enabled = !node.disabled;
    match (node.tag.as_str(), node.attr("type")) {
        ("input", Some("checkbox")) => {
            let target = id.clone();
            Checkbox::new()
                .with_checked(node.attr("checked").is_some())
                .on_change(move |siv, checked| {
                    emit(siv, &target, WidgetEvent::Change(Value::Bool(checked)))
                })
                .with_enabled(enabled)
                .with_name(id)
                .into_boxed_view()
        }
        ("input", _) => {
            let target = id.clone();
            EditView::new()
                .content(node.attr("value").unwrap_or_default())
                .on_edit(move |siv, text, _cursor| {
                    emit(siv, &target, WidgetEvent::Change(Value::String(text.to_string())))
                })
                .with_enabled(enabled)
                .with_name(id)
                .min_width(20)
                .into_boxed_view()
        }
        ("select", _) => {
            let target = id.clone();
            let mut select = SelectView::<String>::new().popup();
            let mut selected = 0;
            for (idx, option) in node.children.iter().enumerate() {
                let value = option.attr("value").unwrap_or_default().to_string();
                let text = if value.is_empty() {
                    "-".to_string()
                } else {
                    option.text_content()
                };
                if option.attr("selected").is_some() {
                    selected = idx;
                }
                select.add_item(text, value);
            }
            select
                .selected(selected)
                .on_submit(move |siv, value: &String| {
                    emit(siv, &target, WidgetEvent::Change(Value::String(value.clone())))
                })
                .with_enabled(enabled)
                .with_name(id)
                .into_boxed_view()
        }
        ("button", _) => {
            let target = id.clone();
            Button::new(node.text_content(), move |siv| {
                emit(siv, &target, WidgetEvent::Click)
            })
            .with_enabled(enabled)
            .with_name(id)
            .into_boxed_view()
        }
        _ => TextView::new(node.text_content()).into_boxed_view(),
    }
}

/// Leave the editor, dropping changes.
pub fn handle_quit(siv: &mut Cursive) {
    siv.quit();
}

/// Mark the data for saving and leave the editor.
pub fn handle_save(siv: &mut Cursive) {
    siv.with_user_data(|app: &mut EditorData| app.needs_save = true);
    siv.quit();
}

#[cfg(test)]
mod tests {
    use super::*;
    use cursive::views::{ResizedView, ScrollView};
    use serde_json::json;

    fn editor() -> Cursive {
        let schema = json!({
            "type": "object",
            "properties": { "count": { "type": "integer" } }
        });
        let form = Form::from_json(json!({ "count": 1 }), schema, None).unwrap();
        let mut siv = Cursive::new();
        siv.set_user_data(EditorData::new(form, "test"));
        show_form(&mut siv);
        siv
    }

    fn errors(siv: &mut Cursive, id: &str) -> String {
        siv.call_on_name(&errors_name(id), |view: &mut TextView| {
            view.get_content().source().to_string()
        })
        .unwrap()
    }

    #[test]
    fn test_widgets_are_named_after_ids() {
        let mut siv = editor();
        assert!(siv.find_name::<EditView>("control-count").is_some());
        assert_eq!(errors(&mut siv, "control-count"), "");
    }

    #[test]
    fn test_form_layer_is_scrollable() {
        let mut siv = editor();
        assert!(
            siv.call_on_name(FORM_LAYER, |_: &mut ResizedView<Panel<ScrollView<BoxedView>>>| ())
                .is_some()
        );
    }

    #[test]
    fn test_edit_revalidates_and_refreshes_errors() {
        let mut siv = editor();
        emit(&mut siv, "control-count", WidgetEvent::Change(json!("abc")));
        assert_eq!(errors(&mut siv, "control-count"), "should be integer");

        let data = siv
            .with_user_data(|app: &mut EditorData| app.form.data().clone())
            .unwrap();
        assert_eq!(data, json!({ "count": "abc" }));
    }
}
