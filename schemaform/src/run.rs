use std::path::Path;

use anyhow::{Context, anyhow};
pub use cursive;
use cursive::{
    Cursive, CursiveExt,
    event::{Event, Key},
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::FormsConfig,
    data::app_data::{format_value, parse_value},
    form::Form,
    generate::{default_uischema, schema_for},
    registry::RendererRegistry,
    ui::{EditorData, handle_quit, handle_save, show_form},
    validation::SchemaValidator,
};

/// Edit `form` in the terminal.
///
/// Returns the edited data when the user saved, `None` when they quit.
///
/// Keys: `Ctrl-S` save and exit, `Ctrl-Q` or `Esc` quit, `~` debug console.
pub fn edit(form: Form, title: &str) -> anyhow::Result<Option<Value>> {
    #[cfg(feature = "logging")]
    {
        cursive::logger::init();
        cursive::logger::set_filter_levels_from_env();
    }
    let mut siv = Cursive::default();
    siv.set_user_data(EditorData::new(form, title));

    siv.add_global_callback(Event::CtrlChar('s'), handle_save);
    siv.add_global_callback(Event::CtrlChar('q'), handle_quit);
    siv.add_global_callback(Key::Esc, handle_quit);
    siv.add_global_callback('~', Cursive::toggle_debug_console);

    show_form(&mut siv);
    siv.run();

    let app = siv
        .take_user_data::<EditorData>()
        .ok_or_else(|| anyhow!("editor state was lost"))?;
    if !app.needs_save {
        return Ok(None);
    }
    Ok(Some(app.form.data().clone()))
}

/// Edit a typed configuration file through a generated form.
///
/// When `always_use_ui` is false and the file already parses as `C`, it is
/// returned without opening the editor. Saved edits are written back in
/// the file's own format.
pub async fn run<C: JsonSchema + DeserializeOwned>(
    config_path: impl AsRef<Path>,
    always_use_ui: bool,
    config: FormsConfig,
) -> anyhow::Result<Option<C>> {
    let config_path = config_path.as_ref();
    let schema = schema_for::<C>()?;

    let content = tokio::fs::read_to_string(config_path)
        .await
        .unwrap_or_default();

    if let Ok(c) = to_typed::<C>(&content, config_path)
        && !always_use_ui
    {
        return Ok(Some(c));
    }

    let data = if content.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        parse_value(&content, config_path)?
    };
    let title = schema
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("Configuration")
        .to_string();
    let uischema = default_uischema(&schema);
    let form = Form::with_parts(
        data,
        schema,
        uischema,
        config.clone(),
        RendererRegistry::with_defaults(),
        SchemaValidator::new(config.validate_formats),
    )?;

    let Some(val) = edit(form, &title)? else {
        return Ok(None);
    };
    let c: C = serde_json::from_value(val.clone())?;

    let content = format_value(&val, config_path)?;
    tokio::fs::write(config_path, content)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(Some(c))
}

fn to_typed<C: DeserializeOwned>(s: &str, path: &Path) -> anyhow::Result<C> {
    let value = parse_value(s, path)?;
    Ok(serde_json::from_value(value)?)
}
