use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::{Context, bail};
use serde_json::Value;

use crate::{data::uischema::UiSchemaElement, generate::default_uischema};

/// A form loaded from disk: schema, UI schema and the data being edited.
#[derive(Debug, Clone)]
pub struct FormDocument {
    pub schema: Value,
    pub uischema: UiSchemaElement,
    pub data: Value,
    /// Where [`FormDocument::save`] writes the data.
    pub data_path: Option<PathBuf>,
}

/// Derive a schema path from a data path: `config.toml` -> `config-schema.json`.
pub fn default_schema_path(data: &Path) -> PathBuf {
    sibling_with_suffix(data, "schema")
}

/// Derive a UI schema path from a data path: `config.toml` -> `config-uischema.json`.
pub fn default_uischema_path(data: &Path) -> PathBuf {
    sibling_with_suffix(data, "uischema")
}

fn sibling_with_suffix(data: &Path, suffix: &str) -> PathBuf {
    let stem = data
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{stem}-{suffix}.json");
    match data.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|s| s.to_str()).unwrap_or("")
}

/// Parse `content` as JSON or TOML, picked by `path`'s extension.
pub fn parse_value(content: &str, path: &Path) -> anyhow::Result<Value> {
    let value = match extension(path) {
        "json" => serde_json::from_str(content)?,
        "toml" | "tml" => {
            let v: toml::Value = toml::from_str(content)?;
            serde_json::to_value(v)?
        }
        ext => bail!("Unsupported file extension: {ext:?}"),
    };
    Ok(value)
}

/// Serialize `value` as JSON or TOML, picked by `path`'s extension.
pub fn format_value(value: &Value, path: &Path) -> anyhow::Result<String> {
    let s = match extension(path) {
        "json" => serde_json::to_string_pretty(value)?,
        "toml" | "tml" => toml::to_string_pretty(value)?,
        ext => bail!("Unsupported file extension: {ext:?}"),
    };
    Ok(s)
}

/// Read a JSON or TOML file.
pub fn read_value(path: &Path) -> anyhow::Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_value(&content, path).with_context(|| format!("Failed to parse {}", path.display()))
}

impl FormDocument {
    /// Load a form.
    ///
    /// Without a UI schema path the default UI schema of the schema is used.
    /// A missing or empty data file starts the form with `{}`.
    pub fn load(
        schema: impl AsRef<Path>,
        uischema: Option<impl AsRef<Path>>,
        data: Option<impl AsRef<Path>>,
    ) -> anyhow::Result<Self> {
        let schema_path = schema.as_ref();
        if !schema_path.exists() {
            bail!("Schema file does not exist: {}", schema_path.display());
        }
        let schema = read_value(schema_path)?;

        let uischema = match uischema {
            Some(path) => {
                let raw = read_value(path.as_ref())?;
                UiSchemaElement::parse(&raw)
                    .with_context(|| format!("Invalid UI schema {}", path.as_ref().display()))?
            }
            None => default_uischema(&schema),
        };

        let data_path = data.map(|p| p.as_ref().to_path_buf());
        let data = match &data_path {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                if content.trim().is_empty() {
                    Value::Object(Default::default())
                } else {
                    parse_value(&content, path)
                        .with_context(|| format!("Failed to parse {}", path.display()))?
                }
            }
            _ => Value::Object(Default::default()),
        };

        debug!(
            "loaded form: schema {}, data {:?}",
            schema_path.display(),
            data_path
        );
        Ok(Self {
            schema,
            uischema,
            data,
            data_path,
        })
    }

    /// Write `data` to the data file, keeping a timestamped backup of the
    /// previous content.
    pub fn save(&self, data: &Value) -> anyhow::Result<()> {
        let Some(path) = &self.data_path else {
            bail!("Form has no data file to save to");
        };
        let content = format_value(data, path)?;

        if path.exists() {
            let ext = extension(path);
            let bk = format!(
                "bk-{}.{ext}",
                SystemTime::now()
                    .duration_since(SystemTime::UNIX_EPOCH)?
                    .as_secs()
            );
            let backup_path = path.with_extension(bk);
            fs::copy(path, &backup_path)
                .with_context(|| format!("Failed to back up {}", path.display()))?;
            info!("backed up {} to {}", path.display(), backup_path.display());
        }
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derived_paths() {
        assert_eq!(
            default_schema_path(Path::new("config.toml")),
            PathBuf::from("config-schema.json")
        );
        assert_eq!(
            default_uischema_path(Path::new("dir/app.json")),
            PathBuf::from("dir/app-uischema.json")
        );
    }

    #[test]
    fn test_parse_value_by_extension() {
        let toml = parse_value("name = \"a\"\ncount = 2", Path::new("x.toml")).unwrap();
        assert_eq!(toml, json!({ "name": "a", "count": 2 }));
        assert!(parse_value("{}", Path::new("x.yaml")).is_err());
    }

    #[test]
    fn test_load_and_save_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("form-schema.json");
        let data_path = dir.path().join("form.json");
        fs::write(
            &schema_path,
            r#"{ "type": "object", "properties": { "name": { "type": "string" } } }"#,
        )
        .unwrap();
        fs::write(&data_path, r#"{ "name": "old" }"#).unwrap();

        let doc = FormDocument::load(&schema_path, None::<&Path>, Some(&data_path)).unwrap();
        assert_eq!(doc.data, json!({ "name": "old" }));
        assert_eq!(doc.uischema.type_name(), "VerticalLayout");

        doc.save(&json!({ "name": "new" })).unwrap();
        assert_eq!(read_value(&data_path).unwrap(), json!({ "name": "new" }));
        let backups = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".bk-"))
            .count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_missing_data_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("s.json");
        fs::write(&schema_path, r#"{ "type": "object" }"#).unwrap();
        let doc =
            FormDocument::load(&schema_path, None::<&Path>, Some(dir.path().join("d.toml")))
                .unwrap();
        assert_eq!(doc.data, json!({}));
    }
}
