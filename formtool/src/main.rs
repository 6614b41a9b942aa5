use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::{LevelFilter, debug, info};
use schemaform::{
    Form, FormDocument, FormsConfig, ValidationError,
    data::app_data::{default_schema_path, default_uischema_path, parse_value},
    generate::{default_uischema, json_schema},
};

#[derive(Parser, Debug)]
#[command(version, about = "Render, validate and edit JSON Schema forms")]
struct Cli {
    /// Session configuration (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: SubCommands,
}

#[derive(Subcommand, Debug)]
enum SubCommands {
    /// Print the widget tree of a form.
    Render(FormArgs),
    /// Validate data against its schema and print errors per control.
    Validate(FormArgs),
    /// Print the default UI schema generated from a schema.
    Uischema {
        schema: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Infer a JSON Schema from a data file.
    Schema {
        data: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Edit a data file in the terminal.
    Edit(FormArgs),
}

#[derive(Args, Debug)]
struct FormArgs {
    /// Data file (.json or .toml).
    data: PathBuf,
    /// Schema file; defaults to `<data>-schema.json`.
    #[arg(short, long)]
    schema: Option<PathBuf>,
    /// UI schema file; defaults to `<data>-uischema.json` when present,
    /// otherwise a generated one.
    #[arg(short, long)]
    uischema: Option<PathBuf>,
}

impl FormArgs {
    fn load(&self) -> anyhow::Result<FormDocument> {
        let schema = self
            .schema
            .clone()
            .unwrap_or_else(|| default_schema_path(&self.data));
        let uischema = self.uischema.clone().or_else(|| {
            let derived = default_uischema_path(&self.data);
            derived.exists().then_some(derived)
        });
        debug!("schema {}, uischema {:?}", schema.display(), uischema);
        FormDocument::load(&schema, uischema.as_ref(), Some(&self.data))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match cli.verbose {
        0 => {}
        1 => {
            logger.filter_level(LevelFilter::Debug);
        }
        _ => {
            logger.filter_level(LevelFilter::Trace);
        }
    }
    logger.format_timestamp(None).init();

    let config = match &cli.config {
        Some(path) => FormsConfig::load(path)?,
        None => FormsConfig::default(),
    };

    match cli.command {
        SubCommands::Render(args) => {
            let mut form = Form::from_document(args.load()?, config)?;
            println!("{}", form.render());
        }
        SubCommands::Validate(args) => {
            let mut config = config;
            config.validate_on_init = true;
            let form = Form::from_document(args.load()?, config)?;
            report(&form)?;
        }
        SubCommands::Uischema { schema, output } => {
            let schema = read_file(&schema).await?;
            let ui = default_uischema(&schema).to_json();
            emit(&serde_json::to_string_pretty(&ui)?, output.as_deref()).await?;
        }
        SubCommands::Schema { data, output } => {
            let data = read_file(&data).await?;
            let schema = json_schema(&data);
            emit(&serde_json::to_string_pretty(&schema)?, output.as_deref()).await?;
        }
        SubCommands::Edit(args) => {
            let document = args.load()?;
            let title = args
                .data
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "form".into());
            let form = Form::from_document(document.clone(), config)?;
            match schemaform::edit(form, &title)? {
                Some(data) => {
                    document.save(&data)?;
                    println!("{}", format!("Saved {}", args.data.display()).green());
                }
                None => println!("{}", "No changes saved".yellow()),
            }
        }
    }
    Ok(())
}

async fn read_file(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_value(&content, path).with_context(|| format!("Failed to parse {}", path.display()))
}

async fn emit(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(path, content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

fn report(form: &Form) -> anyhow::Result<()> {
    let separator = &form.config().error_separator;
    let controls = form.controls();
    let mut failed = 0;
    for control in &controls {
        let name = if control.path.is_empty() {
            "(root)".to_string()
        } else {
            control.path.clone()
        };
        if control.is_valid() {
            println!("{} {}", "ok".green(), name);
        } else {
            failed += 1;
            println!("{} {}: {}", "error".red().bold(), name, control.error_text(separator));
        }
    }

    let unowned: Vec<&ValidationError> = form
        .errors()
        .iter()
        .filter(|e| !controls.iter().any(|c| c.path == e.data_path))
        .collect();
    for error in &unowned {
        println!("{} {}: {}", "error".red().bold(), error.data_path, error.message);
    }

    if failed > 0 || !unowned.is_empty() {
        bail!("{} validation error(s)", form.errors().len());
    }
    println!("{}", "valid".green().bold());
    Ok(())
}
