//! # schemaform
//!
//! A schema-driven form engine. Given a JSON Schema describing the data, a
//! UI schema describing the layout, and a data instance, it picks a renderer
//! for every UI schema element, binds each control to its slice of the data
//! and projects validation errors back onto the controls that own them.
//!
//! ## Features
//!
//! - Ranked renderer registry with composable testers
//! - Built-in input, boolean, enum and array controls plus horizontal,
//!   vertical and group layouts
//! - Single central store with synchronous dispatch and subscriptions
//! - JSON Schema validation via [`jsonschema`], mapped onto data paths
//! - Visibility and enablement rules on any element
//! - Terminal editor built with [Cursive](https://github.com/gyscos/cursive)
//! - TOML and JSON data files, with a timestamped backup on save
//!
//! ## Quick Start
//!
//! ```rust
//! use schemaform::Form;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": { "foo": { "type": "string" } }
//! });
//! let mut form = Form::from_json(json!({ "foo": 3 }), schema, None).unwrap();
//! let tree = form.render();
//! let control = tree.find_by_class("root_properties_foo").unwrap();
//! assert_eq!(control.find_by_class("validation").unwrap().text_content(), "should be string");
//! ```
//!
//! ## Modules
//!
//! - [`data`] - schemas, UI schemas, data paths and the application state
//! - [`store`] - actions and the central store
//! - [`validation`] - validator bridge
//! - [`tester`] / [`registry`] - renderer selection
//! - [`render`] - renderers and the widget tree they produce
//! - [`form`] - a complete form session
//! - [`ui`] / [`run`] - terminal front-end

#[macro_use]
extern crate log;

/// Session configuration.
pub mod config;

/// Schemas, UI schemas, data paths and the application state.
pub mod data;

/// Error types.
pub mod error;

/// Form session tying store, registry and renderers together.
pub mod form;

/// UI schema and JSON Schema generators.
pub mod generate;

/// Registry of ranked renderers.
pub mod registry;

/// Renderers and the widget tree.
pub mod render;

/// Terminal editor entry points.
pub mod run;

/// Central store and actions.
pub mod store;

/// Applicability testers and their combinators.
pub mod tester;

/// Cursive views for rendered forms.
pub mod ui;

/// Validator bridge.
pub mod validation;

pub use config::FormsConfig;
pub use data::{AppState, FormDocument, UiSchemaElement, ValidationError};
pub use error::{FormError, SchemaError};
pub use form::Form;
pub use registry::{RendererHandle, RendererRegistry};
pub use render::{Renderer, WidgetEvent, WidgetNode};
pub use run::{edit, run};
pub use serde_json::Value;
