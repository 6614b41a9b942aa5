//! Form documents and the state they are edited through.
//!
//! - [`app_data`] - schema, UI schema and data files on disk
//! - [`path`] - scope resolution and data paths
//! - [`schema`] - read-only JSON Schema accessors
//! - [`state`] - the application state and validation records
//! - [`uischema`] - parsed UI schema elements

/// Schema, UI schema and data files on disk.
pub mod app_data;

/// Scope resolution and data path access.
pub mod path;

/// JSON Schema accessors.
pub mod schema;

/// Application state.
pub mod state;

/// UI schema element tree.
pub mod uischema;

pub use app_data::FormDocument;
pub use state::{AppState, ValidationError};
pub use uischema::UiSchemaElement;
