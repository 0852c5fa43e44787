//! tfplug - Terraform Plugin Framework for Rust
//!
//! The in-process half of a Terraform provider: the value model shared with
//! the host, schema builders, and the traits a provider implements so the
//! host can dispatch create/read/update/delete/import calls by type name.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod import;
pub mod validator;

// Re-exports for convenience
pub use context::Context;
pub use data_source::DataSource;
pub use error::{Result, TfplugError};
pub use import::import_state_passthrough_id;
pub use provider::Provider;
pub use resource::Resource;
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{AttributePath, Config, Diagnostic, DiagnosticSeverity, Dynamic, DynamicValue, State};
