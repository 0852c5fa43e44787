//! Framework errors
//!
//! Failures of the framework itself: dispatch by type name and access to
//! dynamic values. Remote or provider-specific failures travel as
//! diagnostics instead.

#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("unknown resource type {0}")]
    ResourceNotFound(String),

    #[error("unknown data source type {0}")]
    DataSourceNotFound(String),

    /// A resource or data source was requested before configure succeeded
    #[error("provider is not configured")]
    ProviderNotConfigured,

    #[error("attribute {0} is not set")]
    AttributeNotFound(String),

    #[error("attribute has type {actual}, expected {expected}")]
    TypeMismatch { expected: String, actual: String },

    #[error("invalid attribute path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, TfplugError>;
