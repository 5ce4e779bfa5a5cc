//! Error types for schema consolidation.
//!
//! The walker itself is permissive: nodes that are neither references nor
//! schema bodies pass through untouched. Errors are reserved for I/O around
//! option files, documents whose outer shape cannot hold a schema table, and
//! the depth guard.

use thiserror::Error;

/// Errors that can occur while consolidating a document.
#[derive(Debug, Error)]
pub enum ConsolidateError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document root, or a container on the table path, is not a mapping.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A name was registered with a body that differs from its occupant.
    #[error("schema name already bound to a different body: {0}")]
    NameConflict(String),

    /// Nesting exceeded the configured depth limit.
    #[error("nesting deeper than {limit} levels at {pointer}")]
    DepthLimitExceeded {
        /// JSON Pointer of the node that crossed the limit.
        pointer: String,
        /// Configured maximum depth.
        limit: usize,
    },
}

/// Convenience alias for results with [`ConsolidateError`].
pub type Result<T> = std::result::Result<T, ConsolidateError>;
