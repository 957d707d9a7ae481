//! Error type for schema derivation.
//!
//! Derivation is total over ordinary types; the only failures are malformed
//! annotation text and type graphs that re-enter themselves.

use thiserror::Error;

use crate::annotation::TagKey;

pub type Result<T> = std::result::Result<T, SchemaError>;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// Annotation text that does not fit the grammar of its key.
    #[error("{path}: annotation `{key}` expects {expected}, got {value:?}")]
    InvalidAnnotation {
        path: String,
        key: TagKey,
        value: String,
        expected: &'static str,
    },

    #[error("{path}: invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        path: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A struct reached again while still deriving one of its own ancestors.
    #[error("{path}: unsupported recursive type `{type_name}`")]
    RecursiveType {
        type_name: &'static str,
        path: String,
    },

    #[error("{path}: type nesting exceeds the configured depth of {limit}")]
    DepthExceeded { limit: usize, path: String },
}

impl SchemaError {
    /// Location inside the derived document where the error was raised.
    pub fn path(&self) -> &str {
        match self {
            SchemaError::InvalidAnnotation { path, .. }
            | SchemaError::InvalidPattern { path, .. }
            | SchemaError::RecursiveType { path, .. }
            | SchemaError::DepthExceeded { path, .. } => path,
        }
    }
}
