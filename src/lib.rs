//! Derive JSON Schema documents from Rust types.
//!
//! A type describes its own shape through [`Reflect`] (usually via
//! `#[derive(Reflect)]`); [`Document::read`] walks that description and
//! overlays the per-field annotations, and `Display` renders the result.
//!
//! ```
//! use json_typeschema::Document;
//!
//! let mut doc = Document::new();
//! doc.read(&true).unwrap();
//! assert_eq!(
//!     doc.to_string(),
//!     "{\n    \"$schema\": \"http://json-schema.org/schema#\",\n    \"type\": \"boolean\"\n}"
//! );
//! ```
pub mod annotation;
pub mod document;
pub mod error;
pub mod node;
pub mod reflect;
pub mod settings;
mod walker;

pub use annotation::{Annotations, Constraints, TagKey};
pub use document::{schema_for, Document, SCHEMA_ID};
pub use error::{Result, SchemaError};
pub use node::{AdditionalProperties, Bound, Bounds, Kind, ObjectRules, SchemaNode, StringRules};
pub use reflect::{FieldInfo, Reflect, Scalar, StructInfo, TypeInfo, TypeRef};
pub use settings::{MapStyle, Settings};

#[cfg(feature = "derive")]
pub use json_typeschema_derive::Reflect;
