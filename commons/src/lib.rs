//! commons - field registry for Terraform providers
//!
//! Every resource is described as a set of fields. Each field pairs a schema
//! fragment with three conversion callbacks: read (API object -> state),
//! create and update (config -> API object). Resources iterate their registry
//! instead of hand-writing the mapping in their CRUD functions.

// Core modules
pub mod error;
pub mod schema;
pub mod types;

// Registry and state
pub mod field;
pub mod resource;
pub mod resource_data;

// Helper modules
pub mod sentinel;
pub mod userdata;
pub mod validator;

// Re-exports for convenience
pub use error::{FieldError, Result};
pub use field::{FieldName, FieldRegistry, FieldRegistryBuilder, GenericField, ResourceType};
pub use resource::Resource;
pub use resource_data::ResourceData;
pub use schema::{Elem, Schema, SchemaBuilder, SchemaMap, ValueType};
pub use types::{AttributePath, Diagnostic, Diagnostics, Dynamic};
