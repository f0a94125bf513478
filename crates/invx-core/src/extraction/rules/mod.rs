//! Built-in extraction rules for the supported invoice layout.

pub mod builtin;
pub mod patterns;

pub use builtin::{builtin_field_configs, BUILTIN_FIELDS, DEFAULT_FIELD_ORDER};
