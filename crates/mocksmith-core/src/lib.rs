//! Core contracts for mocksmith.
//!
//! This crate defines the template rule grammar, generation configuration,
//! the abstract type model used for introspection, and the typed result tree
//! shared by the generator and mapper crates.

pub mod config;
pub mod error;
pub mod instance;
pub mod locale;
pub mod rule;
pub mod types;

pub use config::{BeanOverrides, FieldConfig, FillStrategy, LengthSpec, MockConfig};
pub use error::{Error, Result};
pub use instance::Instance;
pub use locale::Locale;
pub use rule::{ParsedKey, Rule, RuleParser, RuleSpec};
pub use types::{
    EnumDef, OpaqueDef, PropertyDescriptor, ScalarKind, StructDef, TypeCatalog, TypeDef, TypeRef,
    TypeRegistry, Visibility,
};

/// Literal template tree: maps with `name|rule` keys, sequences and scalars.
pub type Template = serde_json::Value;

/// Concrete output of one template evaluation, with rule suffixes stripped.
pub type GeneratedTree = serde_json::Value;
