use thiserror::Error;

/// Core error type shared across mocksmith crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Abstract types and interfaces without a registered container behavior.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),
    /// A named type is not present in the type catalog.
    #[error("unknown type: {0}")]
    UnknownType(String),
    /// A generated value cannot be converted into the declared property type.
    #[error("cannot coerce {value} into {target} for property '{property}'")]
    TypeCoercion {
        property: String,
        target: String,
        value: String,
    },
    /// Configuration is internally inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A shared registry could not be accessed.
    #[error("registry error: {0}")]
    Registry(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn coercion(
        property: impl Into<String>,
        target: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self::TypeCoercion {
            property: property.into(),
            target: target.into(),
            value: value.to_string(),
        }
    }
}

/// Convenience alias for results returned by mocksmith crates.
pub type Result<T> = std::result::Result<T, Error>;
