//! Error types for the schema crate

use thiserror::Error;

/// Errors raised while resolving providers or validating field paths.
///
/// Field-level variants always carry the fully-qualified dotted path so a
/// message is actionable without looking at the provider's source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No provider registered under this name
    #[error("no such provider: {provider}")]
    ProviderNotFound { provider: String },

    /// The provider exists but does not define this instance kind
    #[error("provider [{provider}] has no instance definition: {kind}")]
    KindNotFound { provider: String, kind: String },

    /// A field path of zero segments was given
    #[error("field path must name at least one field")]
    EmptyPath,

    /// A path segment does not name a field at its level
    #[error("no schema field for: {path}")]
    UnknownField { path: String },

    /// A path tries to descend below a field that is not a map
    #[error("field {segment} is of type {found}, not Map, in: {path}")]
    NotAMap {
        path: String,
        segment: String,
        found: crate::ValueType,
    },

    /// A map field has no nested field definitions to descend into
    #[error("map field {segment} has no nested field schema, in: {path}")]
    MissingNestedSchema { path: String, segment: String },

    /// A scalar value does not conform to the field's primitive type
    #[error("invalid value {value:?} for {path}: expected {expected}")]
    InvalidValue {
        path: String,
        expected: crate::ValueType,
        value: String,
    },

    /// A field's validation hook rejected the value
    #[error("invalid value {value:?} for {path}: {message}")]
    Rejected {
        path: String,
        value: String,
        message: String,
    },

    /// A required field was not assigned
    #[error("missing required field: {path}")]
    MissingRequired { path: String },

    /// A schema definition breaks the elem invariants
    #[error("invalid schema definition for {path}: {message}")]
    InvalidDefinition { path: String, message: String },
}

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, Error>;
