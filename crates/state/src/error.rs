//! Error types for the state crate

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse state file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize state")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write state file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data record's reference is not `L::` or `W::` prefixed
    #[error("data {name} in module {module} has invalid reference {reference:?}")]
    InvalidDataReference {
        module: String,
        name: String,
        reference: String,
    },

    #[error("no module {module} in state")]
    ModuleNotFound { module: String },

    #[error("no instance {name} in module {module}")]
    InstanceNotFound { module: String, name: String },

    /// A planned create or replace has no declaration to build the record from
    #[error("instance {name} is planned in module {module} but not declared")]
    UndeclaredInstance { module: String, name: String },

    #[error("failed to update attributes of {name} in module {module}")]
    Nesting {
        module: String,
        name: String,
        #[source]
        source: dsl::fields::AssignError,
    },
}

/// Result type for state operations
pub type Result<T> = std::result::Result<T, StateError>;
