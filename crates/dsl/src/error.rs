//! Error types for the dsl crate

use thiserror::Error;

/// Errors raised while parsing a `.schm` source.
///
/// Parsing stops at the first error; every variant carries the 1-based line
/// it was found on.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The scanner could not make sense of a character or quote
    #[error("line {line}: illegal input {text:?}")]
    Lexical { line: usize, text: String },

    /// A specific construct was expected
    #[error("line {line}: expected {expected}, found {found:?}")]
    Syntax {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("line {line}: unexpected top-level token {found:?}")]
    UnexpectedTopLevel { line: usize, found: String },

    /// `data` and `capture` blocks are reserved but not parsed
    #[error("line {line}: {kind} blocks are not supported")]
    UnsupportedBlock { line: usize, kind: String },

    #[error("line {line}: invalid provider reference {text:?}, expected <provider>::<kind>")]
    InvalidProviderReference { line: usize, text: String },

    /// A body line that is neither `}` nor a three-token assignment
    #[error("line {line}: invalid field assignment: {text}")]
    InvalidAssignment { line: usize, text: String },

    #[error("line {line}: expected '=' in field assignment: {text}")]
    MissingEquals { line: usize, text: String },

    #[error("line {line}: unexpected end of input inside instance {instance}")]
    UnterminatedBlock { line: usize, instance: String },

    /// Provider lookup or field validation failed
    #[error("line {line}: {instance}: {source}")]
    Schema {
        line: usize,
        /// `provider::kind` of the instance being parsed
        instance: String,
        #[source]
        source: schema::Error,
    },

    #[error("line {line}: reference to unknown variable {name:?}")]
    UnknownVariable { line: usize, name: String },

    #[error("line {line}: could not update nesting for {path}")]
    Nesting { line: usize, path: String },

    #[error("line {line}: duplicate {kind} {name:?}")]
    Duplicate {
        line: usize,
        kind: &'static str,
        name: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Line the error was raised on, if it came from the source text
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Lexical { line, .. }
            | Self::Syntax { line, .. }
            | Self::UnexpectedTopLevel { line, .. }
            | Self::UnsupportedBlock { line, .. }
            | Self::InvalidProviderReference { line, .. }
            | Self::InvalidAssignment { line, .. }
            | Self::MissingEquals { line, .. }
            | Self::UnterminatedBlock { line, .. }
            | Self::Schema { line, .. }
            | Self::UnknownVariable { line, .. }
            | Self::Nesting { line, .. }
            | Self::Duplicate { line, .. } => Some(*line),
            Self::Io(_) => None,
        }
    }
}

/// Result type for parsing
pub type Result<T> = std::result::Result<T, ParseError>;
