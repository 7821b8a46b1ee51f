//! # DSL
//!
//! Scanner and parser for `.schm` declaration files.
//!
//! A source holds two kinds of top-level block:
//!
//! ```text
//! variable cls {
//!     value = 7
//! }
//!
//! capsule::config web {
//!     inbuilt = true
//!     containerId = web-1
//!     config = {
//!         netClsId = var.cls
//!     }
//! }
//! ```
//!
//! Instance bodies are validated against the provider schema found in the
//! [`schema::Registry`] handed to the parser. Parsing is fail-fast: the first
//! error is returned and no partial [`ParsedState`] is produced.

mod error;
pub mod fields;
mod instance;
pub mod parser;
mod reference;
pub mod scanner;
mod token;
pub mod value;

pub use error::{ParseError, Result};
pub use fields::{FieldValue, Fields};
pub use instance::{Instance, ParsedState};
pub use parser::Parser;
pub use reference::ProviderReference;
pub use scanner::Scanner;
pub use token::Token;
pub use value::{BaseType, Literal, Variable};

use schema::Registry;
use std::io::Read;
use std::path::Path;

/// Parse source text
pub fn parse_str(source: &str, registry: &Registry) -> Result<ParsedState> {
    Parser::new(source, registry).parse()
}

/// Read everything from `reader` and parse it
pub fn parse<R: Read>(mut reader: R, registry: &Registry) -> Result<ParsedState> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    parse_str(&source, registry)
}

/// Parse a `.schm` file
pub fn parse_file(path: &Path, registry: &Registry) -> Result<ParsedState> {
    log::debug!("parsing {}", path.display());
    let source = std::fs::read_to_string(path)?;
    parse_str(&source, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn registry() -> Registry {
        schema::builtin::registry_for(&["capsule"]).unwrap()
    }

    #[test]
    fn test_parse_reader() {
        let source = b"variable n { value = 3 }\n";
        let state = parse(&source[..], &registry()).unwrap();
        assert_eq!(state.variables["n"].value, Literal::Int(3));
        assert!(!state.is_empty());
    }

    #[test]
    fn test_parse_comments_only() {
        let state = parse_str("# nothing declared yet

", &registry()).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "capsule::config db {{\n  inbuilt = false\n  containerId = db\n  config = {{\n  }}\n}}"
        )
        .unwrap();
        let state = parse_file(file.path(), &registry()).unwrap();
        assert_eq!(state.instances["db"].reference(), "capsule::config");
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_file(Path::new("/nonexistent/main.schm"), &registry()).unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
        assert_eq!(err.line(), None);
    }
}
