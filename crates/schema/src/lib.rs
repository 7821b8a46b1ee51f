//! # Schema
//!
//! Provider-defined schemas for schematic instances.
//!
//! A [`Provider`] offers named instance kinds. Each kind is described by a
//! [`SchemaMap`], a tree of fields whose leaves are primitive
//! ([`ValueType::String`], `Int`, `Bool`, `Float`) and whose interior nodes
//! are `Map` fields carrying nested field maps.
//!
//! The parser leans on [`SchemaMap::validate_fields`], which checks a field
//! path such as `["config", "netClsId"]` against the tree without side
//! effects, and on [`Schema::check_value`] for the assigned value.
//!
//! ## Example
//!
//! ```
//! use schema::{InstanceKind, Provider, Registry, Schema, SchemaMap};
//!
//! let fields = SchemaMap::new()
//!     .field("name", Schema::string().required())
//!     .field("limits", Schema::map(SchemaMap::new().field("cpu", Schema::int())));
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     Provider::new("local", "example.com/local")
//!         .with_instance("box", InstanceKind::new(fields))?,
//! );
//!
//! let kind = registry.lookup("local", "box")?;
//! assert!(kind.schema.validate_fields(&["limits", "cpu"]).is_ok());
//! assert!(kind.schema.validate_fields(&["name", "cpu"]).is_err());
//! # Ok::<(), schema::Error>(())
//! ```

pub mod builtin;
mod error;
pub mod provider;
pub mod types;

pub use error::{Error, Result};
pub use provider::{InstanceKind, Provider, Registry};
pub use types::{
    DiffSuppressFunc, Elem, PATH_SEPARATOR, Schema, SchemaMap, ValidateFunc, ValueType, join_path,
};
