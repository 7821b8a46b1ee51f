//! Field schema tree
//!
//! A provider describes each instance kind as a [`SchemaMap`]: field name to
//! [`Schema`]. Map fields may nest another `SchemaMap` through
//! [`Elem::Fields`], which is what lets instance bodies open `field = { ... }`
//! blocks.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Separator used when rendering a field path for humans and diff keys
pub const PATH_SEPARATOR: &str = ".";

/// Join path segments into their dotted form
pub fn join_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

/// Closed set of field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Int,
    Bool,
    Float,
    Map,
}

impl ValueType {
    /// Whether this is one of the scalar kinds
    pub fn is_primitive(self) -> bool {
        !matches!(self, Self::Map)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::Int => "Int",
            Self::Bool => "Bool",
            Self::Float => "Float",
            Self::Map => "Map",
        };
        f.write_str(name)
    }
}

/// Validation hook: returns a message when the value is rejected
pub type ValidateFunc = fn(value: &str) -> std::result::Result<(), String>;

/// Diff suppression hook: returns true when `old` and `new` are equivalent
pub type DiffSuppressFunc = fn(key: &str, old: &str, new: &str) -> bool;

/// Element description carried by a Map field
#[derive(Debug, Clone)]
pub enum Elem {
    /// Object-shaped nesting: named fields, each with its own schema
    Fields(SchemaMap),
    /// A single repeated element type
    Value(Box<Schema>),
}

/// Schema for a single field
#[derive(Debug, Clone)]
pub struct Schema {
    pub ty: ValueType,
    pub required: bool,
    pub optional: bool,
    /// Value is supplied by the provider, not the configuration
    pub computed: bool,
    /// Changing this field forces the instance to be recreated
    pub force_new: bool,
    /// Value is hidden in plan output
    pub sensitive: bool,
    pub description: String,
    pub elem: Option<Elem>,
    pub validate: Option<ValidateFunc>,
    pub diff_suppress: Option<DiffSuppressFunc>,
}

impl Schema {
    pub fn new(ty: ValueType) -> Self {
        Self {
            ty,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
            description: String::new(),
            elem: None,
            validate: None,
            diff_suppress: None,
        }
    }

    pub fn string() -> Self {
        Self::new(ValueType::String)
    }

    pub fn int() -> Self {
        Self::new(ValueType::Int)
    }

    pub fn float() -> Self {
        Self::new(ValueType::Float)
    }

    pub fn bool() -> Self {
        Self::new(ValueType::Bool)
    }

    /// A Map field with named nested fields
    pub fn map(fields: SchemaMap) -> Self {
        Self {
            elem: Some(Elem::Fields(fields)),
            ..Self::new(ValueType::Map)
        }
    }

    /// A Map field whose values all share one element schema
    pub fn map_of(elem: Schema) -> Self {
        Self {
            elem: Some(Elem::Value(Box::new(elem))),
            ..Self::new(ValueType::Map)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_validate(mut self, validate: ValidateFunc) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn with_diff_suppress(mut self, diff_suppress: DiffSuppressFunc) -> Self {
        self.diff_suppress = Some(diff_suppress);
        self
    }

    /// The nested field map of an object-shaped Map field
    ///
    /// `segment` and `path` are only used to build the error.
    fn nested<S: AsRef<str>>(&self, segment: &str, path: &[S]) -> Result<&SchemaMap> {
        if self.ty != ValueType::Map {
            return Err(Error::NotAMap {
                path: join_path(path),
                segment: segment.to_string(),
                found: self.ty,
            });
        }
        match &self.elem {
            Some(Elem::Fields(fields)) => Ok(fields),
            _ => Err(Error::MissingNestedSchema {
                path: join_path(path),
                segment: segment.to_string(),
            }),
        }
    }

    /// Nested fields if this is an object-shaped Map field
    pub fn nested_fields(&self) -> Option<&SchemaMap> {
        match (&self.ty, &self.elem) {
            (ValueType::Map, Some(Elem::Fields(fields))) => Some(fields),
            _ => None,
        }
    }

    /// Check a scalar value against this field's type and validation hook
    pub fn check_value(&self, path: &str, value: &str) -> Result<()> {
        let conforms = match self.ty {
            ValueType::String => true,
            ValueType::Int => value.parse::<i64>().is_ok(),
            ValueType::Float => {
                value.bytes().any(|b| b.is_ascii_digit()) && value.parse::<f64>().is_ok()
            }
            ValueType::Bool => value.parse::<bool>().is_ok(),
            ValueType::Map => false,
        };
        if !conforms {
            return Err(Error::InvalidValue {
                path: path.to_string(),
                expected: self.ty,
                value: value.to_string(),
            });
        }

        if let Some(validate) = self.validate {
            validate(value).map_err(|message| Error::Rejected {
                path: path.to_string(),
                value: value.to_string(),
                message,
            })?;
        }

        Ok(())
    }

    /// Whether two values for this field should be treated as equal
    pub fn suppresses_diff(&self, key: &str, old: &str, new: &str) -> bool {
        self.diff_suppress.is_some_and(|f| f(key, old, new))
    }

    fn check_definition(&self, path: &str) -> Result<()> {
        let invalid = |message: &str| Error::InvalidDefinition {
            path: path.to_string(),
            message: message.to_string(),
        };

        if self.required && self.optional {
            return Err(invalid("field cannot be both required and optional"));
        }
        if self.required && self.computed {
            return Err(invalid("field cannot be both required and computed"));
        }

        match (&self.ty, &self.elem) {
            (ValueType::Map, Some(Elem::Fields(fields))) => fields.check_definition_at(path),
            (ValueType::Map, Some(Elem::Value(inner))) => {
                if inner.ty.is_primitive() && inner.elem.is_none() {
                    Ok(())
                } else {
                    Err(invalid("map element schema must be a primitive"))
                }
            }
            (ValueType::Map, None) => Ok(()),
            (_, Some(_)) => Err(invalid("only Map fields may carry elem")),
            (_, None) => Ok(()),
        }
    }
}

/// Mapping from field name to its schema
#[derive(Debug, Clone, Default)]
pub struct SchemaMap {
    fields: BTreeMap<String, Schema>,
}

impl SchemaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn field(mut self, name: &str, schema: Schema) -> Self {
        self.fields.insert(name.to_string(), schema);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.fields.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate a field path and return the schema of its last segment
    ///
    /// A single segment must name a direct field. Longer paths require every
    /// intermediate segment to be a Map field with nested field definitions.
    pub fn validate_fields<S: AsRef<str>>(&self, path: &[S]) -> Result<&Schema> {
        let (last, parents) = path.split_last().ok_or(Error::EmptyPath)?;

        let mut fields = self;
        for segment in parents {
            let segment = segment.as_ref();
            let schema = fields.get(segment).ok_or_else(|| Error::UnknownField {
                path: join_path(path),
            })?;
            fields = schema.nested(segment, path)?;
        }

        fields.get(last.as_ref()).ok_or_else(|| Error::UnknownField {
            path: join_path(path),
        })
    }

    /// Validate the path of a `field = {` block and return its nested fields
    pub fn validate_block<S: AsRef<str>>(&self, path: &[S]) -> Result<&SchemaMap> {
        let schema = self.validate_fields(path)?;
        let segment = path.last().map_or("", AsRef::as_ref);
        schema.nested(segment, path)
    }

    /// Look up a field by its dotted path
    pub fn lookup(&self, dotted: &str) -> Option<&Schema> {
        let segments: Vec<&str> = dotted.split(PATH_SEPARATOR).collect();
        self.validate_fields(&segments).ok()
    }

    /// Dotted paths of every computed leaf field
    pub fn computed_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_computed("", &mut paths);
        paths
    }

    fn collect_computed(&self, prefix: &str, out: &mut Vec<String>) {
        for (name, schema) in &self.fields {
            let path = prefixed(prefix, name);
            match schema.nested_fields() {
                Some(nested) => nested.collect_computed(&path, out),
                None if schema.computed => out.push(path),
                None => {}
            }
        }
    }

    /// Dotted paths of fields that must always be assigned
    ///
    /// A nested field is only listed when every enclosing Map is required
    /// too; children of an omitted optional map are not demanded.
    pub fn required_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_required("", &mut paths);
        paths
    }

    fn collect_required(&self, prefix: &str, out: &mut Vec<String>) {
        for (name, schema) in &self.fields {
            if !schema.required {
                continue;
            }
            let path = prefixed(prefix, name);
            out.push(path.clone());
            if let Some(nested) = schema.nested_fields() {
                nested.collect_required(&path, out);
            }
        }
    }

    /// Check the elem and flag invariants for every field in the tree
    pub fn check_definition(&self) -> Result<()> {
        self.check_definition_at("")
    }

    fn check_definition_at(&self, prefix: &str) -> Result<()> {
        for (name, schema) in &self.fields {
            schema.check_definition(&prefixed(prefix, name))?;
        }
        Ok(())
    }
}

fn prefixed(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}{PATH_SEPARATOR}{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_schema() -> SchemaMap {
        SchemaMap::new()
            .field("name", Schema::string().required())
            .field(
                "config",
                Schema::map(SchemaMap::new().field("netClsId", Schema::int())),
            )
            .field("labels", Schema::map_of(Schema::string()))
    }

    #[test]
    fn test_validate_direct_field() {
        let schema = config_schema();
        let field = schema.validate_fields(&["name"]).unwrap();
        assert_eq!(field.ty, ValueType::String);
    }

    #[test]
    fn test_validate_nested_field() {
        let schema = config_schema();
        let field = schema.validate_fields(&["config", "netClsId"]).unwrap();
        assert_eq!(field.ty, ValueType::Int);
    }

    #[test]
    fn test_validate_below_primitive_fails() {
        let schema = config_schema();
        let err = schema
            .validate_fields(&["config", "netClsId", "extra"])
            .unwrap_err();
        assert!(matches!(err, Error::NotAMap { ref segment, .. } if segment == "netClsId"));
        assert!(err.to_string().contains("config.netClsId.extra"));
    }

    #[test]
    fn test_validate_unknown_field() {
        let schema = config_schema();
        let err = schema.validate_fields(&["missing"]).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownField {
                path: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_validate_requires_field_map_elem() {
        let schema = config_schema();
        let err = schema.validate_fields(&["labels", "team"]).unwrap_err();
        assert!(matches!(err, Error::MissingNestedSchema { .. }));
    }

    #[test]
    fn test_validate_empty_path() {
        let schema = config_schema();
        let empty: [&str; 0] = [];
        assert_eq!(schema.validate_fields(&empty).unwrap_err(), Error::EmptyPath);
    }

    #[test]
    fn test_validation_is_monotonic() {
        let schema = config_schema();
        let path = ["config", "netClsId"];
        assert!(schema.validate_fields(&path).is_ok());
        let parent = schema.validate_fields(&path[..1]).unwrap();
        assert_eq!(parent.ty, ValueType::Map);
    }

    #[test]
    fn test_check_value_types() {
        assert!(Schema::int().check_value("n", "42").is_ok());
        assert!(Schema::int().check_value("n", "4.2").is_err());
        assert!(Schema::float().check_value("f", "7").is_ok());
        assert!(Schema::float().check_value("f", "2.5e3").is_ok());
        assert!(Schema::float().check_value("f", "NaN").is_err());
        assert!(Schema::float().check_value("f", "inf").is_err());
        assert!(Schema::bool().check_value("b", "true").is_ok());
        assert!(Schema::bool().check_value("b", "yes").is_err());
        assert!(Schema::string().check_value("s", "anything").is_ok());
        assert!(Schema::map(SchemaMap::new()).check_value("m", "x").is_err());
    }

    #[test]
    fn test_check_value_runs_hook() {
        let schema = Schema::int().with_validate(|v| {
            if v.starts_with('-') {
                Err("must not be negative".to_string())
            } else {
                Ok(())
            }
        });
        let err = schema.check_value("pidsMax", "-1").unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn test_lookup_dotted() {
        let schema = config_schema();
        assert!(schema.lookup("config.netClsId").is_some());
        assert!(schema.lookup("config.nope").is_none());
    }

    #[test]
    fn test_computed_paths() {
        let schema = SchemaMap::new()
            .field("id", Schema::string().computed())
            .field(
                "status",
                Schema::map(SchemaMap::new().field("pid", Schema::int().computed())),
            )
            .field("name", Schema::string());
        assert_eq!(schema.computed_paths(), vec!["id", "status.pid"]);
    }

    #[test]
    fn test_validate_block() {
        let schema = config_schema();
        let nested = schema.validate_block(&["config"]).unwrap();
        assert!(nested.get("netClsId").is_some());
        assert!(matches!(
            schema.validate_block(&["name"]).unwrap_err(),
            Error::NotAMap { .. }
        ));
        assert!(matches!(
            schema.validate_block(&["labels"]).unwrap_err(),
            Error::MissingNestedSchema { .. }
        ));
    }

    #[test]
    fn test_required_paths() {
        let schema = SchemaMap::new()
            .field("name", Schema::string().required())
            .field(
                "config",
                Schema::map(SchemaMap::new().field("cpu", Schema::int().required())).required(),
            )
            .field(
                "extra",
                Schema::map(SchemaMap::new().field("x", Schema::int().required())).optional(),
            );
        assert_eq!(schema.required_paths(), vec!["config", "config.cpu", "name"]);
    }

    #[test]
    fn test_check_definition() {
        assert!(config_schema().check_definition().is_ok());

        let mut bad = Schema::int();
        bad.elem = Some(Elem::Value(Box::new(Schema::string())));
        let err = SchemaMap::new().field("n", bad).check_definition().unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition { ref path, .. } if path == "n"));

        let nested_bad = Schema::map(
            SchemaMap::new().field("x", Schema::string().required().computed()),
        );
        let err = SchemaMap::new()
            .field("outer", nested_bad)
            .check_definition()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition { ref path, .. } if path == "outer.x"));
    }
}
