//! Nested field values of an instance

use schema::{PATH_SEPARATOR, join_path};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name to value, one nesting level
pub type Fields = BTreeMap<String, FieldValue>;

/// A field value: a scalar leaf or a nested map mirroring a Map schema field
///
/// Serializes as a plain JSON string or object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    Nested(Fields),
}

impl FieldValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&Fields> {
        match self {
            Self::Nested(fields) => Some(fields),
            Self::Scalar(_) => None,
        }
    }
}

/// An intermediate path segment already holds a scalar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not update nesting for {path}")]
pub struct AssignError {
    pub path: String,
}

/// Walk (creating as needed) the nested maps along `path`
fn descend<'a, S: AsRef<str>>(
    fields: &'a mut Fields,
    path: &[S],
    full_path: &[S],
) -> Result<&'a mut Fields, AssignError> {
    let mut current = fields;
    for segment in path {
        current = match current
            .entry(segment.as_ref().to_string())
            .or_insert_with(|| FieldValue::Nested(Fields::new()))
        {
            FieldValue::Nested(inner) => inner,
            FieldValue::Scalar(_) => {
                return Err(AssignError {
                    path: join_path(full_path),
                });
            }
        };
    }
    Ok(current)
}

/// Assign `value` at `path`, creating intermediate maps
///
/// Assignments to disjoint paths commute. An intermediate segment that
/// holds a scalar is an error.
pub fn assign<S: AsRef<str>>(
    fields: &mut Fields,
    path: &[S],
    value: FieldValue,
) -> Result<(), AssignError> {
    let Some((last, parents)) = path.split_last() else {
        return Err(AssignError {
            path: String::new(),
        });
    };
    let target = descend(fields, parents, path)?;
    target.insert(last.as_ref().to_string(), value);
    Ok(())
}

/// Make sure a nested map exists at `path` without touching its contents
pub fn ensure_nested<S: AsRef<str>>(fields: &mut Fields, path: &[S]) -> Result<(), AssignError> {
    descend(fields, path, path).map(|_| ())
}

/// Look up the value at `path`
pub fn get_field<'a, S: AsRef<str>>(fields: &'a Fields, path: &[S]) -> Option<&'a FieldValue> {
    let (last, parents) = path.split_last()?;
    let mut current = fields;
    for segment in parents {
        current = current.get(segment.as_ref())?.as_nested()?;
    }
    current.get(last.as_ref())
}

/// Remove and return the value at `path`
pub fn remove<S: AsRef<str>>(fields: &mut Fields, path: &[S]) -> Option<FieldValue> {
    let (last, parents) = path.split_last()?;
    let mut current = fields;
    for segment in parents {
        current = match current.get_mut(segment.as_ref())? {
            FieldValue::Nested(inner) => inner,
            FieldValue::Scalar(_) => return None,
        };
    }
    current.remove(last.as_ref())
}

/// Flatten to dotted path → scalar text
pub fn flatten(fields: &Fields) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    flatten_into(fields, "", &mut out);
    out
}

fn flatten_into(fields: &Fields, prefix: &str, out: &mut BTreeMap<String, String>) {
    for (name, value) in fields {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}{PATH_SEPARATOR}{name}")
        };
        match value {
            FieldValue::Scalar(text) => {
                out.insert(path, text.clone());
            }
            FieldValue::Nested(inner) => flatten_into(inner, &path, out),
        }
    }
}
