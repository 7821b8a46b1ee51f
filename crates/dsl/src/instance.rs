//! Parser output

use crate::fields::{FieldValue, Fields, get_field};
use crate::value::Variable;
use std::collections::BTreeMap;

/// A declared instance and the fields assigned in its body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub provider: String,
    pub kind: String,
    pub name: String,
    pub fields: Fields,
}

impl Instance {
    pub fn new(provider: &str, kind: &str, name: &str) -> Self {
        Self {
            provider: provider.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            fields: Fields::new(),
        }
    }

    /// `provider::kind`
    pub fn reference(&self) -> String {
        format!("{}::{}", self.provider, self.kind)
    }

    pub fn field<S: AsRef<str>>(&self, path: &[S]) -> Option<&FieldValue> {
        get_field(&self.fields, path)
    }
}

/// Everything a successful parse produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedState {
    pub variables: BTreeMap<String, Variable>,
    pub instances: BTreeMap<String, Instance>,
}

impl ParsedState {
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.instances.is_empty()
    }
}
