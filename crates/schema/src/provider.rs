//! Providers and the registry the parser resolves instance kinds against

use crate::error::{Error, Result};
use crate::types::SchemaMap;
use std::collections::BTreeMap;

/// Schema and metadata for one instance kind offered by a provider
#[derive(Debug, Clone, Default)]
pub struct InstanceKind {
    pub schema: SchemaMap,
    pub description: String,
}

impl InstanceKind {
    pub fn new(schema: SchemaMap) -> Self {
        Self {
            schema,
            description: String::new(),
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// A named provider and the instance kinds it defines
#[derive(Debug, Clone, Default)]
pub struct Provider {
    pub name: String,
    /// Where the provider is published (informational)
    pub source: String,
    instances: BTreeMap<String, InstanceKind>,
}

impl Provider {
    pub fn new(name: &str, source: &str) -> Self {
        Self {
            name: name.to_string(),
            source: source.to_string(),
            instances: BTreeMap::new(),
        }
    }

    /// Add an instance kind, checking its schema definition first
    pub fn with_instance(mut self, kind: &str, instance: InstanceKind) -> Result<Self> {
        instance.schema.check_definition()?;
        self.instances.insert(kind.to_string(), instance);
        Ok(self)
    }

    pub fn instance(&self, kind: &str) -> Option<&InstanceKind> {
        self.instances.get(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }
}

/// Provider name to provider
///
/// Owned by the caller and handed to the parser by reference, so separate
/// parses can use separate registries.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    providers: BTreeMap<String, Provider>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any previous one with the same name
    pub fn register(&mut self, provider: Provider) {
        self.providers.insert(provider.name.clone(), provider);
    }

    pub fn provider(&self, name: &str) -> Option<&Provider> {
        self.providers.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Resolve `(provider, kind)` to its instance definition
    pub fn lookup(&self, provider: &str, kind: &str) -> Result<&InstanceKind> {
        let found = self
            .providers
            .get(provider)
            .ok_or_else(|| Error::ProviderNotFound {
                provider: provider.to_string(),
            })?;

        found.instance(kind).ok_or_else(|| Error::KindNotFound {
            provider: provider.to_string(),
            kind: kind.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Elem, Schema};

    fn registry() -> Registry {
        let provider = Provider::new("local", "example.com/local")
            .with_instance(
                "file",
                InstanceKind::new(SchemaMap::new().field("path", Schema::string().required())),
            )
            .unwrap();
        let mut registry = Registry::new();
        registry.register(provider);
        registry
    }

    #[test]
    fn test_lookup_found() {
        let registry = registry();
        let kind = registry.lookup("local", "file").unwrap();
        assert!(kind.schema.get("path").is_some());
    }

    #[test]
    fn test_lookup_distinguishes_missing_provider_and_kind() {
        let registry = registry();
        assert_eq!(
            registry.lookup("remote", "file").unwrap_err(),
            Error::ProviderNotFound {
                provider: "remote".to_string()
            }
        );
        assert_eq!(
            registry.lookup("local", "dir").unwrap_err(),
            Error::KindNotFound {
                provider: "local".to_string(),
                kind: "dir".to_string()
            }
        );
    }

    #[test]
    fn test_with_instance_rejects_invalid_schema() {
        let mut bad = Schema::string();
        bad.elem = Some(Elem::Fields(SchemaMap::new()));
        let result = Provider::new("local", "").with_instance(
            "file",
            InstanceKind::new(SchemaMap::new().field("path", bad)),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_registries_are_independent() {
        let first = registry();
        let second = Registry::new();
        assert!(first.provider("local").is_some());
        assert!(second.provider("local").is_none());
        assert_eq!(first.names().collect::<Vec<_>>(), vec!["local"]);
    }
}
