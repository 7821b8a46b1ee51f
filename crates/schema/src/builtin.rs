//! Providers bundled with schematic

use crate::error::Result;
use crate::provider::{InstanceKind, Provider, Registry};
use crate::types::{Schema, SchemaMap};

/// A provider that can be installed by name
#[derive(Debug, Clone, Copy)]
pub struct BuiltinProvider {
    pub name: &'static str,
    pub source: &'static str,
    build: fn() -> Result<Provider>,
}

impl BuiltinProvider {
    pub fn build(&self) -> Result<Provider> {
        (self.build)()
    }
}

const CAPSULE_SOURCE: &str = "github.com/engineersbox/terraform_provider_capsule";

/// Every provider `schematic install` knows about
pub const CATALOG: &[BuiltinProvider] = &[BuiltinProvider {
    name: "capsule",
    source: CAPSULE_SOURCE,
    build: capsule,
}];

/// Find a catalog entry by name
pub fn find(name: &str) -> Option<&'static BuiltinProvider> {
    CATALOG.iter().find(|p| p.name == name)
}

/// Build a registry holding the named catalog providers
///
/// Names missing from the catalog are skipped; the caller decides whether
/// that is worth reporting.
pub fn registry_for<S: AsRef<str>>(names: &[S]) -> Result<Registry> {
    let mut registry = Registry::new();
    for name in names {
        if let Some(builtin) = find(name.as_ref()) {
            registry.register(builtin.build()?);
        }
    }
    Ok(registry)
}

/// The capsule container provider
pub fn capsule() -> Result<Provider> {
    let config = SchemaMap::new()
        .field(
            "pidsMax",
            Schema::int().optional().describe("Maximum number of processes"),
        )
        .field(
            "memMax",
            Schema::int().optional().describe("Memory limit in bytes"),
        )
        .field(
            "netClsId",
            Schema::int().optional().describe("net_cls classid for traffic shaping"),
        )
        .field(
            "terminateOnClose",
            Schema::bool()
                .optional()
                .describe("Stop the container when its handle closes"),
        );

    let schema = SchemaMap::new()
        .field(
            "inbuilt",
            Schema::bool().required().describe("Use the built-in capsule runtime"),
        )
        .field(
            "containerId",
            Schema::string()
                .required()
                .force_new()
                .describe("Container identifier"),
        )
        .field(
            "config",
            Schema::map(config).required().describe("Resource limits"),
        );

    Provider::new("capsule", CAPSULE_SOURCE).with_instance(
        "config",
        InstanceKind::new(schema).describe("A Capsule resource instance"),
    )
}
