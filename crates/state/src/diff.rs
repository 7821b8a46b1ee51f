//! Attribute-level diffs between persisted and declared instances

use crate::record::InstanceRecord;
use dsl::Instance;
use dsl::fields::flatten;
use schema::SchemaMap;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Change to one attribute, keyed by its dotted path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrDiff {
    pub old: String,
    pub new: String,
    /// Value will be supplied by the provider
    pub new_computed: bool,
    pub new_removed: bool,
    pub requires_new: bool,
    /// Hide values in plan output
    pub sensitive: bool,
}

/// Everything that changes for one instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffRecord {
    pub attributes: BTreeMap<String, AttrDiff>,
    /// Nothing persisted yet
    pub create: bool,
    /// No longer declared
    pub destroy: bool,
    /// Persisted record is tainted
    pub destroy_tainted: bool,
}

impl DiffRecord {
    /// Any attribute change the configuration asked for
    ///
    /// Pending computed values alone do not count.
    pub fn has_changes(&self) -> bool {
        self.attributes.values().any(|attr| !attr.new_computed)
    }

    pub fn requires_new(&self) -> bool {
        self.attributes.values().any(|attr| attr.requires_new)
    }

    /// Paths whose change forces recreation
    pub fn requires_new_paths(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, attr)| attr.requires_new)
            .map(|(path, _)| path.as_str())
            .collect()
    }

    pub fn change_type(&self) -> ChangeType {
        if self.destroy {
            ChangeType::Destroy
        } else if self.create {
            ChangeType::Create
        } else if self.destroy_tainted || self.requires_new() {
            ChangeType::DestroyCreate
        } else if self.has_changes() {
            ChangeType::Update
        } else {
            ChangeType::None
        }
    }
}

/// A [`DiffRecord`] behind its own lock
#[derive(Debug, Default)]
pub struct InstanceDiff(Mutex<DiffRecord>);

impl InstanceDiff {
    pub fn new(record: DiffRecord) -> Self {
        Self(Mutex::new(record))
    }

    pub fn lock(&self) -> MutexGuard<'_, DiffRecord> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn snapshot(&self) -> DiffRecord {
        self.lock().clone()
    }

    pub fn change_type(&self) -> ChangeType {
        self.lock().change_type()
    }
}

/// Overall kind of change a diff describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    None,
    Create,
    Update,
    Destroy,
    DestroyCreate,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
            Self::DestroyCreate => "destroy-create",
        };
        f.write_str(name)
    }
}

/// Diff the persisted record of an instance against its fresh declaration
///
/// `old` is `None` for an instance never applied and `new` is `None` for
/// one no longer declared. `schema` supplies the computed, force-new,
/// sensitive and diff-suppress flags; without it every field is plain.
pub fn diff_instance(
    old: Option<&InstanceRecord>,
    new: Option<&Instance>,
    schema: Option<&SchemaMap>,
) -> InstanceDiff {
    let mut record = DiffRecord {
        create: old.is_none() && new.is_some(),
        destroy: old.is_some() && new.is_none(),
        destroy_tainted: old.is_some_and(|o| o.tainted),
        ..DiffRecord::default()
    };

    if let Some(new) = new {
        let old_flat = old.map(|o| flatten(&o.attributes)).unwrap_or_default();
        let new_flat = flatten(&new.fields);
        record.attributes = diff_attributes(&old_flat, &new_flat, schema);
    }

    InstanceDiff::new(record)
}

fn diff_attributes(
    old: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
    schema: Option<&SchemaMap>,
) -> BTreeMap<String, AttrDiff> {
    let mut attributes = BTreeMap::new();
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    for key in keys {
        let field = schema.and_then(|s| s.lookup(key));
        let computed = field.is_some_and(|f| f.computed);
        let (old_value, new_value) = (old.get(key), new.get(key));

        if old_value == new_value {
            continue;
        }
        // Provider-supplied values survive when the configuration omits them
        if computed && new_value.is_none() {
            continue;
        }

        let old_text = old_value.map_or("", String::as_str);
        let new_text = new_value.map_or("", String::as_str);
        if field.is_some_and(|f| f.suppresses_diff(key, old_text, new_text)) {
            continue;
        }

        attributes.insert(
            key.clone(),
            AttrDiff {
                old: old_text.to_string(),
                new: new_text.to_string(),
                new_computed: false,
                new_removed: new_value.is_none(),
                requires_new: field.is_some_and(|f| f.force_new),
                sensitive: field.is_some_and(|f| f.sensitive),
            },
        );
    }

    if let Some(schema) = schema {
        for path in schema.computed_paths() {
            if old.contains_key(&path) || new.contains_key(&path) {
                continue;
            }
            let sensitive = schema.lookup(&path).is_some_and(|f| f.sensitive);
            attributes.insert(
                path,
                AttrDiff {
                    new_computed: true,
                    sensitive,
                    ..AttrDiff::default()
                },
            );
        }
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsl::FieldValue;
    use dsl::fields::assign;
    use schema::Schema;

    fn schema() -> SchemaMap {
        SchemaMap::new()
            .field("containerId", Schema::string().required().force_new())
            .field("image", Schema::string())
            .field("token", Schema::string().sensitive())
            .field("pid", Schema::int().computed())
            .field(
                "tag",
                Schema::string().with_diff_suppress(|_, old, new| old.eq_ignore_ascii_case(new)),
            )
    }

    fn instance(pairs: &[(&str, &str)]) -> Instance {
        let mut instance = Instance::new("capsule", "config", "web");
        for (path, value) in pairs {
            let segments: Vec<&str> = path.split('.').collect();
            assign(&mut instance.fields, &segments, FieldValue::scalar(*value)).unwrap();
        }
        instance
    }

    fn record(pairs: &[(&str, &str)]) -> InstanceRecord {
        InstanceRecord::new("web", "capsule", "config", instance(pairs).fields)
    }

    #[test]
    fn test_create() {
        let new = instance(&[("containerId", "c1")]);
        let diff = diff_instance(None, Some(&new), Some(&schema())).snapshot();
        assert_eq!(diff.change_type(), ChangeType::Create);
        assert_eq!(diff.attributes["containerId"].new, "c1");
        assert!(diff.attributes["pid"].new_computed);
    }

    #[test]
    fn test_destroy() {
        let old = record(&[("containerId", "c1")]);
        let diff = diff_instance(Some(&old), None, Some(&schema())).snapshot();
        assert!(diff.destroy);
        assert!(diff.attributes.is_empty());
        assert_eq!(diff.change_type(), ChangeType::Destroy);
    }

    #[test]
    fn test_update_and_removal() {
        let old = record(&[("containerId", "c1"), ("image", "alpine"), ("pid", "42")]);
        let new = instance(&[("containerId", "c1"), ("token", "s3cret")]);
        let diff = diff_instance(Some(&old), Some(&new), Some(&schema())).snapshot();

        let removed = &diff.attributes["image"];
        assert!(removed.new_removed);
        assert_eq!(removed.old, "alpine");

        assert!(diff.attributes["token"].sensitive);
        // computed value present only in old is kept
        assert!(!diff.attributes.contains_key("pid"));
        assert_eq!(diff.change_type(), ChangeType::Update);
    }

    #[test]
    fn test_force_new_field() {
        let old = record(&[("containerId", "c1")]);
        let new = instance(&[("containerId", "c2")]);
        let diff = diff_instance(Some(&old), Some(&new), Some(&schema())).snapshot();
        assert!(diff.attributes["containerId"].requires_new);
        assert_eq!(diff.requires_new_paths(), vec!["containerId"]);
        assert_eq!(diff.change_type(), ChangeType::DestroyCreate);
    }

    #[test]
    fn test_diff_suppress() {
        let old = record(&[("containerId", "c1"), ("tag", "LATEST"), ("pid", "1")]);
        let new = instance(&[("containerId", "c1"), ("tag", "latest")]);
        let diff = diff_instance(Some(&old), Some(&new), Some(&schema())).snapshot();
        assert!(diff.attributes.is_empty());
        assert_eq!(diff.change_type(), ChangeType::None);
    }

    #[test]
    fn test_pending_computed_is_not_a_change() {
        let old = record(&[("containerId", "c1")]);
        let new = instance(&[("containerId", "c1")]);
        let diff = diff_instance(Some(&old), Some(&new), Some(&schema())).snapshot();
        assert!(diff.attributes["pid"].new_computed);
        assert!(!diff.has_changes());
        assert_eq!(diff.change_type(), ChangeType::None);
    }

    #[test]
    fn test_tainted_with_empty_diff_is_destroy_create() {
        let mut old = record(&[("containerId", "c1"), ("pid", "1")]);
        old.tainted = true;
        let new = instance(&[("containerId", "c1")]);
        let diff = diff_instance(Some(&old), Some(&new), Some(&schema()));
        let snapshot = diff.snapshot();
        assert!(snapshot.attributes.is_empty());
        assert!(snapshot.destroy_tainted);
        assert_eq!(diff.change_type(), ChangeType::DestroyCreate);
    }

    #[test]
    fn test_nested_paths_without_schema() {
        let old = record(&[("config.memMax", "256")]);
        let new = instance(&[("config.memMax", "512")]);
        let diff = diff_instance(Some(&old), Some(&new), None).snapshot();
        let attr = &diff.attributes["config.memMax"];
        assert_eq!((attr.old.as_str(), attr.new.as_str()), ("256", "512"));
        assert!(!attr.requires_new);
    }
}
