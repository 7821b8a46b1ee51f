//! Persisted records: instances, captures and data sources

use dsl::Fields;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Prefixes a data reference may carry
pub const DATA_REFERENCE_PREFIXES: [&str; 2] = ["L::", "W::"];

/// Free-form metadata kept alongside an instance
pub type Meta = BTreeMap<String, serde_json::Value>;

/// What is known about an applied instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Name given to the instance
    #[serde(default)]
    pub id: String,
    pub kind: String,
    #[serde(default)]
    pub attributes: Fields,
    #[serde(default)]
    pub meta: Meta,
    pub provider: String,
    /// Marks the instance for recreation on the next apply
    #[serde(default)]
    pub tainted: bool,
}

impl InstanceRecord {
    pub fn new(id: &str, provider: &str, kind: &str, attributes: Fields) -> Self {
        Self {
            id: id.to_string(),
            kind: kind.to_string(),
            attributes,
            meta: Meta::new(),
            provider: provider.to_string(),
            tainted: false,
        }
    }
}

/// An [`InstanceRecord`] behind its own lock
///
/// Serializes exactly like the record it holds.
#[derive(Debug, Default)]
pub struct InstanceState(Mutex<InstanceRecord>);

impl InstanceState {
    pub fn new(record: InstanceRecord) -> Self {
        Self(Mutex::new(record))
    }

    /// Lock the record, recovering it if a previous holder panicked
    pub fn lock(&self) -> MutexGuard<'_, InstanceRecord> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn snapshot(&self) -> InstanceRecord {
        self.lock().clone()
    }

    pub fn taint(&self) {
        self.lock().tainted = true;
    }

    pub fn untaint(&self) {
        self.lock().tainted = false;
    }

    pub fn is_tainted(&self) -> bool {
        self.lock().tainted
    }
}

impl From<InstanceRecord> for InstanceState {
    fn from(record: InstanceRecord) -> Self {
        Self::new(record)
    }
}

impl Clone for InstanceState {
    fn clone(&self) -> Self {
        Self::new(self.snapshot())
    }
}

impl PartialEq for InstanceState {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}

impl Serialize for InstanceState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.lock().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for InstanceState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        InstanceRecord::deserialize(deserializer).map(Self::new)
    }
}

/// A named capture and the captures it depends on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capture {
    pub name: String,
    #[serde(default)]
    pub has_dependency: Vec<String>,
    #[serde(default)]
    pub handler: String,
    #[serde(default)]
    pub tainted: bool,
}

/// An external data source read by a module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Data {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    /// `L::<path>` or `W::<url>`
    pub reference: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub tainted: bool,
}

impl Data {
    pub fn has_valid_reference(&self) -> bool {
        DATA_REFERENCE_PREFIXES
            .iter()
            .any(|prefix| self.reference.starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsl::FieldValue;

    #[test]
    fn test_record_json_shape() {
        let mut attributes = Fields::new();
        attributes.insert("containerId".into(), FieldValue::scalar("web-1"));
        let state = InstanceState::new(InstanceRecord::new("web", "capsule", "config", attributes));

        let json: serde_json::Value = serde_json::to_value(&state).unwrap();
        assert_eq!(json["id"], "web");
        assert_eq!(json["kind"], "config");
        assert_eq!(json["provider"], "capsule");
        assert_eq!(json["attributes"]["containerId"], "web-1");
        assert_eq!(json["meta"], serde_json::json!({}));
        assert_eq!(json["tainted"], false);
    }

    #[test]
    fn test_missing_maps_default_to_empty() {
        let state: InstanceState =
            serde_json::from_str(r#"{"id":"a","kind":"config","provider":"capsule"}"#).unwrap();
        let record = state.snapshot();
        assert!(record.attributes.is_empty());
        assert!(record.meta.is_empty());
        assert!(!record.tainted);
    }

    #[test]
    fn test_taint_untaint() {
        let state = InstanceState::default();
        assert!(!state.is_tainted());
        state.taint();
        assert!(state.is_tainted());
        state.untaint();
        assert!(!state.is_tainted());
    }

    #[test]
    fn test_lock_recovers_from_poison() {
        let state = std::sync::Arc::new(InstanceState::default());
        let inner = std::sync::Arc::clone(&state);
        let _ = std::thread::spawn(move || {
            let _guard = inner.lock();
            panic!("poison the lock");
        })
        .join();
        state.taint();
        assert!(state.is_tainted());
    }

    #[test]
    fn test_capture_field_names() {
        let capture = Capture {
            name: "logs".into(),
            has_dependency: vec!["web".into()],
            handler: "stdout".into(),
            tainted: false,
        };
        let json = serde_json::to_value(&capture).unwrap();
        assert_eq!(json["hasDependency"], serde_json::json!(["web"]));
        assert_eq!(json["handler"], "stdout");
    }

    #[test]
    fn test_data_reference() {
        let mut data = Data {
            kind: "file".into(),
            name: "hosts".into(),
            reference: "L::/etc/hosts".into(),
            ..Data::default()
        };
        assert!(data.has_valid_reference());
        data.reference = "W::https://example.com".into();
        assert!(data.has_valid_reference());
        data.reference = "/etc/hosts".into();
        assert!(!data.has_valid_reference());

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["type"], "file");
    }
}
