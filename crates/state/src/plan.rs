//! Plans: what applying a parsed configuration would change

use crate::diff::{ChangeType, InstanceDiff, diff_instance};
use crate::record::InstanceRecord;
use crate::store::ModuleState;
use dsl::{Instance, ParsedState};
use rayon::prelude::*;
use schema::Registry;
use std::collections::BTreeSet;
use std::fmt;

/// What happens to one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Update,
    /// Destroy then create
    Replace,
    Destroy,
    NoOp,
}

impl Action {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Create => "+",
            Self::Update => "~",
            Self::Replace => "-/+",
            Self::Destroy => "-",
            Self::NoOp => " ",
        }
    }

    /// Whether an existing instance is torn down
    pub fn is_destructive(self) -> bool {
        matches!(self, Self::Replace | Self::Destroy)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Destroy => "destroy",
            Self::NoOp => "no-op",
        };
        f.write_str(name)
    }
}

/// Why an instance is being replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceReason {
    Tainted,
    /// These attribute paths force a new instance
    ForceNew(Vec<String>),
    /// Declared under a different `provider::kind` than persisted
    KindChanged { from: String, to: String },
}

impl fmt::Display for ReplaceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tainted => f.write_str("tainted"),
            Self::ForceNew(paths) => write!(f, "forces replacement: {}", paths.join(", ")),
            Self::KindChanged { from, to } => write!(f, "{from} -> {to}"),
        }
    }
}

#[derive(Debug)]
pub struct PlannedChange {
    pub name: String,
    pub provider: String,
    pub kind: String,
    pub action: Action,
    pub reason: Option<ReplaceReason>,
    pub diff: InstanceDiff,
}

impl PlannedChange {
    /// `provider::kind`
    pub fn reference(&self) -> String {
        format!("{}::{}", self.provider, self.kind)
    }
}

/// Per-action totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub destroy: usize,
    pub unchanged: usize,
}

/// One planned change per declared or persisted instance, ordered by name
#[derive(Debug, Default)]
pub struct Plan {
    pub changes: Vec<PlannedChange>,
}

impl Plan {
    /// Nothing to apply
    pub fn is_empty(&self) -> bool {
        self.changes.iter().all(|c| c.action == Action::NoOp)
    }

    pub fn get(&self, name: &str) -> Option<&PlannedChange> {
        self.changes.iter().find(|c| c.name == name)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for change in &self.changes {
            match change.action {
                Action::Create => summary.create += 1,
                Action::Update => summary.update += 1,
                Action::Replace => summary.replace += 1,
                Action::Destroy => summary.destroy += 1,
                Action::NoOp => summary.unchanged += 1,
            }
        }
        summary
    }

    pub fn has_destructive(&self) -> bool {
        self.changes.iter().any(|c| c.action.is_destructive())
    }
}

/// Diff every declared and persisted instance of a module
///
/// Instances are diffed in parallel; the resulting plan is ordered by name.
pub fn plan(prior: Option<&ModuleState>, parsed: &ParsedState, registry: &Registry) -> Plan {
    let old_records: Vec<(String, InstanceRecord)> = prior
        .map(|module| {
            module
                .instances
                .iter()
                .map(|(name, state)| (name.clone(), state.snapshot()))
                .collect()
        })
        .unwrap_or_default();

    let names: BTreeSet<&str> = old_records
        .iter()
        .map(|(name, _)| name.as_str())
        .chain(parsed.instances.keys().map(String::as_str))
        .collect();
    let names: Vec<&str> = names.into_iter().collect();

    let changes: Vec<PlannedChange> = names
        .par_iter()
        .map(|name| {
            let old = old_records
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, record)| record);
            plan_instance(name, old, parsed.instances.get(*name), registry)
        })
        .collect();

    log::debug!("planned {} instance(s)", changes.len());
    Plan { changes }
}

fn plan_instance(
    name: &str,
    old: Option<&InstanceRecord>,
    new: Option<&Instance>,
    registry: &Registry,
) -> PlannedChange {
    let (provider, kind) = match (new, old) {
        (Some(new), _) => (new.provider.as_str(), new.kind.as_str()),
        (None, Some(old)) => (old.provider.as_str(), old.kind.as_str()),
        (None, None) => ("", ""),
    };
    let schema = registry.lookup(provider, kind).ok().map(|k| &k.schema);
    let diff = diff_instance(old, new, schema);

    let kind_changed = match (old, new) {
        (Some(old), Some(new)) if old.provider != new.provider || old.kind != new.kind => {
            Some(ReplaceReason::KindChanged {
                from: format!("{}::{}", old.provider, old.kind),
                to: new.reference(),
            })
        }
        _ => None,
    };

    let record = diff.snapshot();
    let (action, reason) = match record.change_type() {
        ChangeType::Create => (Action::Create, None),
        ChangeType::Destroy => (Action::Destroy, None),
        ChangeType::DestroyCreate if record.destroy_tainted => {
            (Action::Replace, Some(ReplaceReason::Tainted))
        }
        ChangeType::DestroyCreate => {
            let paths = record
                .requires_new_paths()
                .into_iter()
                .map(str::to_string)
                .collect();
            (Action::Replace, Some(ReplaceReason::ForceNew(paths)))
        }
        ChangeType::Update | ChangeType::None if kind_changed.is_some() => {
            (Action::Replace, kind_changed)
        }
        ChangeType::Update => (Action::Update, None),
        ChangeType::None => (Action::NoOp, None),
    };

    if action != Action::NoOp {
        log::debug!("{name}: {action}");
    }

    PlannedChange {
        name: name.to_string(),
        provider: provider.to_string(),
        kind: kind.to_string(),
        action,
        reason,
        diff,
    }
}
