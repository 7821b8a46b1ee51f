//! # State
//!
//! What schematic has applied, and what applying a configuration would
//! change.
//!
//! - [`record`]: persisted instances, captures and data sources
//! - [`diff`]: attribute diffs between persisted and declared instances
//! - [`plan`]: per-instance actions, diffed in parallel
//! - [`store`]: the JSON state file, taint tracking and commits
//!
//! Each [`InstanceState`] and [`InstanceDiff`] owns its own lock, so
//! instances can be diffed and tainted independently.

pub mod diff;
mod error;
pub mod plan;
pub mod record;
pub mod store;

pub use diff::{AttrDiff, ChangeType, DiffRecord, InstanceDiff, diff_instance};
pub use error::{Result, StateError};
pub use plan::{Action, Plan, PlannedChange, ReplaceReason, Summary, plan};
pub use record::{Capture, Data, InstanceRecord, InstanceState};
pub use store::{JsonSchmState, ModuleState, load, save};
