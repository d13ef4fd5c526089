//! Fleet Core - roster-driven management of many git working copies
//!
//! A [`Roster`] says which members should have a working copy; the
//! [`locator`] finds the ones that actually exist; a [`Reconciler`] derives
//! the working set for each bulk operation; a [`BatchExecutor`] runs it with
//! per-member failure isolation; and [`snapshot`] exports and restores the
//! commit each working copy is pinned to.

pub mod batch;
pub mod config;
pub mod error;
pub mod git;
pub mod locator;
pub mod project;
pub mod reconcile;
pub mod report;
pub mod roster;
pub mod snapshot;
pub mod vcs;

#[cfg(test)]
mod testing;

pub use batch::{BatchExecutor, Operation};
pub use config::{Config, ProjectLayout, RemoteConfig};
pub use error::{Error, Result};
pub use locator::{locate, RepoRecord, RepoSet};
pub use project::{FleetStatus, Project, RestoreReport, SwitchReport};
pub use reconcile::{Drift, Reconciler};
pub use report::{
    BatchObserver, BatchReport, BatchSummary, NoopObserver, OperationKind, OperationOutcome,
    OutcomeStatus,
};
pub use roster::{MemberId, Roster};
pub use snapshot::SnapshotRecord;
pub use vcs::{GitVcs, Vcs};
