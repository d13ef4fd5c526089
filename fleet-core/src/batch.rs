//! Bulk operations over a working set
//!
//! Every member of the working set is visited exactly once, in order. A
//! failure is recorded as that member's outcome and the batch moves on;
//! nothing raised by the version-control layer escapes [`BatchExecutor::apply`].

use std::collections::BTreeSet;

use crate::config::{ProjectLayout, RemoteConfig};
use crate::locator::{self, RepoRecord, RepoSet};
use crate::report::{BatchObserver, BatchReport, OperationKind, OperationOutcome};
use crate::roster::MemberId;
use crate::snapshot::SnapshotRecord;
use crate::vcs::Vcs;

/// An operation together with the working set it acts on
#[derive(Debug, Clone)]
pub enum Operation {
    /// Clone members that have no working copy yet
    Clone(BTreeSet<MemberId>),
    /// Fast-forward existing working copies
    Pull(Vec<RepoRecord>),
    /// Check out a branch, tag or revision in existing working copies
    Switch {
        reference: String,
        records: Vec<RepoRecord>,
    },
    /// Restore working copies to pinned commits
    CheckoutCommits(Vec<SnapshotRecord>),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Clone(_) => OperationKind::Clone,
            Self::Pull(_) => OperationKind::Pull,
            Self::Switch { .. } => OperationKind::Switch,
            Self::CheckoutCommits(_) => OperationKind::CheckoutCommit,
        }
    }

    /// Size of the working set
    pub fn len(&self) -> usize {
        match self {
            Self::Clone(ids) => ids.len(),
            Self::Pull(records) | Self::Switch { records, .. } => records.len(),
            Self::CheckoutCommits(snapshot) => snapshot.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Applies operations to working sets, one member at a time
///
/// The executor owns the live set of located working copies; a successful
/// clone adds the new working copy to it so later operations in the same run
/// see it.
#[derive(Debug)]
pub struct BatchExecutor<V> {
    vcs: V,
    layout: ProjectLayout,
    remote: RemoteConfig,
    repos: RepoSet,
    dry_run: bool,
}

impl<V: Vcs> BatchExecutor<V> {
    pub fn new(
        vcs: V,
        layout: ProjectLayout,
        remote: RemoteConfig,
        repos: RepoSet,
        dry_run: bool,
    ) -> Self {
        Self {
            vcs,
            layout,
            remote,
            repos,
            dry_run,
        }
    }

    /// Working copies known to this executor
    pub fn repos(&self) -> &RepoSet {
        &self.repos
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run `operation` over its whole working set
    ///
    /// The returned report holds exactly one outcome per working-set element.
    pub fn apply(&mut self, operation: Operation, observer: &mut dyn BatchObserver) -> BatchReport {
        let kind = operation.kind();
        let total = operation.len();
        observer.on_start(kind, total);

        let mut outcomes = Vec::with_capacity(total);
        let mut emit = |outcome: OperationOutcome| {
            tracing::debug!(operation = %kind, member = %outcome.id, status = ?outcome.status, "Member done");
            observer.on_outcome(&outcome);
            outcomes.push(outcome);
        };

        match operation {
            Operation::Clone(ids) => {
                for id in ids {
                    emit(self.clone_one(id));
                }
            }
            Operation::Pull(records) => {
                for record in &records {
                    emit(self.pull_one(record));
                }
            }
            Operation::Switch { reference, records } => {
                for record in &records {
                    emit(self.switch_one(record, &reference));
                }
            }
            Operation::CheckoutCommits(snapshot) => {
                for record in snapshot {
                    emit(self.checkout_commit_one(record));
                }
            }
        }

        let report = BatchReport {
            operation: kind,
            dry_run: self.dry_run,
            outcomes,
        };
        observer.on_finish(&report);
        report
    }

    fn clone_one(&mut self, id: MemberId) -> OperationOutcome {
        let url = self.remote.url_for(&id, self.layout.project());
        let dest = self.layout.member_path(&id);

        if self.dry_run {
            tracing::info!(member = %id, %url, "Dry run [clone]");
            return OperationOutcome::dry_run(id);
        }

        if let Err(e) = self.vcs.clone_repo(&url, &dest) {
            return OperationOutcome::failed(id, format!("failed to clone {}: {}", url, e));
        }

        match locator::inspect(&dest) {
            Some(record) => {
                self.repos.insert(record);
                OperationOutcome::succeeded(id)
            }
            None => OperationOutcome::failed(
                id,
                format!("clone of {} left no working copy at {}", url, dest.display()),
            ),
        }
    }

    fn pull_one(&self, record: &RepoRecord) -> OperationOutcome {
        let id = record.id().clone();

        if self.dry_run {
            tracing::info!(member = %id, "Dry run [pull]");
            return OperationOutcome::dry_run(id);
        }

        match self.vcs.pull(record.path()) {
            Ok(()) => OperationOutcome::succeeded(id),
            Err(e) => OperationOutcome::failed(id, format!("failed to pull: {}", e)),
        }
    }

    fn switch_one(&self, record: &RepoRecord, reference: &str) -> OperationOutcome {
        let id = record.id().clone();

        if self.dry_run {
            tracing::info!(member = %id, %reference, "Dry run [switch]");
            return OperationOutcome::dry_run(id);
        }

        match self.vcs.checkout(record.path(), reference) {
            Ok(()) => OperationOutcome::succeeded(id),
            Err(e) => OperationOutcome::failed(id, format!("failed to switch to {}: {}", reference, e)),
        }
    }

    fn checkout_commit_one(&self, record: SnapshotRecord) -> OperationOutcome {
        let SnapshotRecord { id, commit } = record;
        let path = self.layout.member_path(&id);

        if !path.exists() {
            tracing::warn!(member = %id, path = %path.display(), "Repository does not exist");
            return OperationOutcome::skipped(id, "repository does not exist");
        }

        if self.dry_run {
            tracing::info!(member = %id, %commit, "Dry run [checkout-commits]");
            return OperationOutcome::dry_run(id);
        }

        match self.vcs.checkout(&path, &commit) {
            Ok(()) => OperationOutcome::succeeded(id),
            Err(e) => OperationOutcome::failed(id, format!("failed to check out {}: {}", commit, e)),
        }
    }
}
