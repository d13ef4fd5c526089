//! A roster's fleet of working copies for one project

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::batch::{BatchExecutor, Operation};
use crate::config::Config;
use crate::locator::{self, RepoRecord, RepoSet};
use crate::reconcile::{Drift, Reconciler};
use crate::report::{BatchObserver, BatchReport};
use crate::roster::{MemberId, Roster};
use crate::snapshot;
use crate::vcs::Vcs;
use crate::{Error, Result};

/// Result of restoring a fleet from a snapshot file
#[derive(Debug, Clone)]
pub struct RestoreReport {
    pub report: BatchReport,
    /// Snapshot ids compared to the roster
    pub drift: Drift,
}

/// Result of switching a fleet to a reference
#[derive(Debug)]
pub struct SwitchReport {
    pub report: BatchReport,
    /// Set when the switched members could not be exported; the batch itself
    /// still ran to completion
    pub export_error: Option<Error>,
}

/// Roster versus disk at a glance
#[derive(Debug, Clone, Serialize)]
pub struct FleetStatus {
    pub project: String,
    pub roster: usize,
    pub located: usize,
    pub missing: BTreeSet<MemberId>,
    pub extra: BTreeSet<MemberId>,
}

/// Bulk operations for every roster member of one project
#[derive(Debug)]
pub struct Project<V> {
    roster: Roster,
    executor: BatchExecutor<V>,
    switch_export: PathBuf,
}

impl<V: Vcs> Project<V> {
    /// Locate existing working copies of `project` and prepare for batches
    pub fn open(roster: Roster, config: &Config, project: &str, vcs: V, dry_run: bool) -> Result<Self> {
        let layout = config.layout(project);
        let repos = locator::locate(layout.repo_dir())?;

        if !repos.is_empty() {
            tracing::info!(
                "Located {}/{} repositories in {}",
                repos.len(),
                roster.len(),
                layout.repo_dir().display()
            );
        }

        let executor = BatchExecutor::new(vcs, layout, config.remote.clone(), repos, dry_run);
        Ok(Self {
            roster,
            executor,
            switch_export: config.switch_export.clone(),
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Working copies currently known, including ones cloned this run
    pub fn repos(&self) -> &RepoSet {
        self.executor.repos()
    }

    pub fn vcs(&self) -> &V {
        self.executor.vcs()
    }

    pub fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(&self.roster, self.executor.repos())
    }

    pub fn status(&self) -> FleetStatus {
        let reconciler = self.reconciler();
        FleetStatus {
            project: self.executor.layout().project().to_string(),
            roster: self.roster.len(),
            located: self.repos().len(),
            missing: reconciler.missing(),
            extra: reconciler.extra(),
        }
    }

    /// Clone every roster member that has no working copy
    pub fn clone_missing(&mut self, observer: &mut dyn BatchObserver) -> BatchReport {
        if !self.repos().is_empty() {
            tracing::warn!(
                "Only non-existing repositories will be cloned. If you wish to update the existing repositories, use 'pull' instead"
            );
        }

        let operation = Operation::Clone(self.reconciler().missing());
        if operation.is_empty() && !self.roster.is_empty() {
            tracing::info!("Every roster member already has a repository");
        }
        self.run(operation, observer)
    }

    /// Fast-forward every located working copy
    pub fn pull(&mut self, observer: &mut dyn BatchObserver) -> BatchReport {
        if self.repos().is_empty() {
            tracing::warn!("No repositories found. If you wish to clone new repos, use 'clone' instead");
        }

        let records = self.reconciler().present();
        self.run(Operation::Pull(records), observer)
    }

    /// Check out `reference` everywhere, then export the switched members
    ///
    /// The export is written even when nothing switched; in a dry run it is
    /// only logged. A failed export does not discard the batch report.
    pub fn switch(&mut self, reference: &str, observer: &mut dyn BatchObserver) -> SwitchReport {
        if self.repos().is_empty() {
            tracing::warn!("No repositories found. If you wish to clone new repos, use 'clone' instead");
        }

        let records = self.reconciler().present();
        let report = self.run(
            Operation::Switch {
                reference: reference.to_string(),
                records,
            },
            observer,
        );

        let export_error = self.export_switched(&report).err();
        SwitchReport { report, export_error }
    }

    /// Where `switch` exports the members it switched
    pub fn switch_export(&self) -> &Path {
        &self.switch_export
    }

    fn export_switched(&self, report: &BatchReport) -> Result<()> {
        if self.executor.is_dry_run() {
            tracing::info!(path = %self.switch_export.display(), "Dry run: skipping export of switched repositories");
            return Ok(());
        }

        let switched: Vec<&RepoRecord> = report
            .succeeded()
            .filter_map(|id| self.repos().get(id))
            .collect();
        let records = snapshot::capture(self.executor.vcs(), switched)?;
        snapshot::export(&self.switch_export, &records)
    }

    /// Write the current commit of every located working copy to `path`
    pub fn export_commits(&self, path: &Path) -> Result<usize> {
        let records = snapshot::capture(self.executor.vcs(), self.repos())?;
        snapshot::export(path, &records)?;
        Ok(records.len())
    }

    /// Check out the commits listed in a restore file
    pub fn checkout_commits(&mut self, path: &Path, observer: &mut dyn BatchObserver) -> Result<RestoreReport> {
        let records = snapshot::import(path)?;

        let drift = self
            .reconciler()
            .drift_against_roster(records.iter().map(|r| &r.id));
        tracing::info!(
            missing = ?drift.missing.iter().map(MemberId::as_str).collect::<Vec<_>>(),
            extra = ?drift.extra.iter().map(MemberId::as_str).collect::<Vec<_>>(),
            "Snapshot drift against roster"
        );

        let report = self.run(Operation::CheckoutCommits(records), observer);
        Ok(RestoreReport { report, drift })
    }

    fn run(&mut self, operation: Operation, observer: &mut dyn BatchObserver) -> BatchReport {
        let report = self.executor.apply(operation, observer);
        tracing::info!("{}", report.summary(self.roster.len()));
        report
    }
}
