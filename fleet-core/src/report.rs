//! Per-member outcomes and batch summaries

use std::fmt;

use serde::Serialize;

use crate::roster::MemberId;

/// Kind of bulk operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Clone,
    Pull,
    Switch,
    CheckoutCommit,
}

impl OperationKind {
    /// Command name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::Pull => "pull",
            Self::Switch => "switch",
            Self::CheckoutCommit => "checkout-commits",
        }
    }

    /// Past tense used in summaries
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Clone => "cloned",
            Self::Pull => "pulled",
            Self::Switch => "switched",
            Self::CheckoutCommit => "checked out",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happened to one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum OutcomeStatus {
    /// The operation was performed
    Succeeded,
    /// Dry run; nothing was performed
    DryRun,
    /// The operation was attempted and failed
    Failed { error: String },
    /// There was nothing to act on
    Skipped { reason: String },
}

/// Result of applying an operation to one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub id: MemberId,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl OperationOutcome {
    pub fn succeeded(id: MemberId) -> Self {
        Self {
            id,
            status: OutcomeStatus::Succeeded,
        }
    }

    pub fn dry_run(id: MemberId) -> Self {
        Self {
            id,
            status: OutcomeStatus::DryRun,
        }
    }

    pub fn failed(id: MemberId, error: impl Into<String>) -> Self {
        Self {
            id,
            status: OutcomeStatus::Failed {
                error: error.into(),
            },
        }
    }

    pub fn skipped(id: MemberId, reason: impl Into<String>) -> Self {
        Self {
            id,
            status: OutcomeStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    /// Succeeded or dry run
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Succeeded | OutcomeStatus::DryRun)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, OutcomeStatus::Skipped { .. })
    }
}

/// Outcomes of one batch, in working-set order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub operation: OperationKind,
    pub dry_run: bool,
    pub outcomes: Vec<OperationOutcome>,
}

impl BatchReport {
    /// Members the operation was actually performed for
    pub fn succeeded(&self) -> impl Iterator<Item = &MemberId> {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Succeeded)
            .map(|o| &o.id)
    }

    pub fn failures(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Aggregate counts against the roster size
    pub fn summary(&self, roster_size: usize) -> BatchSummary {
        let skipped = self.outcomes.iter().filter(|o| o.is_skipped()).count();
        let failed = self.failures().count();
        let succeeded = self.outcomes.iter().filter(|o| o.is_success()).count();

        BatchSummary {
            operation: self.operation,
            dry_run: self.dry_run,
            succeeded,
            attempted: self.outcomes.len() - skipped,
            failed,
            skipped,
            roster: roster_size,
        }
    }
}

/// End-of-batch counts
///
/// `attempted` excludes skipped members; `roster` is the number of members
/// the fleet should have, so drift between roster and disk stays visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub operation: OperationKind,
    pub dry_run: bool,
    pub succeeded: usize,
    pub attempted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub roster: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = self.operation.verb();
        if self.dry_run {
            write!(f, "[dry run] ")?;
        }
        write!(
            f,
            "{} {}/{}/{} ({}/total repos/roster members)",
            verb, self.succeeded, self.attempted, self.roster, verb
        )?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        Ok(())
    }
}

/// Receives batch progress as it happens
///
/// Outcomes are delivered immediately after each member, so failures can be
/// shown while a long batch is still running.
pub trait BatchObserver {
    /// Called before the first member with the working-set size
    fn on_start(&mut self, _operation: OperationKind, _total: usize) {}

    /// Called once per member
    fn on_outcome(&mut self, outcome: &OperationOutcome);

    /// Called after the last member
    fn on_finish(&mut self, _report: &BatchReport) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {
    fn on_outcome(&mut self, _outcome: &OperationOutcome) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<OperationOutcome>) -> BatchReport {
        BatchReport {
            operation: OperationKind::Switch,
            dry_run: false,
            outcomes,
        }
    }

    #[test]
    fn test_summary_counts() {
        let report = report(vec![
            OperationOutcome::succeeded(MemberId::from("1")),
            OperationOutcome::failed(MemberId::from("2"), "boom"),
            OperationOutcome::succeeded(MemberId::from("3")),
            OperationOutcome::skipped(MemberId::from("4"), "no working copy"),
        ]);

        let summary = report.summary(5);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(
            summary.to_string(),
            "switched 2/3/5 (switched/total repos/roster members), 1 failed, 1 skipped"
        );
    }

    #[test]
    fn test_succeeded_excludes_dry_run() {
        let report = report(vec![
            OperationOutcome::dry_run(MemberId::from("1")),
            OperationOutcome::succeeded(MemberId::from("2")),
        ]);

        let ids: Vec<&str> = report.succeeded().map(MemberId::as_str).collect();
        assert_eq!(ids, vec!["2"]);
        assert_eq!(report.summary(2).succeeded, 2);
    }

    #[test]
    fn test_dry_run_summary_prefix() {
        let report = BatchReport {
            operation: OperationKind::Clone,
            dry_run: true,
            outcomes: vec![OperationOutcome::dry_run(MemberId::from("1"))],
        };

        assert_eq!(
            report.summary(1).to_string(),
            "[dry run] cloned 1/1/1 (cloned/total repos/roster members)"
        );
    }
}
