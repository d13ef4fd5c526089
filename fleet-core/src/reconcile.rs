//! Roster versus on-disk membership
//!
//! All results are derived sets; neither input is ever modified.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::locator::{RepoRecord, RepoSet};
use crate::roster::{MemberId, Roster};

/// Difference between the roster and some set of member ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Drift {
    /// In the roster but not in the compared set
    pub missing: BTreeSet<MemberId>,
    /// In the compared set but not in the roster
    pub extra: BTreeSet<MemberId>,
}

impl Drift {
    /// Whether the compared set matches the roster exactly
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Compares a roster against located working copies
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    roster: &'a Roster,
    repos: &'a RepoSet,
}

impl<'a> Reconciler<'a> {
    pub fn new(roster: &'a Roster, repos: &'a RepoSet) -> Self {
        Self { roster, repos }
    }

    /// Roster members without a working copy
    pub fn missing(&self) -> BTreeSet<MemberId> {
        self.roster
            .iter()
            .filter(|id| !self.repos.contains(id))
            .cloned()
            .collect()
    }

    /// Every located working copy
    pub fn present(&self) -> Vec<RepoRecord> {
        self.repos.iter().cloned().collect()
    }

    /// Working copies of members not on the roster
    pub fn extra(&self) -> BTreeSet<MemberId> {
        self.repos
            .iter()
            .map(RepoRecord::id)
            .filter(|id| !self.roster.contains(id))
            .cloned()
            .collect()
    }

    /// Compare an arbitrary id set (e.g. from a snapshot) to the roster
    pub fn drift_against_roster<'i>(&self, ids: impl IntoIterator<Item = &'i MemberId>) -> Drift {
        let ids: BTreeSet<&MemberId> = ids.into_iter().collect();

        Drift {
            missing: self
                .roster
                .iter()
                .filter(|id| !ids.contains(id))
                .cloned()
                .collect(),
            extra: ids
                .into_iter()
                .filter(|id| !self.roster.contains(id))
                .cloned()
                .collect(),
        }
    }
}
