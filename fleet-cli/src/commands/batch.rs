//! clone, pull and switch

use anyhow::bail;
use fleet_core::{BatchReport, BatchSummary, Drift, GitVcs, OperationOutcome, Project, Vcs};
use serde::Serialize;

use super::{print_json, Output};

/// JSON shape of a finished batch
#[derive(Serialize)]
pub(super) struct BatchOutput<'a> {
    pub summary: BatchSummary,
    pub outcomes: &'a [OperationOutcome],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drift: Option<&'a Drift>,
}

/// Print the JSON form of a report when requested
pub(super) fn finish<V: Vcs>(
    project: &Project<V>,
    report: &BatchReport,
    drift: Option<&Drift>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        print_json(&BatchOutput {
            summary: report.summary(project.roster().len()),
            outcomes: &report.outcomes,
            drift,
        })?;
    }
    Ok(())
}

/// Network operations need the git binary; without it every member would fail
fn require_git(project: &Project<GitVcs>, dry_run: bool) -> anyhow::Result<()> {
    if !dry_run && !project.vcs().is_available() {
        bail!("git executable not found. Is git installed?");
    }
    Ok(())
}

pub fn clone(project: &mut Project<GitVcs>, dry_run: bool, out: &Output) -> anyhow::Result<()> {
    require_git(project, dry_run)?;
    let report = project.clone_missing(&mut out.observer());
    finish(project, &report, None, out.json)
}

pub fn pull(project: &mut Project<GitVcs>, dry_run: bool, out: &Output) -> anyhow::Result<()> {
    require_git(project, dry_run)?;
    let report = project.pull(&mut out.observer());
    finish(project, &report, None, out.json)
}

/// Per-member outcomes are printed before a failed export is reported
pub fn switch(project: &mut Project<GitVcs>, reference: &str, out: &Output) -> anyhow::Result<()> {
    let switched = project.switch(reference, &mut out.observer());
    finish(project, &switched.report, None, out.json)?;

    if let Some(e) = switched.export_error {
        let path = project.switch_export().display().to_string();
        return Err(anyhow::Error::new(e).context(format!("Failed to export switched repositories to {}", path)));
    }
    Ok(())
}
