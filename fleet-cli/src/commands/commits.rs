//! export-commits and checkout-commits

use std::path::Path;

use anyhow::Context;
use fleet_core::{GitVcs, Project};
use serde::Serialize;

use super::batch::finish;
use super::{print_json, Output};

#[derive(Serialize)]
struct ExportOutput<'a> {
    path: &'a Path,
    exported: usize,
}

pub fn export(project: &Project<GitVcs>, file: &Path, json: bool) -> anyhow::Result<()> {
    let exported = project
        .export_commits(file)
        .with_context(|| format!("Failed to export commits to {}", file.display()))?;

    if json {
        print_json(&ExportOutput { path: file, exported })?;
    }
    Ok(())
}

pub fn checkout(project: &mut Project<GitVcs>, file: &Path, out: &Output) -> anyhow::Result<()> {
    let restored = project
        .checkout_commits(file, &mut out.observer())
        .with_context(|| format!("Failed to restore commits from {}", file.display()))?;

    finish(project, &restored.report, Some(&restored.drift), out.json)
}
