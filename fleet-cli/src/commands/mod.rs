//! CLI command implementations

mod batch;
mod commits;
mod status;

use std::path::PathBuf;

use clap::Subcommand;
use fleet_core::{GitVcs, Project};
use serde::Serialize;

use crate::progress::{ActiveBar, ProgressObserver};

/// Bulk operations over the roster's repositories
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clone repositories for roster members that have none yet
    Clone,

    /// Fast-forward every existing repository
    Pull,

    /// Check out a branch, tag or commit in every repository and export
    /// the switched ones
    Switch {
        /// Branch name, tag or revision
        reference: String,
    },

    /// Export the current commit of every repository as `id,commit` lines
    ExportCommits {
        /// Output CSV file
        file: PathBuf,
    },

    /// Check out the commits listed in a CSV file (first line is a header)
    CheckoutCommits {
        /// Input CSV file
        file: PathBuf,
    },

    /// Compare the roster with the repositories on disk
    Status,
}

/// Where and how command results are presented
pub struct Output {
    /// Print results as JSON on stdout
    pub json: bool,
    /// Bar shared with the log writer while a batch runs
    pub progress: ActiveBar,
}

impl Output {
    fn observer(&self) -> ProgressObserver {
        ProgressObserver::new(self.progress.clone())
    }
}

impl Commands {
    /// Execute the command against an opened project
    pub fn execute(&self, project: &mut Project<GitVcs>, dry_run: bool, out: &Output) -> anyhow::Result<()> {
        match self {
            Self::Clone => batch::clone(project, dry_run, out),
            Self::Pull => batch::pull(project, dry_run, out),
            Self::Switch { reference } => batch::switch(project, reference, out),
            Self::ExportCommits { file } => commits::export(project, file, out.json),
            Self::CheckoutCommits { file } => commits::checkout(project, file, out),
            Self::Status => status::show(project, out.json),
        }
    }
}

/// Print a value as pretty JSON on stdout
fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
