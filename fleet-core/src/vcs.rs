//! Version-control capability used by batch operations
//!
//! Repository records are plain identity values; everything that touches a
//! working copy goes through this trait so batches can run against a fake.

use std::path::Path;

use crate::git::{self, GitRepo};
use crate::Result;

/// Operations the batch executor needs from a version-control system
pub trait Vcs {
    /// Clone `url` into `dest`
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Fast-forward the working copy at `path` to its upstream
    fn pull(&self, path: &Path) -> Result<()>;

    /// Check out a branch, tag or revision in the working copy at `path`
    fn checkout(&self, path: &Path, reference: &str) -> Result<()>;

    /// Revision HEAD currently points at
    fn current_revision(&self, path: &Path) -> Result<String>;
}

/// [`Vcs`] implementation backed by git
#[derive(Debug, Clone)]
pub struct GitVcs {
    git_path: String,
}

impl GitVcs {
    /// Create a git backend using `git` from `PATH`
    pub fn new() -> Self {
        Self {
            git_path: "git".to_string(),
        }
    }

    /// Use a specific git executable
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.git_path = path.into();
        self
    }

    /// Check if the git executable is available
    pub fn is_available(&self) -> bool {
        git::is_available(&self.git_path)
    }
}

impl Default for GitVcs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vcs for GitVcs {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        git::clone(&self.git_path, url, dest)
    }

    fn pull(&self, path: &Path) -> Result<()> {
        git::pull_ff_only(&self.git_path, path)
    }

    fn checkout(&self, path: &Path, reference: &str) -> Result<()> {
        GitRepo::open(path)?.checkout(reference)
    }

    fn current_revision(&self, path: &Path) -> Result<String> {
        GitRepo::open(path)?.head_commit()
    }
}
