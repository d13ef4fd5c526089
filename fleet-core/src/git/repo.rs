//! Local working copy operations backed by libgit2

use std::path::Path;

use git2::build::CheckoutBuilder;
use git2::{BranchType, Commit, Repository};

use crate::{Error, Result};

/// Remote consulted when a branch exists only as a remote-tracking branch
const DEFAULT_REMOTE: &str = "origin";

/// A member's working copy
pub struct GitRepo {
    repo: Repository,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("workdir", &self.repo.workdir())
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open the working copy rooted exactly at `path`
    ///
    /// Unlike discovery this does not search parent directories, so a member
    /// directory without its own `.git` is never mistaken for an enclosing
    /// repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::Config(format!("Not a git repository: {}", path.display()))
            } else {
                Error::Git(e)
            }
        })?;

        if repo.is_bare() {
            return Err(Error::Config("Bare repositories are not supported".to_string()));
        }

        Ok(Self { repo })
    }

    /// Full SHA of the commit HEAD points at
    pub fn head_commit(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    /// Get the current branch name, or `None` when HEAD is detached or unborn
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(Error::Git(e)),
        };

        if head.is_branch() {
            Ok(head.shorthand().map(|s| s.to_string()))
        } else {
            Ok(None)
        }
    }

    /// Check out a branch, tag or revision
    ///
    /// Resolution order:
    /// 1. Local branch `<reference>`
    /// 2. Remote-tracking branch `origin/<reference>`; a local branch tracking
    ///    it is created
    /// 3. Any revision expression (tag, full or abbreviated SHA), leaving HEAD
    ///    detached
    ///
    /// Checkout is safe: local modifications that would be overwritten make
    /// the checkout fail instead of being discarded.
    pub fn checkout(&self, reference: &str) -> Result<()> {
        let repo = &self.repo;

        if let Ok(branch) = repo.find_branch(reference, BranchType::Local) {
            let commit = branch.get().peel_to_commit()?;
            let refname = branch
                .get()
                .name()
                .ok_or_else(|| Error::Config(format!("Branch '{}' has a non-UTF-8 name", reference)))?
                .to_string();

            self.checkout_tree(&commit)?;
            repo.set_head(&refname)?;
            return Ok(());
        }

        let tracking = format!("{}/{}", DEFAULT_REMOTE, reference);
        if let Ok(remote_branch) = repo.find_branch(&tracking, BranchType::Remote) {
            let commit = remote_branch.get().peel_to_commit()?;

            self.checkout_tree(&commit)?;
            let mut local = repo.branch(reference, &commit, false)?;
            local.set_upstream(Some(tracking.as_str()))?;
            repo.set_head(&format!("refs/heads/{}", reference))?;
            return Ok(());
        }

        let commit = repo.revparse_single(reference)?.peel_to_commit()?;
        self.checkout_tree(&commit)?;
        repo.set_head_detached(commit.id())?;

        Ok(())
    }

    fn checkout_tree(&self, commit: &Commit<'_>) -> Result<()> {
        let mut options = CheckoutBuilder::new();
        options.safe();
        self.repo.checkout_tree(commit.as_object(), Some(&mut options))?;
        Ok(())
    }

    /// Get access to the underlying git2 repository
    pub fn inner(&self) -> &Repository {
        &self.repo
    }
}
