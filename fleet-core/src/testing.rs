//! Test fixtures shared across modules

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use git2::{Oid, Repository, RepositoryInitOptions, Signature};

use crate::vcs::Vcs;
use crate::{Error, Result};

/// Initialise a repository whose unborn HEAD is `main`
pub(crate) fn init_repo(path: &Path) -> Repository {
    let mut options = RepositoryInitOptions::new();
    options.initial_head("main");
    Repository::init_opts(path, &options).unwrap()
}

/// Write `name` with `contents` and commit it on HEAD
pub(crate) fn commit_file(repo: &Repository, name: &str, contents: &str, message: &str) -> Oid {
    let workdir = repo.workdir().unwrap();
    std::fs::write(workdir.join(name), contents).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let sig = Signature::now("Fleet Test", "fleet@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// In-memory [`Vcs`] that records calls and fails for chosen members
///
/// Members are identified by the final component of the path handed to
/// each call. A successful clone creates `<dest>/.git` so the locator
/// recognises the new working copy.
#[derive(Debug, Default)]
pub(crate) struct FakeVcs {
    failing: BTreeSet<String>,
    calls: RefCell<Vec<String>>,
    revisions: RefCell<BTreeMap<String, String>>,
}

impl FakeVcs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every operation on `member` fail
    pub(crate) fn failing_on(mut self, member: &str) -> Self {
        self.failing.insert(member.to_string());
        self
    }

    /// Calls made so far, formatted as `<op> <member>[ <arg>]`
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn member(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    fn record(&self, op: &str, path: &Path, arg: Option<&str>) -> Result<String> {
        let member = Self::member(path);
        let call = match arg {
            Some(arg) => format!("{} {} {}", op, member, arg),
            None => format!("{} {}", op, member),
        };
        self.calls.borrow_mut().push(call);

        if self.failing.contains(&member) {
            return Err(Error::Vcs {
                command: op.to_string(),
                stderr: format!("simulated failure for {}", member),
            });
        }

        Ok(member)
    }
}

impl Vcs for FakeVcs {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        self.record("clone", dest, Some(url))?;
        std::fs::create_dir_all(dest.join(".git"))?;
        Ok(())
    }

    fn pull(&self, path: &Path) -> Result<()> {
        self.record("pull", path, None).map(|_| ())
    }

    fn checkout(&self, path: &Path, reference: &str) -> Result<()> {
        let member = self.record("checkout", path, Some(reference))?;
        self.revisions
            .borrow_mut()
            .insert(member, reference.to_string());
        Ok(())
    }

    fn current_revision(&self, path: &Path) -> Result<String> {
        let member = Self::member(path);
        if self.failing.contains(&member) {
            return Err(Error::Vcs {
                command: "rev-parse".to_string(),
                stderr: format!("simulated failure for {}", member),
            });
        }

        Ok(self
            .revisions
            .borrow()
            .get(&member)
            .cloned()
            .unwrap_or_else(|| format!("rev-{}", member)))
    }
}

/// Create `<base>/<id>/.git` for each id
pub(crate) fn fake_working_copies(base: &Path, ids: &[&str]) {
    for id in ids {
        std::fs::create_dir_all(base.join(id).join(".git")).unwrap();
    }
}
