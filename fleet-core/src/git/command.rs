//! Wrappers around the system `git` binary
//!
//! Network operations go through the installed `git` so the user's SSH
//! configuration (agents, multiplexed control masters) applies unchanged.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::{Error, Result};

/// Build a non-interactive `git` command
fn git(git_path: &str, subcommand: &str) -> Command {
    let mut cmd = Command::new(git_path);
    cmd.arg(subcommand)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

/// Run a prepared command, turning a non-zero exit into [`Error::Vcs`]
fn run(mut cmd: Command, subcommand: &str) -> Result<()> {
    let output = cmd.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::Config("git executable not found. Is git installed?".to_string())
        } else {
            Error::Io(e)
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Vcs {
            command: subcommand.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(())
}

/// Run `git clone <url> <dest>`, creating the parent of `dest` first
pub fn clone(git_path: &str, url: &str, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut cmd = git(git_path, "clone");
    cmd.arg(url).arg(dest);

    tracing::debug!(%url, dest = %dest.display(), "spawning git clone");
    run(cmd, "clone")
}

/// Run `git pull --ff-only` inside a working copy
pub fn pull_ff_only(git_path: &str, repo_path: &Path) -> Result<()> {
    let mut cmd = git(git_path, "pull");
    cmd.arg("--ff-only").current_dir(repo_path);

    tracing::debug!(repo = %repo_path.display(), "spawning git pull");
    run(cmd, "pull")
}

/// Check whether the `git` binary can be executed
pub fn is_available(git_path: impl AsRef<OsStr>) -> bool {
    Command::new(git_path)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_reports_stderr_on_failure() {
        if !is_available("git") {
            return;
        }

        let temp = TempDir::new().unwrap();
        let result = pull_ff_only("git", temp.path());

        match result {
            Err(Error::Vcs { command, stderr }) => {
                assert_eq!(command, "pull");
                assert!(!stderr.is_empty());
            }
            other => panic!("expected Vcs error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_executable_is_config_error() {
        let temp = TempDir::new().unwrap();
        let result = pull_ff_only("/nonexistent/git-binary", temp.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
