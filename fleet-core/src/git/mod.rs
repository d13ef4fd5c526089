//! Git operations for fleet
//!
//! Clone and pull shell out to the system `git`; local checkout and revision
//! queries use libgit2.

mod command;
mod repo;

pub use command::is_available;
pub(crate) use command::{clone, pull_ff_only};
pub use repo::GitRepo;
