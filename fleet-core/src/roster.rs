//! Roster of fleet members
//!
//! A roster is the authoritative set of member identifiers a fleet should
//! contain. It is loaded once from a line-delimited file and never mutated.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Opaque identifier of a roster member (e.g. a student number)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Create a member id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is usable as a member directory name
    ///
    /// Working copies live at `<repo_dir>/<id>` and are located by directory
    /// name, so the id must be exactly one normal path component: no
    /// separators, no `.` or `..`.
    pub fn is_directory_name(&self) -> bool {
        let mut components = Path::new(&self.0).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => name == self.0.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Immutable set of member identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: BTreeSet<MemberId>,
}

impl Roster {
    /// Load a roster from a newline-separated file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Roster(format!("Failed to read roster {}: {}", path.display(), e))
        })?;

        let roster = Self::parse(&contents);
        if roster.is_empty() {
            tracing::warn!(path = %path.display(), "Roster is empty");
        } else {
            tracing::debug!(path = %path.display(), members = roster.len(), "Roster loaded");
        }

        Ok(roster)
    }

    /// Parse roster contents: one identifier per line, blank lines ignored
    ///
    /// Lines that cannot name a member directory are skipped with a warning.
    pub fn parse(contents: &str) -> Self {
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(MemberId::new)
            .filter(|id| {
                let valid = id.is_directory_name();
                if !valid {
                    tracing::warn!(member = %id, "Skipping roster entry that is not a plain directory name");
                }
                valid
            })
            .collect()
    }

    /// Check whether the roster lists the given member
    pub fn contains(&self, id: &MemberId) -> bool {
        self.members.contains(id)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the roster has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate members in identifier order
    pub fn iter(&self) -> impl Iterator<Item = &MemberId> {
        self.members.iter()
    }

    /// Borrow the underlying set
    pub fn members(&self) -> &BTreeSet<MemberId> {
        &self.members
    }
}

impl FromIterator<MemberId> for Roster {
    fn from_iter<I: IntoIterator<Item = MemberId>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_skips_blank_lines() {
        let roster = Roster::parse("001\n\n  002  \n\n003\n");
        assert_eq!(roster.len(), 3);
        assert!(roster.contains(&MemberId::from("002")));
    }

    #[test]
    fn test_parse_collapses_duplicates() {
        let roster = Roster::parse("001\n001\n002\n");
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_parse_handles_crlf() {
        let roster = Roster::parse("001\r\n002\r\n");
        let ids: Vec<&str> = roster.iter().map(MemberId::as_str).collect();
        assert_eq!(ids, vec!["001", "002"]);
    }

    #[test]
    fn test_directory_name_ids() {
        assert!(MemberId::from("001").is_directory_name());
        assert!(MemberId::from("s.smith").is_directory_name());

        for id in ["a/b", "a/", "../victim", "..", ".", "./a", "/abs", "a/."] {
            assert!(!MemberId::from(id).is_directory_name(), "{id} accepted");
        }
    }

    #[test]
    fn test_parse_skips_ids_with_path_separators() {
        let roster = Roster::parse("001\na/b\n../other/victim\n..\n002\n");
        let ids: Vec<&str> = roster.iter().map(MemberId::as_str).collect();
        assert_eq!(ids, vec!["001", "002"]);
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("roster.txt");
        std::fs::write(&path, "b\na\n").unwrap();

        let roster = Roster::load(&path).unwrap();
        let ids: Vec<String> = roster.iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let result = Roster::load(temp.path().join("nope.txt"));
        assert!(matches!(result, Err(Error::Roster(_))));
    }
}
