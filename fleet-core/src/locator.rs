//! Discovery of member working copies on disk

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::roster::MemberId;
use crate::{Error, Result};

/// Marker whose presence makes a directory a working copy
const GIT_MARKER: &str = ".git";

/// Identity and location of one member's working copy
///
/// Only the locator constructs records, so a record always refers to a
/// directory that held a working copy when it was inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRecord {
    id: MemberId,
    path: PathBuf,
}

impl RepoRecord {
    /// Member the working copy belongs to
    pub fn id(&self) -> &MemberId {
        &self.id
    }

    /// Working tree root
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Located working copies keyed by member id
#[derive(Debug, Clone, Default)]
pub struct RepoSet {
    records: BTreeMap<MemberId, RepoRecord>,
}

impl RepoSet {
    /// Number of located working copies
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no working copies were located
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up the record for a member
    pub fn get(&self, id: &MemberId) -> Option<&RepoRecord> {
        self.records.get(id)
    }

    /// Whether a working copy exists for a member
    pub fn contains(&self, id: &MemberId) -> bool {
        self.records.contains_key(id)
    }

    /// Iterate records in member order
    pub fn iter(&self) -> btree_map::Values<'_, MemberId, RepoRecord> {
        self.records.values()
    }

    /// Member ids with a working copy
    pub fn ids(&self) -> BTreeSet<MemberId> {
        self.records.keys().cloned().collect()
    }

    pub(crate) fn insert(&mut self, record: RepoRecord) {
        self.records.insert(record.id.clone(), record);
    }
}

impl<'a> IntoIterator for &'a RepoSet {
    type Item = &'a RepoRecord;
    type IntoIter = btree_map::Values<'a, MemberId, RepoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Inspect a single directory, returning a record if it is a working copy
///
/// The directory name is the member id; names that are not valid UTF-8 are
/// not member directories.
pub fn inspect(dir: &Path) -> Option<RepoRecord> {
    if !dir.is_dir() || !dir.join(GIT_MARKER).exists() {
        return None;
    }

    let id = dir.file_name()?.to_str()?;
    Some(RepoRecord {
        id: MemberId::new(id),
        path: dir.to_path_buf(),
    })
}

/// Scan the immediate subdirectories of `base_dir` for working copies
///
/// A missing `base_dir` is an empty fleet.
pub fn locate(base_dir: &Path) -> Result<RepoSet> {
    let mut set = RepoSet::default();

    let entries = match fs::read_dir(base_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(dir = %base_dir.display(), "No repositories found. Please clone first.");
            return Ok(set);
        }
        Err(e) => return Err(Error::Io(e)),
    };

    for entry in entries {
        let entry = entry?;
        if let Some(record) = inspect(&entry.path()) {
            set.insert(record);
        }
    }

    if set.is_empty() {
        tracing::warn!(dir = %base_dir.display(), "No repositories found. Please clone first.");
    } else {
        tracing::debug!(dir = %base_dir.display(), located = set.len(), "Located repositories");
    }

    Ok(set)
}
