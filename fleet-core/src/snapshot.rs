//! Commit snapshots of a fleet
//!
//! An exported snapshot is a headerless CSV of `id,commit` lines. Restore
//! files are read with their first line discarded as a header, whatever it
//! contains; a file produced by [`export`] therefore loses its first record
//! when fed straight back to [`import`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::locator::RepoRecord;
use crate::roster::MemberId;
use crate::vcs::Vcs;
use crate::{Error, Result};

/// A member pinned to a revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: MemberId,
    pub commit: String,
}

impl SnapshotRecord {
    pub fn new(id: MemberId, commit: impl Into<String>) -> Self {
        Self {
            id,
            commit: commit.into(),
        }
    }
}

/// Read the current revision of every record
///
/// Fails as a whole if any revision cannot be read, so an export always has
/// exactly one line per record.
pub fn capture<'a, V>(vcs: &V, records: impl IntoIterator<Item = &'a RepoRecord>) -> Result<Vec<SnapshotRecord>>
where
    V: Vcs + ?Sized,
{
    records
        .into_iter()
        .map(|record| {
            let commit = vcs.current_revision(record.path()).map_err(|e| {
                Error::Snapshot(format!("Failed to read HEAD of {}: {}", record.id(), e))
            })?;
            Ok(SnapshotRecord::new(record.id().clone(), commit))
        })
        .collect()
}

/// Write records as `id,commit` lines without a header
pub fn export(path: &Path, records: &[SnapshotRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| Error::Snapshot(format!("Failed to create {}: {}", path.display(), e)))?;

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), records = records.len(), "Exported commits");
    Ok(())
}

/// Read a restore file, discarding its first line
pub fn import(path: &Path) -> Result<Vec<SnapshotRecord>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::Snapshot(format!("Failed to read {}: {}", path.display(), e)))?;

    let (header, body) = contents.split_once('\n').unwrap_or((contents.as_str(), ""));
    tracing::debug!(path = %path.display(), header = header.trim_end(), "Discarding header line");

    parse_body(path, body)
}

fn parse_body(path: &Path, body: &str) -> Result<Vec<SnapshotRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        // +1 for the discarded header line
        let line = row.position().map_or(0, |p| p.line()) + 1;

        if row.len() != 2 || row.iter().any(str::is_empty) {
            return Err(Error::Snapshot(format!(
                "{}:{}: expected `id,commit`, found `{}`",
                path.display(),
                line,
                row.iter().collect::<Vec<_>>().join(",")
            )));
        }

        let record: SnapshotRecord = row.deserialize(None)?;
        if !record.id.is_directory_name() {
            return Err(Error::Snapshot(format!(
                "{}:{}: `{}` is not a plain member directory name",
                path.display(),
                line,
                record.id
            )));
        }
        records.push(record);
    }

    Ok(records)
}
