//! Local side of the mirror: atomic file replacement and directory hygiene.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use filetime::FileTime;
use tempfile::NamedTempFile;

use crate::filter::is_listing_artifact;

/// Prefix of the hidden temporaries a run writes before renaming into place.
pub const PARTIAL_PREFIX: &str = ".vog-sync-";

pub fn is_partial_download(file_name: &str) -> bool {
    file_name.starts_with(PARTIAL_PREFIX)
}

/// A file being written next to its final destination.
///
/// Content only becomes visible under the destination name on [`commit`],
/// so an interrupted run leaves either the old file or the new one, never a
/// truncated mix. Dropping without committing deletes the temporary.
///
/// [`commit`]: PartialFile::commit
pub struct PartialFile {
    tmp: NamedTempFile,
    dest: PathBuf,
    written: u64,
}

impl PartialFile {
    pub fn create(dir: &Path, file_name: &str) -> io::Result<Self> {
        let tmp = tempfile::Builder::new()
            .prefix(PARTIAL_PREFIX)
            .tempfile_in(dir)?;

        Ok(Self {
            tmp,
            dest: dir.join(file_name),
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.tmp.write_all(chunk)?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn destination(&self) -> &Path {
        &self.dest
    }

    /// Flush, stamp the modification time (when given), and rename into place.
    pub fn commit(mut self, modified: Option<SystemTime>) -> io::Result<u64> {
        self.tmp.flush()?;
        self.tmp.as_file().sync_all()?;

        if let Some(modified) = modified {
            filetime::set_file_mtime(self.tmp.path(), FileTime::from_system_time(modified))?;
        }

        self.tmp.persist(&self.dest).map_err(|e| e.error)?;
        Ok(self.written)
    }
}

/// Names of the regular files directly inside `dir`, sorted.
pub fn list_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        // Non-UTF-8 names cannot have come from a sync.
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

/// Delete leftovers that are not dataset content: temporaries from an
/// interrupted run and directory index pages written by older tooling.
/// Returns the removed names.
pub fn remove_leftovers(dir: &Path) -> io::Result<Vec<String>> {
    let mut removed = Vec::new();

    for name in list_files(dir)? {
        if is_partial_download(&name) || is_listing_artifact(&name) {
            remove_if_exists(&dir.join(&name))?;
            removed.push(name);
        }
    }

    Ok(removed)
}

/// `Ok(true)` if something was removed.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
