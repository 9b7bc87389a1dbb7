use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::RemoteMetadata;

/// Modification time and size of a file already in the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalState {
    pub modified: SystemTime,
    pub size: u64,
}

impl LocalState {
    /// Stat a mirror file. `Ok(None)` when it does not exist.
    pub fn read(path: &Path) -> io::Result<Option<Self>> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        if !metadata.is_file() {
            return Err(io::Error::other(format!(
                "{} exists but is not a regular file",
                path.display()
            )));
        }

        Ok(Some(Self {
            modified: metadata.modified()?,
            size: metadata.len(),
        }))
    }
}

/// Timestamping decision for one remote file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Not in the mirror yet.
    Missing,
    /// The remote side reports no modification time, so there is nothing to compare.
    Unknown,
    /// Remote modification time is later than the local one.
    Newer,
    /// Timestamps agree but the sizes do not.
    SizeMismatch,
    Current,
}

impl Freshness {
    /// Compare at whole-second precision, the resolution of `Last-Modified`.
    pub fn assess(local: Option<LocalState>, remote: RemoteMetadata) -> Self {
        let Some(local) = local else {
            return Self::Missing;
        };

        let Some(remote_modified) = remote.modified else {
            return Self::Unknown;
        };

        if unix_seconds(remote_modified) > unix_seconds(local.modified) {
            return Self::Newer;
        }

        match remote.size {
            Some(size) if size != local.size => Self::SizeMismatch,
            _ => Self::Current,
        }
    }

    pub fn needs_download(self) -> bool {
        self != Self::Current
    }
}

fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs() as i64,
        Err(before) => -(before.duration().as_secs() as i64),
    }
}
