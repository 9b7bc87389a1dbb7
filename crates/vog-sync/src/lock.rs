use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a waiting run sleeps between attempts to take the lock.
const RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Exclusive advisory lock on a mirror directory, held for the whole run.
///
/// The lock is taken on the directory handle itself, so no lock file ever
/// appears in the mirror. Released when dropped.
#[derive(Debug)]
pub struct TargetLock {
    _handle: File,
    path: PathBuf,
}

impl TargetLock {
    /// Wait until no other run holds the directory.
    ///
    /// Contention is polled on the runtime timer; the calling thread is never
    /// parked in `flock`.
    pub async fn acquire(dir: &Path) -> io::Result<Self> {
        let handle = File::open(dir)?;

        let mut announced = false;
        while !try_lock(&handle)? {
            if !announced {
                tracing::info!(dir = %dir.display(), "another sync holds the directory, waiting");
                announced = true;
            }
            tokio::time::sleep(RETRY_INTERVAL).await;
        }

        Ok(Self {
            _handle: handle,
            path: dir.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `Ok(false)` when someone else holds the lock.
#[cfg(unix)]
fn try_lock(handle: &File) -> io::Result<bool> {
    use fs4::FileExt;

    match handle.try_lock_exclusive() {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(false),
        Err(e) => Err(e),
    }
}

// Directory handles cannot be locked on this platform; runs are not serialized.
#[cfg(not(unix))]
fn try_lock(_handle: &File) -> io::Result<bool> {
    tracing::debug!("directory locking unsupported, continuing unlocked");
    Ok(true)
}
