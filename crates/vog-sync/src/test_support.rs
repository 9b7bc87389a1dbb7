use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::{RemoteBody, RemoteFile, RemoteMetadata, RemoteTree, SyncError};

#[derive(Clone)]
struct Entry {
    content: Vec<u8>,
    modified: Option<SystemTime>,
}

/// Remote tree held in memory, keyed by path below the version directory.
/// Bodies are served in small chunks and yield to the runtime between them.
pub struct InMemoryTree {
    files: Mutex<BTreeMap<String, Entry>>,
    downloads: AtomicUsize,
    fail_listing: bool,
    fail_open: Mutex<Option<String>>,
}

impl Default for InMemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTree {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(BTreeMap::new()),
            downloads: AtomicUsize::new(0),
            fail_listing: false,
            fail_open: Mutex::new(None),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail_listing: true,
            ..Self::new()
        }
    }

    /// Add or replace a file. `modified_secs` is seconds since the epoch.
    pub fn put(&self, path: &str, content: impl Into<Vec<u8>>, modified_secs: u64) {
        self.insert(path, content.into(), Some(at(modified_secs)));
    }

    pub fn put_undated(&self, path: &str, content: impl Into<Vec<u8>>) {
        self.insert(path, content.into(), None);
    }

    pub fn remove(&self, path: &str) {
        self.files.lock().unwrap().remove(path);
    }

    pub fn fail_downloads_of(&self, name: &str) {
        *self.fail_open.lock().unwrap() = Some(name.to_owned());
    }

    /// Number of bodies opened so far.
    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    fn insert(&self, path: &str, content: Vec<u8>, modified: Option<SystemTime>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_owned(), Entry { content, modified });
    }

    fn entry(&self, file: &RemoteFile) -> Result<Entry, SyncError> {
        self.files
            .lock()
            .unwrap()
            .get(&file.location)
            .cloned()
            .ok_or_else(|| SyncError::network(&file.location, "HTTP 404 Not Found"))
    }
}

#[async_trait::async_trait]
impl RemoteTree for InMemoryTree {
    fn label(&self) -> &str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<RemoteFile>, SyncError> {
        if self.fail_listing {
            return Err(SyncError::network("memory://latest/", "connection refused"));
        }

        Ok(self
            .files
            .lock()
            .unwrap()
            .keys()
            .map(|path| {
                let name = path.rsplit('/').next().unwrap_or(path);
                RemoteFile::new(name, path.clone())
            })
            .collect())
    }

    async fn metadata(&self, file: &RemoteFile) -> Result<RemoteMetadata, SyncError> {
        let entry = self.entry(file)?;
        Ok(RemoteMetadata {
            modified: entry.modified,
            size: Some(entry.content.len() as u64),
        })
    }

    async fn open(&self, file: &RemoteFile) -> Result<Box<dyn RemoteBody>, SyncError> {
        if self.fail_open.lock().unwrap().as_deref() == Some(file.name.as_str()) {
            return Err(SyncError::network(&file.location, "connection reset"));
        }

        let entry = self.entry(file)?;
        self.downloads.fetch_add(1, Ordering::SeqCst);

        let metadata = RemoteMetadata {
            modified: entry.modified,
            size: Some(entry.content.len() as u64),
        };
        let chunks = entry.content.chunks(4).map(<[u8]>::to_vec).rev().collect();
        Ok(Box::new(MemoryBody { metadata, chunks }))
    }
}

struct MemoryBody {
    metadata: RemoteMetadata,
    // Reversed so `pop` yields chunks in order.
    chunks: Vec<Vec<u8>>,
}

#[async_trait::async_trait]
impl RemoteBody for MemoryBody {
    fn metadata(&self) -> RemoteMetadata {
        self.metadata
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, SyncError> {
        tokio::task::yield_now().await;
        Ok(self.chunks.pop())
    }
}

/// `secs` seconds after the epoch.
pub fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
