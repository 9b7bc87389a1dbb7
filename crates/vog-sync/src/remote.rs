use std::sync::Arc;
use std::time::SystemTime;

use crate::SyncError;

/// A candidate file in the remote tree, already flattened to its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Last path segment; the name the file gets in the mirror directory.
    pub name: String,
    /// Where the transport fetches it from (an absolute URL for HTTP).
    pub location: String,
}

impl RemoteFile {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

/// What the remote side says about a file. Either field may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteMetadata {
    pub modified: Option<SystemTime>,
    pub size: Option<u64>,
}

impl RemoteMetadata {
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// An open download. Chunks arrive in order until `None`.
#[async_trait::async_trait]
pub trait RemoteBody: Send {
    /// Metadata reported alongside the content itself.
    fn metadata(&self) -> RemoteMetadata;

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, SyncError>;
}

/// A read-only, externally owned tree of dataset files.
///
/// Implementations only know how to enumerate and fetch; filtering, freshness
/// decisions, and everything touching the local mirror live in [`crate::sync`].
#[async_trait::async_trait]
pub trait RemoteTree: Send + Sync {
    /// Human-readable label for logs and reports (usually the root URL).
    fn label(&self) -> &str;

    /// Every file reachable under the tree root, flattened.
    async fn list(&self) -> Result<Vec<RemoteFile>, SyncError>;

    /// Modification time and size without transferring content.
    async fn metadata(&self, file: &RemoteFile) -> Result<RemoteMetadata, SyncError>;

    /// Start transferring the file's content.
    async fn open(&self, file: &RemoteFile) -> Result<Box<dyn RemoteBody>, SyncError>;
}

#[async_trait::async_trait]
impl<T: RemoteTree + ?Sized> RemoteTree for Arc<T> {
    fn label(&self) -> &str {
        (**self).label()
    }

    async fn list(&self) -> Result<Vec<RemoteFile>, SyncError> {
        (**self).list().await
    }

    async fn metadata(&self, file: &RemoteFile) -> Result<RemoteMetadata, SyncError> {
        (**self).metadata(file).await
    }

    async fn open(&self, file: &RemoteFile) -> Result<Box<dyn RemoteBody>, SyncError> {
        (**self).open(file).await
    }
}
