pub mod decompress;
pub mod feedback;
pub mod filter;
pub mod freshness;
pub mod lock;
pub mod mirror;
pub mod remote;
pub mod report;
pub mod sync;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use decompress::{DecompressRule, DecompressionFailure};
pub use feedback::Feedback;
pub use filter::{AcceptFilter, is_listing_artifact};
pub use freshness::{Freshness, LocalState};
pub use lock::TargetLock;
pub use remote::{RemoteBody, RemoteFile, RemoteMetadata, RemoteTree};
pub use report::SyncReport;
pub use sync::{SyncError, SyncOptions, sync, validate_version};

/// Version alias used when no snapshot is named.
pub const DEFAULT_VERSION: &str = "latest";

/// Accept filter used when none is configured.
pub const DEFAULT_ACCEPT: &str = "vog*";

/// Decompression rule used when none is configured.
pub const DEFAULT_DECOMPRESS: &str = "*.fa.gz";
