pub mod client;
pub mod headers;
pub mod listing;

use std::path::Path;

use vog_sync::{SyncError, SyncOptions, SyncReport};

pub use client::{HttpRemoteTree, HttpSourceConfig};

/// Public file share the VOG releases are published on.
pub const DEFAULT_SOURCE: &str = "http://fileshare.csb.univie.ac.at/vog/";

/// Directory levels below the version directory that are crawled.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Mirror `source_base/version/` into `target_dir` with the default accept
/// filter and decompression rule.
pub async fn sync(
    source_base: &str,
    version: &str,
    target_dir: &Path,
) -> Result<SyncReport, SyncError> {
    let remote = HttpRemoteTree::new(HttpSourceConfig::new(source_base, version))?;
    let options = SyncOptions::new(vog_sync::DEFAULT_ACCEPT, vog_sync::DEFAULT_DECOMPRESS)?;
    vog_sync::sync(&remote, target_dir, &options).await
}
