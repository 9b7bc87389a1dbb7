use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use globset::{Glob, GlobMatcher};
use serde::Serialize;

use crate::SyncError;
use crate::mirror::{self, PartialFile};

const GZ_SUFFIX: &str = ".gz";

/// Which compressed files get a decompressed sibling (`*.fa.gz` by default).
#[derive(Debug, Clone)]
pub struct DecompressRule {
    pattern: String,
    matcher: GlobMatcher,
}

impl DecompressRule {
    pub fn new(pattern: &str) -> Result<Self, SyncError> {
        let pattern = pattern.trim();
        if !pattern.ends_with(GZ_SUFFIX) {
            return Err(SyncError::Config(format!(
                "decompression rule {pattern:?} must end in {GZ_SUFFIX}"
            )));
        }

        let matcher = Glob::new(pattern)
            .map_err(|e| SyncError::Config(format!("invalid decompression rule {pattern:?}: {e}")))?
            .compile_matcher();

        Ok(Self {
            pattern: pattern.to_owned(),
            matcher,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Name of the decompressed sibling, or `None` if the rule does not apply.
    pub fn sibling_name<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        if !self.matcher.is_match(file_name) {
            return None;
        }
        file_name
            .strip_suffix(GZ_SUFFIX)
            .filter(|stem| !stem.is_empty())
    }
}

/// A compressed file that could not be expanded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecompressionFailure {
    pub file: String,
    pub message: String,
}

/// Replace `sibling` in `dir` with the full inflation of `compressed`.
///
/// The old sibling is removed first, so a corrupt archive leaves no sibling
/// at all rather than a stale one. The compressed file is only read.
/// Corrupt or truncated input yields [`SyncError::Decompression`]; every other
/// error is a filesystem problem.
pub fn expand(dir: &Path, compressed: &str, sibling: &str) -> Result<u64, SyncError> {
    let compressed_path = dir.join(compressed);
    let sibling_path = dir.join(sibling);

    mirror::remove_if_exists(&sibling_path).map_err(|e| SyncError::fs(&sibling_path, e))?;

    let input = File::open(&compressed_path).map_err(|e| SyncError::fs(&compressed_path, e))?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(input));

    let mut output =
        PartialFile::create(dir, sibling).map_err(|e| SyncError::fs(&sibling_path, e))?;
    let mut buf = vec![0u8; 64 * 1024];

    loop {
        let n = decoder.read(&mut buf).map_err(|e| SyncError::Decompression {
            file: compressed.to_owned(),
            message: e.to_string(),
        })?;
        if n == 0 {
            break;
        }
        output
            .write_chunk(&buf[..n])
            .map_err(|e| SyncError::fs(&sibling_path, e))?;
    }

    output
        .commit(None)
        .map_err(|e| SyncError::fs(&sibling_path, e))
}
