use serde::Serialize;

use crate::{DecompressionFailure, Feedback};

/// Outcome of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Files downloaded this run.
    pub fetched: Vec<String>,
    /// Files whose local copy was already current.
    pub skipped: Vec<String>,
    /// Compressed files whose sibling was regenerated.
    pub decompressed: Vec<String>,
    /// Compressed files that could not be expanded.
    pub failed: Vec<DecompressionFailure>,
    /// Files deleted because they vanished from the remote tree.
    pub pruned: Vec<String>,
    pub bytes_fetched: u64,
    pub feedback: Vec<Feedback>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// One-line summary, e.g. `fetched 2, skipped 3, decompressed 1, failed 0`.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "fetched {}, skipped {}, decompressed {}, failed {}",
            self.fetched.len(),
            self.skipped.len(),
            self.decompressed.len(),
            self.failed.len()
        );
        if !self.pruned.is_empty() {
            line.push_str(&format!(", pruned {}", self.pruned.len()));
        }
        line
    }
}
