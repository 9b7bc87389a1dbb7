use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use crate::decompress::{self, DecompressRule, DecompressionFailure};
use crate::filter::AcceptFilter;
use crate::freshness::{Freshness, LocalState};
use crate::lock::TargetLock;
use crate::mirror::{self, PartialFile};
use crate::remote::{RemoteFile, RemoteTree};
use crate::{Feedback, SyncReport};

/// Errors that can end a sync run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Source unreachable or answered with an error status. Safe to retry.
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A single compressed file is corrupt or truncated. Never ends a run on
    /// its own; it is recorded in [`SyncReport::failed`].
    #[error("cannot decompress {file}: {message}")]
    Decompression { file: String, message: String },

    /// Raised after the run when the caller asked for strict decompression.
    #[error("{} file(s) failed to decompress: {}", failures.len(), failed_names(failures))]
    DecompressionFailed { failures: Vec<DecompressionFailure> },

    #[error("configuration error: {0}")]
    Config(String),
}

fn failed_names(failures: &[DecompressionFailure]) -> String {
    failures
        .iter()
        .map(|f| f.file.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl SyncError {
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    pub(crate) fn fs(path: &Path, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True when rerunning the whole sync may succeed without operator action.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

/// How a run selects, compares, and normalizes files.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub accept: AcceptFilter,
    pub decompress: DecompressRule,
    /// Delete accepted local files that are no longer listed remotely.
    pub prune: bool,
    /// Turn any per-file decompression failure into a failed run.
    pub strict_decompression: bool,
}

impl SyncOptions {
    pub fn new(accept: &str, decompress: &str) -> Result<Self, SyncError> {
        Ok(Self {
            accept: AcceptFilter::new(accept)?,
            decompress: DecompressRule::new(decompress)?,
            prune: false,
            strict_decompression: false,
        })
    }

    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    pub fn with_strict_decompression(mut self, strict: bool) -> Self {
        self.strict_decompression = strict;
        self
    }
}

/// A version selects one snapshot directory, so it must be a single path segment.
pub fn validate_version(version: &str) -> Result<&str, SyncError> {
    let invalid = version.is_empty()
        || version == "."
        || version == ".."
        || version.contains(['/', '\\', '?', '#']);

    if invalid {
        return Err(SyncError::Config(format!(
            "version {version:?} is not a single path segment"
        )));
    }
    Ok(version)
}

/// Mirror `remote` into `target_dir`, then regenerate decompressed siblings.
///
/// Stages run in order under an exclusive lock on `target_dir`: create the
/// directory, clear leftovers, fetch what is missing or outdated, optionally
/// prune, decompress. Network and filesystem errors abort the run; files
/// already committed stay in place.
pub async fn sync(
    remote: &dyn RemoteTree,
    target_dir: &Path,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    std::fs::create_dir_all(target_dir).map_err(|e| SyncError::fs(target_dir, e))?;
    let _lock = TargetLock::acquire(target_dir)
        .await
        .map_err(|e| SyncError::fs(target_dir, e))?;

    tracing::info!(
        source = remote.label(),
        target = %target_dir.display(),
        "starting sync"
    );

    let mut report = SyncReport::default();

    clear_leftovers(target_dir, &mut report)?;

    let listed = remote.list().await?;
    let candidates = select_candidates(listed, &options.accept, &mut report);
    tracing::info!(candidates = candidates.len(), "remote listing filtered");

    for file in &candidates {
        mirror_file(remote, target_dir, file, &mut report).await?;
    }

    if options.prune {
        prune_vanished(target_dir, &candidates, options, &mut report)?;
    }

    normalize(target_dir, &options.decompress, &mut report)?;

    tracing::info!(summary = %report.summary(), "sync finished");

    if options.strict_decompression && !report.failed.is_empty() {
        return Err(SyncError::DecompressionFailed {
            failures: report.failed.clone(),
        });
    }

    Ok(report)
}

fn clear_leftovers(target_dir: &Path, report: &mut SyncReport) -> Result<(), SyncError> {
    let removed = mirror::remove_leftovers(target_dir).map_err(|e| SyncError::fs(target_dir, e))?;
    for name in removed {
        tracing::debug!(file = %name, "removed leftover");
        report
            .feedback
            .push(Feedback::info(format!("removed leftover {name}")));
    }
    Ok(())
}

/// Apply the accept filter and flatten: one entry per file name, in name order.
fn select_candidates(
    mut listed: Vec<RemoteFile>,
    accept: &AcceptFilter,
    report: &mut SyncReport,
) -> Vec<RemoteFile> {
    listed.sort_by(|a, b| a.location.cmp(&b.location));

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for file in listed {
        if !is_safe_name(&file.name) {
            report.feedback.push(Feedback::warning(format!(
                "ignoring {} with unusable file name {:?}",
                file.location, file.name
            )));
            continue;
        }

        if !accept.matches(&file.name) {
            tracing::debug!(file = %file.name, "not accepted");
            continue;
        }

        if !seen.insert(file.name.clone()) {
            report.feedback.push(Feedback::warning(format!(
                "{} also listed at {}, keeping the first",
                file.name, file.location
            )));
            continue;
        }

        candidates.push(file);
    }

    candidates.sort_by(|a, b| a.name.cmp(&b.name));
    candidates
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !mirror::is_partial_download(name)
}

async fn mirror_file(
    remote: &dyn RemoteTree,
    target_dir: &Path,
    file: &RemoteFile,
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    let dest = target_dir.join(&file.name);
    let local = LocalState::read(&dest).map_err(|e| SyncError::fs(&dest, e))?;
    let remote_meta = remote.metadata(file).await?;

    let freshness = Freshness::assess(local, remote_meta);
    if !freshness.needs_download() {
        tracing::debug!(file = %file.name, "up to date");
        report.skipped.push(file.name.clone());
        return Ok(());
    }

    tracing::debug!(file = %file.name, ?freshness, "downloading");

    let mut body = remote.open(file).await?;
    let mut partial =
        PartialFile::create(target_dir, &file.name).map_err(|e| SyncError::fs(&dest, e))?;

    while let Some(chunk) = body.next_chunk().await? {
        partial
            .write_chunk(&chunk)
            .map_err(|e| SyncError::fs(&dest, e))?;
    }

    let modified = body.metadata().modified.or(remote_meta.modified);
    let bytes = partial
        .commit(modified)
        .map_err(|e| SyncError::fs(&dest, e))?;

    tracing::info!(file = %file.name, bytes, "fetched");
    report.fetched.push(file.name.clone());
    report.bytes_fetched += bytes;
    Ok(())
}

fn prune_vanished(
    target_dir: &Path,
    candidates: &[RemoteFile],
    options: &SyncOptions,
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    if candidates.is_empty() {
        report.feedback.push(Feedback::warning(
            "remote listing matched nothing, not pruning",
        ));
        return Ok(());
    }

    let remote_names: HashSet<&str> = candidates.iter().map(|f| f.name.as_str()).collect();
    let siblings: HashSet<&str> = candidates
        .iter()
        .filter_map(|f| options.decompress.sibling_name(&f.name))
        .collect();

    let local = mirror::list_files(target_dir).map_err(|e| SyncError::fs(target_dir, e))?;

    for name in local {
        let keep = remote_names.contains(name.as_str())
            || siblings.contains(name.as_str())
            || !options.accept.matches(&name);
        if keep {
            continue;
        }

        let path = target_dir.join(&name);
        if mirror::remove_if_exists(&path).map_err(|e| SyncError::fs(&path, e))? {
            tracing::info!(file = %name, "pruned");
            report.pruned.push(name);
        }
    }

    Ok(())
}

fn normalize(
    target_dir: &Path,
    rule: &DecompressRule,
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    let names = mirror::list_files(target_dir).map_err(|e| SyncError::fs(target_dir, e))?;

    for name in &names {
        let Some(sibling) = rule.sibling_name(name) else {
            continue;
        };

        match decompress::expand(target_dir, name, sibling) {
            Ok(bytes) => {
                tracing::debug!(file = %name, sibling, bytes, "decompressed");
                report.decompressed.push(name.clone());
            }
            Err(SyncError::Decompression { file, message }) => {
                tracing::warn!(file = %file, error = %message, "decompression failed");
                report.failed.push(DecompressionFailure { file, message });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
