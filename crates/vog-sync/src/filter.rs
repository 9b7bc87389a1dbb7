use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::SyncError;

/// Name-pattern rule selecting which remote files are mirrored.
///
/// Built from a comma-separated list of globs (`vog*`, `vog*,*.txt`) matched
/// against the flattened file name. Directory index pages never match, even
/// when a pattern like `*` would otherwise accept them.
#[derive(Debug, Clone)]
pub struct AcceptFilter {
    patterns: Vec<String>,
    set: GlobSet,
}

impl AcceptFilter {
    pub fn new(list: &str) -> Result<Self, SyncError> {
        let patterns: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_owned)
            .collect();

        if patterns.is_empty() {
            return Err(SyncError::Config(format!(
                "accept filter {list:?} contains no patterns"
            )));
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                SyncError::Config(format!("invalid accept pattern {pattern:?}: {e}"))
            })?;
            builder.add(glob);
        }

        let set = builder
            .build()
            .map_err(|e| SyncError::Config(format!("invalid accept filter {list:?}: {e}")))?;

        Ok(Self { patterns, set })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        !is_listing_artifact(file_name) && self.set.is_match(file_name)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// True for auto-generated directory pages (`index.html`, `index.html?C=N;O=D`,
/// `index.html.1`). These are never dataset content.
pub fn is_listing_artifact(file_name: &str) -> bool {
    file_name == "index.html"
        || file_name.starts_with("index.html?")
        || file_name.starts_with("index.html.")
}
