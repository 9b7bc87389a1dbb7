use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// One layer of settings: the config file, or what was given on the command line.
/// Unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    pub source: Option<String>,
    pub version: Option<String>,
    pub target_dir: Option<PathBuf>,
    pub accept: Option<String>,
    pub decompress: Option<String>,
    pub max_depth: Option<usize>,
    pub prune: Option<bool>,
    pub strict: Option<bool>,
    pub user_agent: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source: String,
    pub version: String,
    pub target_dir: PathBuf,
    pub accept: String,
    pub decompress: String,
    pub max_depth: usize,
    pub prune: bool,
    pub strict: bool,
    pub user_agent: Option<String>,
}

impl SyncConfig {
    /// Fill every unset field of `self` from `lower`.
    pub fn or(self, lower: SyncConfig) -> SyncConfig {
        SyncConfig {
            source: self.source.or(lower.source),
            version: self.version.or(lower.version),
            target_dir: self.target_dir.or(lower.target_dir),
            accept: self.accept.or(lower.accept),
            decompress: self.decompress.or(lower.decompress),
            max_depth: self.max_depth.or(lower.max_depth),
            prune: self.prune.or(lower.prune),
            strict: self.strict.or(lower.strict),
            user_agent: self.user_agent.or(lower.user_agent),
        }
    }

    /// Apply built-in defaults to whatever is still unset.
    pub fn resolve(self) -> Settings {
        Settings {
            source: self
                .source
                .unwrap_or_else(|| vog_sync_http::DEFAULT_SOURCE.into()),
            version: self
                .version
                .unwrap_or_else(|| vog_sync::DEFAULT_VERSION.into()),
            target_dir: self.target_dir.unwrap_or_else(|| PathBuf::from("data")),
            accept: self.accept.unwrap_or_else(|| vog_sync::DEFAULT_ACCEPT.into()),
            decompress: self
                .decompress
                .unwrap_or_else(|| vog_sync::DEFAULT_DECOMPRESS.into()),
            max_depth: self.max_depth.unwrap_or(vog_sync_http::DEFAULT_MAX_DEPTH),
            prune: self.prune.unwrap_or(false),
            strict: self.strict.unwrap_or(false),
            user_agent: self.user_agent,
        }
    }
}

/// Default config file: `~/.config/vog-sync/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vog-sync").join("config.toml"))
}

pub fn parse_config(contents: &str) -> Result<SyncConfig, toml::de::Error> {
    toml::from_str(contents)
}

/// Load the config file layer.
///
/// An explicitly named file must exist and parse. The default file is
/// optional; if it is broken we warn and carry on with defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<SyncConfig> {
    if let Some(path) = explicit {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        return parse_config(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()));
    }

    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match parse_config(&contents) {
            Ok(config) => return Ok(config),
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to parse config, using defaults"
            ),
        }
    }

    Ok(SyncConfig::default())
}
