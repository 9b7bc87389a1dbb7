mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::SyncConfig;

#[derive(Parser)]
#[command(name = "vogdb-sync")]
#[command(about = "Mirror a VOG database release into a local directory")]
#[command(version)]
struct Cli {
    /// Directory the release is mirrored into [default: data]
    #[arg(env = "VOG_DATA")]
    target_dir: Option<PathBuf>,

    /// Release directory on the share, e.g. vog220 [default: latest]
    #[arg(id = "release", value_name = "VERSION", env = "VOG_VERSION")]
    release: Option<String>,

    /// Base URL of the file share
    #[arg(long, env = "VOG_SOURCE")]
    source: Option<String>,

    /// Comma-separated globs selecting which files are mirrored [default: vog*]
    #[arg(long)]
    accept: Option<String>,

    /// Glob selecting which .gz files get a decompressed sibling [default: *.fa.gz]
    #[arg(long)]
    decompress: Option<String>,

    /// How many directory levels below the release to crawl [default: 5]
    #[arg(long)]
    max_depth: Option<usize>,

    /// Delete mirrored files that are no longer published
    #[arg(long)]
    prune: bool,

    /// Exit with an error if any archive fails to decompress
    #[arg(long)]
    strict: bool,

    /// Config file (defaults to ~/.config/vog-sync/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// How to print the sync report
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// The command-line layer; flags that were not given stay unset so the
    /// config file can supply them.
    fn overrides(&self) -> SyncConfig {
        SyncConfig {
            source: self.source.clone(),
            version: self.release.clone(),
            target_dir: self.target_dir.clone(),
            accept: self.accept.clone(),
            decompress: self.decompress.clone(),
            max_depth: self.max_depth,
            prune: self.prune.then_some(true),
            strict: self.strict.then_some(true),
            user_agent: None,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("warn,vog_sync=info,vog_sync_http=info,vogdb_sync=info")
        }))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let file_config = config::load_config(cli.config.as_deref())?;
    let settings = cli.overrides().or(file_config).resolve();

    tracing::debug!(?settings, "resolved settings");

    commands::sync::run(&settings, cli.format).await?;
    Ok(())
}
