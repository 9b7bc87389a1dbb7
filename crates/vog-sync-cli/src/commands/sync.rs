use anyhow::{Context, Result};
use vog_sync::{SyncOptions, SyncReport};
use vog_sync_http::{HttpRemoteTree, HttpSourceConfig};

use crate::OutputFormat;
use crate::config::Settings;

/// Print feedback and per-file failures to stderr.
pub fn print_problems(report: &SyncReport) {
    for item in &report.feedback {
        eprintln!("{item}");
    }
    for failure in &report.failed {
        eprintln!("error: cannot decompress {}: {}", failure.file, failure.message);
    }
}

fn build_remote(settings: &Settings) -> Result<HttpRemoteTree> {
    let config = HttpSourceConfig {
        base_url: settings.source.clone(),
        version: settings.version.clone(),
        max_depth: settings.max_depth,
        user_agent: settings.user_agent.clone(),
    };
    Ok(HttpRemoteTree::new(config)?)
}

fn build_options(settings: &Settings) -> Result<SyncOptions> {
    Ok(SyncOptions::new(&settings.accept, &settings.decompress)?
        .with_prune(settings.prune)
        .with_strict_decompression(settings.strict))
}

/// Run one sync and report the result in the requested format.
pub async fn run(settings: &Settings, format: OutputFormat) -> Result<SyncReport> {
    let remote = build_remote(settings)?;
    let options = build_options(settings)?;

    if format == OutputFormat::Text {
        println!(
            "Syncing {} into {}...",
            remote.root(),
            settings.target_dir.display()
        );
    }

    let report = vog_sync::sync(&remote, &settings.target_dir, &options)
        .await
        .with_context(|| format!("sync into {} failed", settings.target_dir.display()))?;

    match format {
        OutputFormat::Text => {
            print_problems(&report);
            println!("Synced {}: {}.", remote.root(), report.summary());
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
            println!("{json}");
        }
    }

    Ok(report)
}
