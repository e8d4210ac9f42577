//! `artifetch download`: resolve a locator batch and materialize it

use crate::config::{self, ArtifetchConfig, utils::expand_home};
use crate::manifest::Manifest;
use crate::resolver::Maven2Resolver;
use anyhow::{Context, Result};
use artifetch_core::{
    DependencyLocator, DependencyManager, ListenerResult, ManagerSettings, Materializer,
    ProgressListener, ResolvedArtifact, parse_all,
};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// Dependency locators, e.g. mvn://org.example:lib-a:1.0.0?scope=runtime
    #[arg(required = true, value_name = "LOCATOR")]
    pub locators: Vec<String>,

    /// Directory that receives the artifacts, in repository layout
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: PathBuf,

    /// Do nothing and exit successfully
    #[arg(long)]
    pub skip: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Write a JSON manifest of the materialized artifacts
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Local repository (artifact cache), overrides the config file
    #[arg(long, value_name = "DIR")]
    pub local_repo: Option<PathBuf>,

    /// Resolve from the local repository only
    #[arg(long)]
    pub offline: bool,

    /// Retries for transient failures, overrides the config file
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Pause between retries in milliseconds, overrides the config file
    #[arg(long, value_name = "MS")]
    pub retry_interval_ms: Option<u64>,
}

/// What a download run produced
#[derive(Debug)]
pub struct DownloadSummary {
    pub manifest: Manifest,
    pub direct_links: Vec<String>,
}

/// Prints progress for an interactive terminal
struct ConsoleListener;

impl ProgressListener for ConsoleListener {
    fn on_retry(
        &self,
        try_count: u32,
        max_retries: u32,
        interval: Duration,
        _cause: &str,
    ) -> ListenerResult {
        eprintln!(
            "🔁 Attempt {}/{} failed, retrying in {}ms",
            try_count,
            max_retries + 1,
            interval.as_millis()
        );
        Ok(())
    }

    fn on_dependency_resolved(&self, artifact: &ResolvedArtifact) -> ListenerResult {
        println!("📦 Resolved {}", artifact);
        Ok(())
    }
}

pub async fn run(args: DownloadArgs) -> Result<()> {
    if args.skip {
        info!("Skipping artifact download");
        println!("Skipping artifact download");
        return Ok(());
    }

    let locators = parse_all(&args.locators).context("Invalid dependency locator")?;
    let config = config::load_config().context("Failed to load config")?;
    let settings = settings_for(&config, &args)?;
    let output = expand_home(&args.output.to_string_lossy())?;

    info!(
        locators = locators.len(),
        output = %output.display(),
        local_repository = %settings.local_repository.display(),
        "Downloading dependencies"
    );

    // The blocking HTTP client must be created and dropped off the async runtime
    let worker_output = output.clone();
    let summary = tokio::task::spawn_blocking(move || {
        download_blocking(&locators, settings, &worker_output)
    })
    .await
    .context("Download worker panicked")??;

    for link in &summary.direct_links {
        println!("↪️  Passthrough {}", link);
    }

    if let Some(path) = &args.manifest {
        summary.manifest.write(path)?;
        println!("📝 Wrote manifest to {}", path.display());
    }

    println!(
        "✅ Copied {} artifact(s) to {}",
        summary.manifest.artifacts.len(),
        output.display()
    );
    Ok(())
}

/// Apply command-line overrides on top of the config file
fn settings_for(config: &ArtifetchConfig, args: &DownloadArgs) -> Result<ManagerSettings> {
    let mut settings = config.manager_settings()?;
    if let Some(local_repo) = &args.local_repo {
        settings.local_repository = expand_home(&local_repo.to_string_lossy())?;
    }
    if args.offline {
        settings.offline = true;
    }
    if let Some(max_retries) = args.max_retries {
        settings.retry.max_retries = max_retries;
    }
    if let Some(interval) = args.retry_interval_ms {
        settings.retry.interval = Duration::from_millis(interval);
    }
    Ok(settings)
}

fn download_blocking(
    locators: &[DependencyLocator],
    settings: ManagerSettings,
    output: &Path,
) -> Result<DownloadSummary> {
    let manager = DependencyManager::new(Arc::new(Maven2Resolver::new()), settings);

    let direct_links = manager
        .categorize(locators)
        .direct_links()
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>();

    let resolved = manager
        .resolve(locators, &ConsoleListener)
        .context("Failed to resolve dependencies")?;

    let materializer = Materializer::new(manager.local_repository());
    let mut manifest = Manifest::new(output);
    for artifact in &resolved {
        let target = materializer
            .save(artifact, output)
            .context(format!("Failed to copy {}", artifact.coordinate))?;
        manifest.record(artifact, &target);
    }
    manifest.direct_links = direct_links.clone();

    Ok(DownloadSummary {
        manifest,
        direct_links,
    })
}
