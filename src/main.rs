use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pom_release::config::{self, ReleaseConfig};
use pom_release::domain::{Reactor, RewriteMode};
use pom_release::rewrite::{ReactorVersions, RewriteEngine, ScmTagTransform, StaticVersionMap};
use pom_release::scm::{GitScmProvider, ScmProvider, ScmTagDriver};
use pom_release::ui;
use pom_release::ReleaseError;

#[derive(clap::Parser)]
#[command(
    name = "pom-release",
    about = "Rewrite the versions of a multi-module build for a release"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short,
        long,
        default_value = "release",
        help = "Versions to write: release, tag or next"
    )]
    mode: String,

    #[arg(long, help = "Write side files next to the descriptors instead of rewriting them")]
    dry_run: bool,

    #[arg(long, help = "Tag the release once every descriptor is rewritten")]
    tag: bool,

    #[arg(short, long, help = "Skip confirmation prompts")]
    force: bool,

    #[arg(long, help = "Remove the side files left by a dry run and exit")]
    clean: bool,

    #[arg(long, help = "Show the reactor build order and exit")]
    list: bool,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("pom-release {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_tracing();

    if let Err(e) = run(&args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    let mode: RewriteMode = args.mode.parse()?;
    let options = config.rewrite_options()?;

    if config.reactor.is_empty() {
        anyhow::bail!("No descriptors configured in the reactor of pomrelease.toml");
    }
    let reactor = Reactor::load(&config.reactor, &options.ls)?;

    if args.list {
        ui::display_reactor(&reactor);
        return Ok(());
    }

    let provider = open_provider(&config, args.tag)?;
    let mut engine = build_engine(mode, &config)?;
    if let Some(provider) = &provider {
        engine = engine.with_scm_provider(provider.clone());
    }

    if args.clean {
        let removed = engine.clean(&reactor)?;
        ui::display_success(&format!("Removed {} side files", removed.len()));
        return Ok(());
    }

    ui::display_status(&format!(
        "Rewriting {} modules for {}{}",
        reactor.len(),
        mode,
        if args.dry_run { " (dry run)" } else { "" }
    ));
    let report = if args.dry_run {
        engine.simulate(&reactor)?
    } else {
        engine.execute(&reactor)?
    };
    ui::display_report(&report);

    if args.tag {
        let provider = provider.context("Tagging requires a git repository")?;
        tag_release(provider.as_ref(), &config, &reactor, args)?;
    }
    Ok(())
}

fn build_engine(mode: RewriteMode, config: &ReleaseConfig) -> Result<RewriteEngine> {
    let mut engine = RewriteEngine::new(mode, config.rewrite_options()?)
        .with_next_versions(StaticVersionMap(config.versions.next.clone()))
        .with_resolved_snapshots(config.resolved_snapshots.clone());

    if !config.versions.original.is_empty() {
        engine = engine.with_original_versions(StaticVersionMap(config.versions.original.clone()));
    } else {
        engine = engine.with_original_versions(ReactorVersions);
    }

    let mut transform = match mode {
        RewriteMode::Next => ScmTagTransform::fixed("HEAD"),
        RewriteMode::Release | RewriteMode::Tag => ScmTagTransform::release(),
    };
    if let (Some(trunk), Some(tag_base)) = (&config.scm.trunk_base, &config.scm.tag_base) {
        if mode != RewriteMode::Next {
            transform = transform.with_translation(trunk, tag_base);
        }
    }
    Ok(engine.with_scm_transform(transform))
}

/// The git provider, required only when tagging or when edit mode is configured
fn open_provider(config: &ReleaseConfig, tagging: bool) -> Result<Option<Arc<dyn ScmProvider>>> {
    match GitScmProvider::open(&config.scm.working_directory) {
        Ok(provider) => {
            let provider: Arc<dyn ScmProvider> =
                Arc::new(provider.with_remote(&config.scm.remote, config.scm.push_changes));
            Ok(Some(provider))
        }
        Err(e) if tagging || config.release.scm_use_edit_mode => Err(e.into()),
        Err(e) => {
            tracing::debug!("Continuing without SCM integration: {}", e);
            Ok(None)
        }
    }
}

fn tag_release(
    provider: &dyn ScmProvider,
    config: &ReleaseConfig,
    reactor: &Reactor,
    args: &Args,
) -> Result<()> {
    let settings = config.tag_settings();
    let driver = ScmTagDriver::new(provider, settings);

    if args.dry_run {
        ui::display_status(&driver.simulate(reactor)?);
        return Ok(());
    }

    let label = config
        .scm
        .release_label
        .as_deref()
        .filter(|label| !label.trim().is_empty())
        .ok_or(ReleaseError::MissingReleaseLabel)?;
    if !args.force && !ui::confirm_action(&format!("Tag the release as '{}'?", label))? {
        println!("Tagging cancelled by user.");
        return Ok(());
    }

    let result = driver.execute(reactor)?;
    ui::display_success(&result.message);
    Ok(())
}
