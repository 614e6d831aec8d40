//! imdb-etl - interactive ETL for the IMDB title datasets
//!
//! Startup order:
//! 1. Resolve config and root folder (CLI > ENV > TOML > compiled default)
//! 2. Initialize logging (RUST_LOG > --log-level > config)
//! 3. Download and decompress the dumps unless told to reuse them
//! 4. Run the interactive session on stdin/stdout

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use imdb_common::config::{LoggingConfig, RootFolderResolver};
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use imdb_etl::config::{EtlConfig, MODULE_NAME};
use imdb_etl::services::{DatasetFetcher, SourceFiles, Workspace};
use imdb_etl::session::{confirm, ConsoleOperator, Operator, SessionController};

/// Command-line arguments for imdb-etl
#[derive(Parser, Debug)]
#[command(name = "imdb-etl")]
#[command(about = "Filter and rank the IMDB title datasets interactively")]
#[command(version)]
struct Args {
    /// Root folder holding Raw/ and Result_ETL/
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Config file (default: <config dir>/imdb-etl/etl.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the source files already in Raw/ instead of downloading
    #[arg(long)]
    skip_download: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(args.root_folder.clone())
        .with_config_path(args.config.clone());
    let config = EtlConfig::resolve(&resolver).context("Invalid configuration")?;

    init_tracing(&config.logging, args.log_level.as_deref())?;

    info!("Starting imdb-etl {}", env!("CARGO_PKG_VERSION"));
    info!("Root folder: {}", config.root_folder.display());

    let settings = config.session_settings();
    let mut operator = ConsoleOperator::stdio();

    if args.skip_download {
        if !settings.sources.all_present() {
            warn!(
                "--skip-download given but source files are missing in {}",
                settings.workspace.raw_folder().display()
            );
        }
    } else {
        refresh_sources(&config, &settings.workspace, &mut operator)?;
    }

    let mut controller = SessionController::new(operator, settings);
    let summary = controller.run().context("Session ended with an error")?;

    info!(
        session_id = %summary.session_id,
        artifacts = summary.artifacts_written,
        result_files = summary.result_files,
        raw_removed = summary.raw_removed,
        "Shutdown complete"
    );
    Ok(())
}

/// Logs go to stderr (or the configured file) so prompts on stdout stay clean
fn init_tracing(logging: &LoggingConfig, level_override: Option<&str>) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(level_override.unwrap_or(&logging.level))?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None => {
            registry
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

/// Filter for `--log-level` or the config level; a typo fails startup
///
/// A bare word must be a level name, since `EnvFilter` would otherwise take
/// it as a target. Directive lists (`imdb_etl=debug,warn`) go to `EnvFilter`.
fn level_filter(level: &str) -> Result<EnvFilter> {
    if !level.contains(['=', ',', '[']) {
        level
            .parse::<LevelFilter>()
            .with_context(|| format!("Invalid log level '{}'", level))?;
    }
    EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{}'", level))
}

/// Download the dumps, asking first when both files are already on disk
fn refresh_sources<O: Operator>(
    config: &EtlConfig,
    workspace: &Workspace,
    operator: &mut O,
) -> Result<()> {
    let existing = SourceFiles::in_folder(workspace.raw_folder());
    if existing.all_present() {
        operator.notify("Source files are already downloaded.");
        if !confirm(operator, "Refresh source files? (yes/no)", false) {
            info!("Using existing source files");
            return Ok(());
        }
    }

    let fetcher = DatasetFetcher::new().context("Failed to create HTTP client")?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime
        .block_on(fetcher.fetch_sources(&config.sources, workspace.raw_folder(), |line| {
            operator.notify(line)
        }))
        .context("Failed to fetch the IMDB datasets")?;

    Ok(())
}
