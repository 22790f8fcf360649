//! CLI entrypoint for planning-poker
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod dispatch;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use dispatch::App;
use poker_application::{NoAuditLog, StoryLocks, VoteAuditLog};
use poker_domain::OutputFormat;
use poker_infrastructure::{
    ConfigLoader, FileConfig, InMemoryEstimationStore, JsonSnapshot, JsonlVoteAuditLog,
};
use poker_presentation::{Cli, Command, ConsoleFormatter};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        if let Some(path) = &cli.config
            && !path.exists()
        {
            bail!("Config file {} does not exist", path.display());
        }
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let _log_guard = init_logging(cli.verbose, config.logging.dir.as_deref())?;
    info!("Starting planning-poker");

    for issue in config.validate() {
        if issue.is_error() {
            bail!("Invalid configuration: {}", issue.message);
        }
        warn!("{}", issue.message);
    }

    ConsoleFormatter::set_color(config.output.resolve_color(cli.no_color));
    let format = config.output.resolve_format(cli.output.map(Into::into));

    if let Command::ShowConfig = cli.command {
        show_config(&cli, &config, format);
        return Ok(());
    }

    // === Dependency Injection ===
    let snapshot = JsonSnapshot::new(
        cli.state
            .clone()
            .unwrap_or_else(|| config.store.resolved_path()),
    );
    // Held until the process exits so another invocation cannot load the
    // snapshot between our load and save.
    let mut lock = snapshot
        .lock()
        .with_context(|| format!("Could not open lock for {}", snapshot.path().display()))?;
    let (_write_guard, _read_guard);
    if cli.mutates() {
        _write_guard = lock.write()?;
    } else {
        _read_guard = lock.read()?;
    }

    let state = snapshot
        .load()
        .with_context(|| format!("Could not open store {}", snapshot.path().display()))?;
    let store = Arc::new(InMemoryEstimationStore::from_state(state));

    let audit: Arc<dyn VoteAuditLog> = if config.audit.enabled {
        let path = config.audit.resolved_path();
        match JsonlVoteAuditLog::new(&path) {
            Some(log) => {
                debug!("Audit log: {}", path.display());
                Arc::new(log)
            }
            None => Arc::new(NoAuditLog),
        }
    } else {
        Arc::new(NoAuditLog)
    };

    let app = App {
        store: Arc::clone(&store),
        locks: Arc::new(StoryLocks::new()),
        audit,
        deck_unit: config.deck.parse_unit().0,
        format,
    };

    let output = app.run(&cli.command).await?;
    print!("{}", output);

    if cli.mutates() && store.is_dirty() {
        snapshot
            .save(&store.snapshot().await)
            .with_context(|| format!("Could not save store {}", snapshot.path().display()))?;
        store.mark_clean();
        info!("Saved store to {}", snapshot.path().display());
    }

    Ok(())
}

/// Log to stderr at the level picked by `-v`, and to a daily file when a
/// log directory is configured. The returned guard flushes the file writer
/// on drop.
fn init_logging(verbose: u8, dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let stderr = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Could not create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "planning-poker.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .init();
            Ok(None)
        }
    }
}

fn show_config(cli: &Cli, config: &FileConfig, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(config)),
        OutputFormat::Text => {
            if cli.no_config {
                println!("Configuration files disabled (--no-config)");
            } else {
                ConfigLoader::print_config_sources(cli.config.as_ref());
            }
            println!();
            println!("Store:    {}", config.store.resolved_path().display());
            println!("Deck:     {}", config.deck.parse_unit().0);
            if config.audit.enabled {
                println!("Audit:    {}", config.audit.resolved_path().display());
            } else {
                println!("Audit:    disabled");
            }
            match &config.logging.dir {
                Some(dir) => println!("Log dir:  {}", dir.display()),
                None => println!("Log dir:  stderr only"),
            }
        }
    }
}
