use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dvr_core::domain::ReapError;
use dvr_core::impls::{InMemoryRecordingStore, StoreSnapshot};
use dvr_core::ports::{Clock, FixedClock, SystemClock};
use dvr_core::{ReaperConfig, ReaperLoop, ScheduledProgramReaper};

#[derive(Debug, Parser)]
#[command(name = "dvr-cli", about = "Prune expired DVR scheduled recordings")]
struct Cli {
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, clap::Args)]
struct StoreArgs {
    /// JSON snapshot: { "scheduled": [...], "deleted": [...] }
    #[arg(long)]
    recordings: PathBuf,

    /// TOML reaper config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `retention_days` from the config.
    #[arg(long)]
    retention_days: Option<u32>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one sweep and write the surviving records.
    Sweep {
        #[command(flatten)]
        store: StoreArgs,

        /// Evaluate expiry at this RFC 3339 instant instead of the wall clock.
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Where to write the result (stdout when omitted).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Sweep periodically until Ctrl-C, then write the snapshot back.
    Watch {
        #[command(flatten)]
        store: StoreArgs,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn load_config(args: &StoreArgs) -> Result<ReaperConfig> {
    let mut config = match &args.config {
        Some(path) => ReaperConfig::load(path)?,
        None => ReaperConfig::default(),
    };
    if let Some(days) = args.retention_days {
        config.retention_days = days;
    }
    config.validate()?;
    Ok(config)
}

fn load_store(path: &Path) -> Result<InMemoryRecordingStore> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot: StoreSnapshot = serde_json::from_str(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(InMemoryRecordingStore::from_snapshot(
        snapshot.scheduled,
        snapshot.deleted,
    )?)
}

fn write_snapshot(store: &InMemoryRecordingStore, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(&store.snapshot()?)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn sweep<C: Clock + 'static>(
    store: Arc<InMemoryRecordingStore>,
    clock: C,
    config: &ReaperConfig,
    output: Option<&Path>,
) -> Result<()> {
    if !config.enabled {
        tracing::info!("Scheduled recording reaper disabled by configuration, records left as is");
        return write_snapshot(&store, output);
    }

    let reaper = ScheduledProgramReaper::from_config(store.clone(), clock, config);
    match reaper.run() {
        Ok(report) => {
            tracing::info!(
                scanned = report.scanned,
                deleted = report.deleted.len(),
                cutoff = %report.cutoff,
                "Sweep finished"
            );
        }
        Err(ReapError::Incomplete { deleted, failures }) => {
            for (id, e) in &failures {
                tracing::error!(schedule_id = %id, error = %e, "Could not delete recording");
            }
            write_snapshot(&store, output)?;
            bail!(
                "{} of {} expired recordings could not be deleted",
                failures.len(),
                failures.len() + deleted.len()
            );
        }
        Err(e) => return Err(e.into()),
    }
    write_snapshot(&store, output)
}

async fn watch_store(path: PathBuf, config: ReaperConfig) -> Result<()> {
    if !config.enabled {
        tracing::info!("Scheduled recording reaper disabled by configuration");
        return Ok(());
    }

    let store = Arc::new(load_store(&path)?);
    let reaper = Arc::new(ScheduledProgramReaper::from_config(
        store.clone(),
        SystemClock,
        &config,
    ));
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(ReaperLoop::from_config(reaper, &config).run(rx));

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    tracing::info!("Shutting down");
    // Err only if the loop already exited.
    let _ = tx.send(true);
    handle.await.context("reaper loop panicked")?;

    write_snapshot(&store, Some(&path))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Sweep { store, now, output } => {
            let config = load_config(&store)?;
            let recordings = Arc::new(load_store(&store.recordings)?);
            match now {
                Some(now) => sweep(recordings, FixedClock::new(now), &config, output.as_deref()),
                None => sweep(recordings, SystemClock, &config, output.as_deref()),
            }
        }
        Command::Watch { store } => {
            let config = load_config(&store)?;
            watch_store(store.recordings, config).await
        }
    }
}
