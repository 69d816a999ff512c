//! atcs binary: adaptive signal timing from the command line
//!
//! Run with:
//! ```bash
//! cargo run -p atcs-controller --bin atcs -- compute 45 38 52 41
//! cargo run -p atcs-controller --bin atcs -- run --input snapshots.jsonl --log cycles.jsonl --metrics atcs.prom
//! ```

use std::path::PathBuf;
use std::time::Duration;

use atcs_controller::{spawn_jsonl_writer, ControlLoop, DEFAULT_RECORD_CAPACITY};
use atcs_engine::metrics::init_prometheus_recorder;
use atcs_engine::{EngineConfig, LaneDemand, TimingEngine};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "atcs")]
#[command(about = "Adaptive green-time allocation for a four-way junction")]
struct Args {
    /// Engine config (JSON); defaults to 15/90s green, 120/180s cycle
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Allocate green times for one snapshot (north south east west)
    Compute {
        #[arg(num_args = 4, allow_negative_numbers = true, required = true)]
        counts: Vec<i64>,

        /// Ignore the counts and answer with the fallback plan
        #[arg(long)]
        offline: bool,
    },
    /// Print the fallback plan
    Fallback,
    /// Print engine parameters
    Info,
    /// Replay JSON-lines demand snapshots through the control loop
    Run {
        /// Snapshot file; reads stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        /// Append cycle records to this JSON-lines file
        #[arg(long)]
        log: Option<PathBuf>,

        /// Delay between cycles in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Write Prometheus text-format metrics here when the run ends
        #[arg(long)]
        metrics: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("atcs_engine=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let engine = TimingEngine::new(config)?;

    match args.command {
        Command::Compute { counts, offline } => {
            let plan = if offline {
                engine.fallback_plan()
            } else {
                engine.compute(&LaneDemand::from_counts(&counts)?)?
            };
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Fallback => {
            println!("{}", serde_json::to_string_pretty(&engine.fallback_plan())?);
        }
        Command::Info => {
            println!("{}", serde_json::to_string_pretty(&engine.info())?);
        }
        Command::Run {
            input,
            log,
            interval_ms,
            metrics,
        } => {
            let prometheus = match &metrics {
                Some(_) => Some(init_prometheus_recorder()?),
                None => None,
            };
            let mut control = ControlLoop::new(engine);
            if let Some(ms) = interval_ms {
                control = control.with_cadence(Duration::from_millis(ms));
            }

            let mut writer = None;
            if let Some(path) = log {
                let (recorder, handle) = spawn_jsonl_writer(path, DEFAULT_RECORD_CAPACITY);
                control = control.with_recorder(recorder);
                writer = Some(handle);
            }

            let stdout = tokio::io::stdout();
            let summary = match input {
                Some(path) => {
                    let file = tokio::fs::File::open(&path).await?;
                    control.run(BufReader::new(file), stdout).await?
                }
                None => control.run(BufReader::new(tokio::io::stdin()), stdout).await?,
            };
            drop(control);

            if let Some(handle) = writer {
                let written = handle.await??;
                tracing::info!(written, "Cycle log flushed");
            }
            if let (Some(path), Some(handle)) = (metrics, prometheus) {
                tokio::fs::write(&path, handle.render()).await?;
                tracing::info!(path = %path.display(), "Metrics written");
            }
            eprintln!(
                "[OK] {} cycles, {} fallback",
                summary.cycles, summary.fallbacks
            );
        }
    }

    Ok(())
}
