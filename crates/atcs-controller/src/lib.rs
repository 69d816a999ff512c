//! Control loop around the timing engine
//!
//! This crate provides the plumbing a junction controller needs:
//! 1. Tracks connectivity probes to decide when to run in fallback mode
//! 2. Replays demand snapshots through the engine at a fixed cadence
//! 3. Hands each cycle to a fire-and-forget JSON-lines recorder
//!
//! ## Usage
//!
//! ```no_run
//! use atcs_controller::{spawn_jsonl_writer, ControlLoop};
//! use atcs_engine::{EngineConfig, TimingEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = TimingEngine::new(EngineConfig::default())?;
//!     let (recorder, writer) = spawn_jsonl_writer("cycles.jsonl", 1024);
//!     let mut control = ControlLoop::new(engine).with_recorder(recorder);
//!     let input = tokio::io::BufReader::new(tokio::io::stdin());
//!     control.run(input, tokio::io::stdout()).await?;
//!     drop(control);
//!     writer.await??;
//!     Ok(())
//! }
//! ```

mod connectivity;
mod recorder;
mod runner;

pub use connectivity::{
    ConnectivityMode, ConnectivityStatus, ConnectivityTracker, FallbackModeInfo, ProbeReport,
};
pub use recorder::{spawn_jsonl_writer, CycleRecord, CycleRecorder, DEFAULT_RECORD_CAPACITY};
pub use runner::{ControlLoop, DemandSnapshot, RunSummary};
