//! Fire-and-forget cycle recording
//!
//! The control loop never waits on persistence: records go through a
//! bounded channel and are dropped with a warning when it is full or closed.

use std::path::{Path, PathBuf};

use atcs_core::LaneAllocation;
use atcs_engine::FallbackReason;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Records buffered before the writer falls behind
pub const DEFAULT_RECORD_CAPACITY: usize = 1024;

/// One computed cycle, as handed to the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub junction_id: Option<u64>,
    /// Raw counts as received; `None` when the demand source was silent
    pub demand: Option<Vec<i64>>,
    pub green_times: LaneAllocation,
    pub cycle_budget: u32,
    pub total_cycle_time: u32,
    pub used_fallback: bool,
    pub fallback_reason: Option<FallbackReason>,
    pub computation_latency_us: u64,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone)]
pub struct CycleRecorder {
    tx: mpsc::Sender<CycleRecord>,
}

impl CycleRecorder {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<CycleRecord>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Queue a record without blocking
    pub fn record(&self, record: CycleRecord) {
        match self.tx.try_send(record) {
            Ok(()) => {}
            Err(TrySendError::Full(record)) => {
                warn!(junction_id = ?record.junction_id, "Cycle recorder full, dropping record");
            }
            Err(TrySendError::Closed(record)) => {
                warn!(junction_id = ?record.junction_id, "Cycle recorder closed, dropping record");
            }
        }
    }
}

/// Start a task appending records to `path` as JSON lines
///
/// The task ends once every [`CycleRecorder`] clone is dropped and resolves
/// to the number of records written.
pub fn spawn_jsonl_writer(
    path: impl AsRef<Path>,
    capacity: usize,
) -> (CycleRecorder, JoinHandle<anyhow::Result<u64>>) {
    let (recorder, rx) = CycleRecorder::channel(capacity);
    let path = path.as_ref().to_path_buf();
    let handle = tokio::spawn(write_records(rx, path));
    (recorder, handle)
}

async fn write_records(mut rx: mpsc::Receiver<CycleRecord>, path: PathBuf) -> anyhow::Result<u64> {
    let file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;
    let mut out = tokio::io::BufWriter::new(file);
    let mut written = 0u64;

    while let Some(record) = rx.recv().await {
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        out.write_all(&line).await?;
        written += 1;
        debug!(written, "Recorded cycle");
    }

    out.flush().await?;
    info!(path = %path.display(), written, "Cycle recorder finished");
    Ok(written)
}
