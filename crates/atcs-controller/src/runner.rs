//! Periodic control loop over demand snapshots

use std::time::{Duration, Instant};

use atcs_engine::TimingEngine;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::connectivity::{now_ms, ConnectivityTracker, ProbeReport};
use crate::recorder::{CycleRecord, CycleRecorder};

/// One line of controller input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandSnapshot {
    #[serde(default)]
    pub junction_id: Option<u64>,
    /// `None` or empty when the detection subsystem has nothing
    #[serde(default)]
    pub demand: Option<Vec<i64>>,
    /// Caller-forced degraded mode
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub connectivity: Option<ProbeReport>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub fallbacks: u64,
}

pub struct ControlLoop {
    engine: TimingEngine,
    connectivity: ConnectivityTracker,
    recorder: Option<CycleRecorder>,
    cadence: Option<Duration>,
}

impl ControlLoop {
    pub fn new(engine: TimingEngine) -> Self {
        Self {
            engine,
            connectivity: ConnectivityTracker::new(),
            recorder: None,
            cadence: None,
        }
    }

    pub fn with_recorder(mut self, recorder: CycleRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Wait this long between cycles (first cycle runs immediately)
    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = Some(cadence);
        self
    }

    pub fn connectivity(&self) -> &ConnectivityTracker {
        &self.connectivity
    }

    /// Compute one cycle and hand it to the recorder
    pub fn step(&mut self, snapshot: &DemandSnapshot) -> CycleRecord {
        let started = Instant::now();

        if let Some(report) = snapshot.connectivity {
            self.connectivity.update(report);
        }
        let force_offline = snapshot.offline || !self.connectivity.is_online();

        let (plan, reason) = self
            .engine
            .allocate(snapshot.demand.as_deref(), force_offline);

        let record = CycleRecord {
            junction_id: snapshot.junction_id,
            demand: snapshot.demand.clone(),
            green_times: plan.green_times,
            cycle_budget: plan.cycle_budget,
            total_cycle_time: plan.total_cycle_time(),
            used_fallback: plan.used_fallback,
            fallback_reason: reason,
            computation_latency_us: started.elapsed().as_micros() as u64,
            timestamp_ms: now_ms(),
        };

        if let Some(recorder) = &self.recorder {
            recorder.record(record.clone());
        }
        record
    }

    /// Read JSON-lines snapshots until EOF, writing one record per cycle
    ///
    /// Unparseable lines are answered with the fallback plan.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> anyhow::Result<RunSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut ticker = self.cadence.filter(|c| !c.is_zero()).map(|cadence| {
            let mut ticker = interval(cadence);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        let mut summary = RunSummary::default();
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(ticker) = ticker.as_mut() {
                ticker.tick().await;
            }

            let snapshot = match serde_json::from_str::<DemandSnapshot>(line) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(error = %e, "Unreadable demand snapshot");
                    DemandSnapshot::default()
                }
            };

            let record = self.step(&snapshot);
            summary.cycles += 1;
            if record.used_fallback {
                summary.fallbacks += 1;
            }

            let mut json = serde_json::to_vec(&record)?;
            json.push(b'\n');
            output.write_all(&json).await?;
        }

        output.flush().await?;
        info!(cycles = summary.cycles, fallbacks = summary.fallbacks, "Control loop finished");
        Ok(summary)
    }
}
