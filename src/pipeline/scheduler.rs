// src/pipeline/scheduler.rs
use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::Pipeline;

/// Runs a cycle immediately, then again `cooldown` after each cycle ends,
/// until the shutdown future resolves.
pub struct Scheduler {
    pipeline: Pipeline,
    cooldown: Duration,
}

/// Handle to a spawned scheduler.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl SchedulerHandle {
    /// Stop the loop and wait for it. Returns the number of completed cycles.
    pub async fn shutdown(self) -> u64 {
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(error = %e, "scheduler task ended abnormally");
                0
            }
        }
    }
}

impl Scheduler {
    pub fn new(pipeline: Pipeline, cooldown: Duration) -> Self {
        Self { pipeline, cooldown }
    }

    /// Drive cycles until `shutdown` resolves. A cycle in flight is dropped at
    /// its next await point; committed ledger entries are already on disk.
    /// Returns the number of completed cycles.
    pub async fn run_until<F>(self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0u64;

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                report = self.pipeline.run_cycle() => {
                    cycles += 1;
                    tracing::debug!(cycle = cycles, ?report, "cycle report");
                }
            }

            tracing::info!(cooldown_secs = self.cooldown.as_secs(), "waiting before next run");
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.cooldown) => {}
            }
        }

        tracing::info!(cycles, "scheduler stopped");
        cycles
    }

    /// Spawn onto the tokio runtime; stop it through the returned handle.
    pub fn spawn(self) -> SchedulerHandle {
        let (tx, mut rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let stop = async move {
                // Sender dropped counts as shutdown too.
                while !*rx.borrow_and_update() {
                    if rx.changed().await.is_err() {
                        break;
                    }
                }
            };
            self.run_until(stop).await
        });
        SchedulerHandle { shutdown: tx, task }
    }
}
