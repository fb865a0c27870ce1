// src/pipeline/mod.rs
//
// One announcement cycle: fetch -> filter against the ledger -> enrich ->
// deliver -> commit. Nothing in here is fatal; every failure degrades to
// "skip" and the next cycle retries whatever was not committed.

pub mod scheduler;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::time::Duration;

use crate::catalog::{CatalogSource, ItemId};
use crate::config::AnnouncerConfig;
use crate::error::ErrorKind;
use crate::notify::Notifier;
use crate::store::{CandidateStore, IdLedger, LedgerOrigin};

pub use scheduler::{Scheduler, SchedulerHandle};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("announcer_cycles_total", "Completed announcement cycles.");
        describe_counter!(
            "announcer_delivered_total",
            "Items announced and committed to the ledger."
        );
        describe_counter!(
            "announcer_delivery_failures_total",
            "Webhook deliveries that did not succeed."
        );
        describe_counter!(
            "announcer_detail_failures_total",
            "Pending items skipped because their details could not be fetched."
        );
        describe_counter!(
            "announcer_fetch_failures_total",
            "Cycles whose catalog listing failed."
        );
        describe_gauge!("announcer_ledger_entries", "Entries in the ledger after the last cycle.");
        describe_gauge!("announcer_last_cycle_ts", "Unix ts when the last cycle finished.");
    });
}

/// Summary of one `run_cycle`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Distinct candidate ids (fresh listing plus leftovers from an interrupted cycle).
    pub candidates: usize,
    /// Of `candidates`, how many came only from leftover candidate storage.
    pub recovered: usize,
    pub pending: usize,
    pub delivered: Vec<ItemId>,
    pub delivery_failed: Vec<ItemId>,
    pub detail_failed: Vec<ItemId>,
    /// Delivered but the ledger append failed; may be announced again.
    pub commit_failed: Vec<ItemId>,
    pub fetch_error: Option<ErrorKind>,
    /// The ledger could not be read, so nothing was delivered.
    pub ledger_unavailable: bool,
}

pub struct Pipeline {
    source: Box<dyn CatalogSource>,
    notifier: Box<dyn Notifier>,
    ledger: IdLedger,
    candidates: CandidateStore,
    message_delay: Duration,
}

impl Pipeline {
    pub fn new(
        cfg: &AnnouncerConfig,
        source: Box<dyn CatalogSource>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            notifier,
            ledger: IdLedger::new(cfg.ledger_path(), cfg.ledger_cap),
            candidates: CandidateStore::new(cfg.candidates_path()),
            message_delay: cfg.message_delay(),
        }
    }

    pub fn ledger(&self) -> &IdLedger {
        &self.ledger
    }

    pub fn candidate_store(&self) -> &CandidateStore {
        &self.candidates
    }

    /// Run one full cycle. Candidate storage is empty again when this returns.
    pub async fn run_cycle(&self) -> CycleReport {
        ensure_metrics_described();
        let mut report = CycleReport::default();

        // Fetching
        let fresh = match self.source.fetch_candidate_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, kind = %e.kind(), source = self.source.name(), "candidate fetch failed");
                counter!("announcer_fetch_failures_total").increment(1);
                report.fetch_error = Some(e.kind());
                Vec::new()
            }
        };
        let leftovers = self.candidates.load().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "reading candidate storage failed");
            Vec::new()
        });
        let (candidates, recovered) = merge_candidates(fresh, leftovers);
        report.candidates = candidates.len();
        report.recovered = recovered;
        if recovered > 0 {
            tracing::info!(recovered, "resuming items left over from an interrupted cycle");
        }
        self.persist_candidates(&candidates).await;

        // Filtering
        let announced = match self.ledger.load().await {
            Ok(load) => {
                if load.origin == LedgerOrigin::Initialized {
                    tracing::info!("no announcement history yet");
                }
                load.ids
            }
            Err(e) => {
                tracing::error!(error = %e, "ledger unreadable; skipping deliveries this cycle");
                report.ledger_unavailable = true;
                self.finish(&report).await;
                return report;
            }
        };
        let pending = pending_ids(&candidates, &announced);
        report.pending = pending.len();
        self.persist_candidates(&pending).await;
        tracing::info!(candidates = report.candidates, pending = report.pending, "filtered candidates");

        // Delivering
        for id in pending {
            self.deliver_one(id, &mut report).await;
        }

        self.finish(&report).await;
        report
    }

    async fn deliver_one(&self, id: ItemId, report: &mut CycleReport) {
        tracing::debug!(item_id = %id, "processing item");

        let detail = match self.source.fetch_detail(&id).await {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(item_id = %id, error = %e, kind = %e.kind(), "detail fetch failed; skipping");
                counter!("announcer_detail_failures_total").increment(1);
                report.detail_failed.push(id);
                return;
            }
        };

        let thumbnail = self
            .source
            .fetch_thumbnail_url(&id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(item_id = %id, error = %e, "thumbnail fetch failed; sending without");
                String::new()
            });

        if let Err(e) = self.notifier.deliver(&detail, &thumbnail).await {
            // No delay after a failed send; only successful messages count
            // against the sink's rate limit.
            tracing::warn!(item_id = %id, error = %e, kind = %e.kind(), sink = self.notifier.name(), "delivery failed");
            counter!("announcer_delivery_failures_total").increment(1);
            report.delivery_failed.push(id);
            return;
        }

        match self.ledger.commit_and_trim(&id).await {
            Ok(()) => {
                counter!("announcer_delivered_total").increment(1);
                report.delivered.push(id);
            }
            Err(e) => {
                tracing::error!(item_id = %id, error = %e, "announced but not recorded; may repeat");
                report.commit_failed.push(id);
            }
        }

        if !self.message_delay.is_zero() {
            tokio::time::sleep(self.message_delay).await;
        }
    }

    async fn persist_candidates(&self, ids: &[ItemId]) {
        if let Err(e) = self.candidates.replace(ids).await {
            tracing::warn!(error = %e, "writing candidate storage failed");
        }
    }

    async fn finish(&self, report: &CycleReport) {
        if let Err(e) = self.candidates.clear().await {
            tracing::warn!(error = %e, "clearing candidate storage failed");
        }

        counter!("announcer_cycles_total").increment(1);
        if let Ok(entries) = self.ledger.entries().await {
            gauge!("announcer_ledger_entries").set(entries.len() as f64);
        }
        gauge!("announcer_last_cycle_ts").set(chrono::Utc::now().timestamp() as f64);

        tracing::info!(
            delivered = report.delivered.len(),
            delivery_failed = report.delivery_failed.len(),
            detail_failed = report.detail_failed.len(),
            "cycle finished"
        );
    }
}

/// De-duplicated union, fresh ids first. Returns how many ids came only from `leftovers`.
pub fn merge_candidates(fresh: Vec<ItemId>, leftovers: Vec<ItemId>) -> (Vec<ItemId>, usize) {
    let mut seen = HashSet::with_capacity(fresh.len() + leftovers.len());
    let mut out = Vec::with_capacity(fresh.len() + leftovers.len());
    for id in fresh {
        if seen.insert(id.clone()) {
            out.push(id);
        }
    }
    let fresh_len = out.len();
    for id in leftovers {
        if seen.insert(id.clone()) {
            out.push(id);
        }
    }
    let recovered = out.len() - fresh_len;
    (out, recovered)
}

/// Candidates not yet in the ledger, in candidate order.
pub fn pending_ids(candidates: &[ItemId], announced: &HashSet<ItemId>) -> Vec<ItemId> {
    candidates
        .iter()
        .filter(|id| !announced.contains(*id))
        .cloned()
        .collect()
}
