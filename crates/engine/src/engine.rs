use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::metrics::EngineMetrics;
use crate::trigger::{
    evaluate_rule, Evaluation, FireError, FiredEvent, MetricSnapshot, MetricSnapshotProvider, Rule,
    RuleDraft, RuleStore, ScanHit, SnapshotHistory, ValidationError,
};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("rule '{0}' not found")]
    NotFound(String),
    #[error("rule '{0}' is inactive")]
    Inactive(String),
    #[error("invalid rule: {0}")]
    Validation(#[from] ValidationError),
    #[error("dispatch queue unavailable, event for rule '{0}' dropped")]
    DispatchDropped(String),
}

impl From<FireError> for EngineError {
    fn from(e: FireError) -> Self {
        match e {
            FireError::NotFound(id) => Self::NotFound(id),
            FireError::Inactive(id) => Self::Inactive(id),
        }
    }
}

/// Outcome of one committed tick.
#[derive(Debug, Serialize)]
pub struct TickReport {
    pub evaluated_at: DateTime<Utc>,
    pub fired: Vec<ScanHit>,
    pub skipped: usize,
    pub dropped: usize,
}

/// Evaluates rules against incoming snapshots, commits firings, and hands
/// fired events to the dispatch queue.
///
/// Firings are committed before they are queued: if the queue is full or
/// the dispatch later fails, the rule still sits out its cooldown.
pub struct TriggerEngine {
    store: RuleStore,
    history: SnapshotHistory,
    queue: mpsc::Sender<FiredEvent>,
    metrics: Arc<EngineMetrics>,
}

impl TriggerEngine {
    /// Builds an engine and the receiving end of its dispatch queue.
    pub fn new(
        store: RuleStore,
        queue_capacity: usize,
        metrics: Arc<EngineMetrics>,
    ) -> (Self, mpsc::Receiver<FiredEvent>) {
        let (queue, rx) = mpsc::channel(queue_capacity.max(1));
        let engine = Self {
            store,
            history: SnapshotHistory::new(),
            queue,
            metrics,
        };
        (engine, rx)
    }

    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn create_rule(&self, draft: RuleDraft) -> Result<Rule, EngineError> {
        let rule = draft.into_rule(hermes_common::ids::generate())?;
        tracing::info!(rule_id = %rule.id, name = %rule.name, "rule created");
        self.store.insert(rule.clone());
        Ok(rule)
    }

    /// Rebuilds rule `id` from the draft produced by `edit`, keeping its
    /// firing history.
    pub fn revise_rule(
        &self,
        id: &str,
        edit: impl FnOnce(&Rule) -> RuleDraft,
    ) -> Result<Rule, EngineError> {
        let rule = self
            .store
            .revise(id, |existing| edit(existing).into_revision(existing))
            .ok_or_else(|| EngineError::NotFound(id.to_string()))??;
        tracing::info!(rule_id = %rule.id, "rule updated");
        Ok(rule)
    }

    pub fn delete_rule(&self, id: &str) -> Result<(), EngineError> {
        if self.store.delete(id) {
            tracing::info!(rule_id = %id, "rule deleted");
            Ok(())
        } else {
            Err(EngineError::NotFound(id.to_string()))
        }
    }

    /// Scans every rule against `snapshot`, commits the firings and queues
    /// them for dispatch. The snapshot becomes the `changed_by` baseline for
    /// the next tick.
    pub fn tick(&self, snapshot: MetricSnapshot, now: DateTime<Utc>) -> TickReport {
        let previous = self.history.replace(snapshot.clone());
        self.run_tick(snapshot, previous, now)
    }

    /// Rescans the latest snapshot without replacing it. The snapshot is its
    /// own `changed_by` baseline, so a re-tick never reports a change.
    /// Returns `None` until a first snapshot has arrived.
    pub fn retick(&self, now: DateTime<Utc>) -> Option<TickReport> {
        let snapshot = self.history.current()?;
        let previous = Some(snapshot.clone());
        Some(self.run_tick(snapshot, previous, now))
    }

    fn run_tick(
        &self,
        snapshot: MetricSnapshot,
        previous: Option<MetricSnapshot>,
        now: DateTime<Utc>,
    ) -> TickReport {
        let start = Instant::now();
        let scan = self.store.commit_scan(&snapshot, now, previous.as_ref());

        self.metrics.inc_ticks();
        self.metrics
            .add_rules_evaluated((scan.hits.len() + scan.skipped.len()) as u64);
        self.metrics.add_rules_fired(scan.hits.len() as u64);
        self.metrics.add_missing_metrics(scan.missing_metrics as u64);
        for (_, reason) in &scan.skipped {
            self.metrics.inc_skipped(*reason);
        }
        if scan.missing_metrics > 0 {
            tracing::debug!(missing = scan.missing_metrics, "conditions referenced absent metrics");
        }

        let mut dropped = 0;
        for hit in &scan.hits {
            tracing::info!(
                rule_id = %hit.rule.id,
                priority = hit.rule.priority,
                trigger_count = hit.rule.trigger_count,
                "rule fired"
            );
            if !self.enqueue(FiredEvent::new(&hit.rule, &snapshot, now)) {
                dropped += 1;
            }
        }

        self.metrics.record_tick_latency(start);
        TickReport {
            evaluated_at: now,
            skipped: scan.skipped.len(),
            fired: scan.hits,
            dropped,
        }
    }

    /// Fires rule `id` now regardless of its conditions and cooldown.
    ///
    /// The firing stays committed even when the event cannot be queued; that
    /// case is reported as [`EngineError::DispatchDropped`].
    pub fn trigger_manually(&self, id: &str, now: DateTime<Utc>) -> Result<FiredEvent, EngineError> {
        let rule = self.store.fire_now(id, now)?;
        let snapshot = self.history.latest().unwrap_or_default();
        let event = FiredEvent::manual(&rule, &snapshot, now);

        self.metrics.inc_manual_triggers();
        tracing::info!(rule_id = %id, trigger_count = rule.trigger_count, "rule triggered manually");
        if !self.enqueue(event.clone()) {
            return Err(EngineError::DispatchDropped(rule.id));
        }
        Ok(event)
    }

    /// Evaluates rule `id` against `snapshot` without committing anything.
    pub fn evaluate_dry_run(
        &self,
        id: &str,
        snapshot: &MetricSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Evaluation, EngineError> {
        let rule = self
            .store
            .get(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        let previous = self.history.latest();
        Ok(evaluate_rule(&rule, snapshot, now, previous.as_ref()))
    }

    fn enqueue(&self, event: FiredEvent) -> bool {
        match self.queue.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                self.metrics.inc_dispatch_dropped();
                tracing::warn!(rule_id = %event.rule_id, event_id = %event.id, "dispatch queue full, event dropped");
                false
            }
            Err(TrySendError::Closed(event)) => {
                self.metrics.inc_dispatch_dropped();
                tracing::error!(rule_id = %event.rule_id, "dispatch queue closed, event dropped");
                false
            }
        }
    }
}
