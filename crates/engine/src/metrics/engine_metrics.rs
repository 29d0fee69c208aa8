use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::trigger::SkipReason;

#[derive(Debug, Default)]
pub struct EngineMetrics {
    ticks: AtomicU64,
    rules_evaluated: AtomicU64,
    rules_fired: AtomicU64,
    manual_triggers: AtomicU64,
    skipped_inactive: AtomicU64,
    skipped_cooldown: AtomicU64,
    skipped_invalid: AtomicU64,
    skipped_not_met: AtomicU64,
    missing_metrics: AtomicU64,
    dispatch_ok: AtomicU64,
    dispatch_failed: AtomicU64,
    dispatch_dropped: AtomicU64,
    tick_latency_sum_us: AtomicU64,
    tick_latency_count: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_ticks(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rules_evaluated(&self, count: u64) {
        self.rules_evaluated.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_rules_fired(&self, count: u64) {
        self.rules_fired.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_manual_triggers(&self) {
        self.manual_triggers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_skipped(&self, reason: SkipReason) {
        let counter = match reason {
            SkipReason::Inactive => &self.skipped_inactive,
            SkipReason::Cooldown => &self.skipped_cooldown,
            SkipReason::NoConditions => &self.skipped_invalid,
            SkipReason::ConditionsNotMet => &self.skipped_not_met,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_missing_metrics(&self, count: u64) {
        self.missing_metrics.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_dispatch_ok(&self) {
        self.dispatch_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_dispatch_failed(&self) {
        self.dispatch_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_dispatch_dropped(&self) {
        self.dispatch_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tick_latency(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.tick_latency_sum_us.fetch_add(us, Ordering::Relaxed);
        self.tick_latency_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ticks_val(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn rules_evaluated_val(&self) -> u64 {
        self.rules_evaluated.load(Ordering::Relaxed)
    }

    pub fn rules_fired_val(&self) -> u64 {
        self.rules_fired.load(Ordering::Relaxed)
    }

    pub fn manual_triggers_val(&self) -> u64 {
        self.manual_triggers.load(Ordering::Relaxed)
    }

    pub fn skipped_val(&self, reason: SkipReason) -> u64 {
        match reason {
            SkipReason::Inactive => &self.skipped_inactive,
            SkipReason::Cooldown => &self.skipped_cooldown,
            SkipReason::NoConditions => &self.skipped_invalid,
            SkipReason::ConditionsNotMet => &self.skipped_not_met,
        }
        .load(Ordering::Relaxed)
    }

    pub fn missing_metrics_val(&self) -> u64 {
        self.missing_metrics.load(Ordering::Relaxed)
    }

    pub fn dispatch_ok_val(&self) -> u64 {
        self.dispatch_ok.load(Ordering::Relaxed)
    }

    pub fn dispatch_failed_val(&self) -> u64 {
        self.dispatch_failed.load(Ordering::Relaxed)
    }

    pub fn dispatch_dropped_val(&self) -> u64 {
        self.dispatch_dropped.load(Ordering::Relaxed)
    }

    pub fn tick_latency_vals(&self) -> (u64, u64) {
        (
            self.tick_latency_sum_us.load(Ordering::Relaxed),
            self.tick_latency_count.load(Ordering::Relaxed),
        )
    }
}
