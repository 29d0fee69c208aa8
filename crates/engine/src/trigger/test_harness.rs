use chrono::{DateTime, Utc};

use super::evaluator::SkipReason;
use super::rule::Rule;
use super::snapshot::{MetricSnapshot, SnapshotHistory};
use super::store::RuleStore;

pub struct Tick {
    pub now: DateTime<Utc>,
    pub snapshot: MetricSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarnessFiring {
    pub tick: usize,
    pub rule_id: String,
    pub at: DateTime<Utc>,
}

pub struct HarnessResult {
    pub firings: Vec<HarnessFiring>,
    pub skipped: Vec<(usize, String, SkipReason)>,
    pub rules: Vec<Rule>,
}

impl HarnessResult {
    pub fn fired_count(&self, rule_id: &str) -> usize {
        self.firings.iter().filter(|f| f.rule_id == rule_id).count()
    }
}

/// Replays `ticks` in order against a fresh store holding `rules`, committing
/// firings as the live engine would, without dispatching anything.
///
/// `baseline` only seeds the `changed_by` history for the first tick; it is
/// never evaluated itself.
pub fn run_harness(
    rules: Vec<Rule>,
    baseline: Option<MetricSnapshot>,
    ticks: Vec<Tick>,
) -> HarnessResult {
    let store = RuleStore::new();
    for rule in rules {
        store.insert(rule);
    }
    let history = SnapshotHistory::new();
    if let Some(baseline) = baseline {
        history.replace(baseline);
    }
    let mut firings = Vec::new();
    let mut skipped = Vec::new();

    for (index, tick) in ticks.into_iter().enumerate() {
        let previous = history.replace(tick.snapshot.clone());
        let scan = store.commit_scan(&tick.snapshot, tick.now, previous.as_ref());
        firings.extend(scan.hits.into_iter().map(|hit| HarnessFiring {
            tick: index,
            rule_id: hit.rule.id,
            at: tick.now,
        }));
        skipped.extend(scan.skipped.into_iter().map(|(id, reason)| (index, id, reason)));
    }

    HarnessResult {
        firings,
        skipped,
        rules: store.list(),
    }
}
