use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use super::evaluator::{evaluate_rule, Evaluation, Firing};
use super::rule::Rule;
use super::snapshot::MetricSnapshot;

/// A rule that fired during a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanHit {
    pub rule: Rule,
    pub firing: Firing,
}

/// Higher priority first, then ascending id.
pub fn firing_order(a: &Rule, b: &Rule) -> Ordering {
    b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id))
}

pub fn sort_hits(hits: &mut [ScanHit]) {
    hits.sort_by(|a, b| firing_order(&a.rule, &b.rule));
}

/// Evaluates every rule against one snapshot and returns those that fired,
/// in firing order. Rules fire independently of each other.
pub fn scan(
    rules: &[Rule],
    snapshot: &MetricSnapshot,
    now: DateTime<Utc>,
    previous: Option<&MetricSnapshot>,
) -> Vec<ScanHit> {
    let mut hits: Vec<ScanHit> = rules
        .iter()
        .filter_map(|rule| match evaluate_rule(rule, snapshot, now, previous) {
            Evaluation::Fired(firing) => Some(ScanHit {
                rule: rule.clone(),
                firing,
            }),
            Evaluation::Skipped { .. } => None,
        })
        .collect();
    sort_hits(&mut hits);
    hits
}
