use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use super::evaluator::{evaluate_rule, Evaluation, SkipReason};
use super::rule::Rule;
use super::scanner::{firing_order, sort_hits, ScanHit};
use super::snapshot::MetricSnapshot;

/// Concurrent rule registry.
///
/// Evaluation and the `trigger_count`/`last_triggered_at` commit of a rule
/// happen under that rule's entry lock, so concurrent ticks cannot both fire
/// the same rule out of one cooldown window.
#[derive(Clone, Default)]
pub struct RuleStore {
    rules: Arc<DashMap<String, Rule>>,
}

/// Result of a committed scan: fired rules in firing order (with their
/// post-commit state) and the reason every other rule was skipped.
#[derive(Debug, Default)]
pub struct CommittedScan {
    pub hits: Vec<ScanHit>,
    pub skipped: Vec<(String, SkipReason)>,
    /// Conditions whose metric was absent, over rules whose conditions ran.
    pub missing_metrics: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FireError {
    #[error("rule '{0}' not found")]
    NotFound(String),
    #[error("rule '{0}' is inactive")]
    Inactive(String),
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, rule: Rule) {
        self.rules.insert(rule.id.clone(), rule);
    }

    pub fn get(&self, id: &str) -> Option<Rule> {
        self.rules.get(id).map(|r| r.clone())
    }

    /// All rules in firing order.
    pub fn list(&self) -> Vec<Rule> {
        let mut rules: Vec<Rule> = self.rules.iter().map(|r| r.value().clone()).collect();
        rules.sort_by(firing_order);
        rules
    }

    pub fn list_active(&self) -> Vec<Rule> {
        let mut rules: Vec<Rule> = self
            .rules
            .iter()
            .filter(|r| r.value().is_active)
            .map(|r| r.value().clone())
            .collect();
        rules.sort_by(firing_order);
        rules
    }

    pub fn update(&self, rule: Rule) -> bool {
        match self.rules.get_mut(&rule.id) {
            Some(mut entry) => {
                *entry = rule;
                true
            }
            None => false,
        }
    }

    pub fn delete(&self, id: &str) -> bool {
        self.rules.remove(id).is_some()
    }

    pub fn count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluates one rule and commits the firing if it fired.
    ///
    /// Returns the evaluation and the rule state after any commit, or `None`
    /// when the rule does not exist.
    pub fn evaluate_and_commit(
        &self,
        id: &str,
        snapshot: &MetricSnapshot,
        now: DateTime<Utc>,
        previous: Option<&MetricSnapshot>,
    ) -> Option<(Evaluation, Rule)> {
        let mut entry = self.rules.get_mut(id)?;
        let evaluation = evaluate_rule(entry.value(), snapshot, now, previous);
        if evaluation.is_fired() {
            entry.record_firing(now);
        }
        Some((evaluation, entry.value().clone()))
    }

    /// Runs every rule through [`Self::evaluate_and_commit`].
    pub fn commit_scan(
        &self,
        snapshot: &MetricSnapshot,
        now: DateTime<Utc>,
        previous: Option<&MetricSnapshot>,
    ) -> CommittedScan {
        // Collect ids first: holding an iterator guard while taking an
        // entry lock on the same map would deadlock.
        let ids: Vec<String> = self.rules.iter().map(|r| r.key().clone()).collect();
        let mut scan = CommittedScan::default();

        for id in ids {
            match self.evaluate_and_commit(&id, snapshot, now, previous) {
                Some((Evaluation::Fired(firing), rule)) => {
                    scan.missing_metrics += missing_metrics(&rule, snapshot);
                    scan.hits.push(ScanHit { rule, firing });
                }
                Some((Evaluation::Skipped { reason }, rule)) => {
                    if reason == SkipReason::ConditionsNotMet {
                        scan.missing_metrics += missing_metrics(&rule, snapshot);
                    }
                    tracing::debug!(rule_id = %id, %reason, "rule skipped");
                    scan.skipped.push((id, reason));
                }
                None => {}
            }
        }

        sort_hits(&mut scan.hits);
        scan
    }

    /// Replaces a rule with the result of `revise`, under the rule's entry
    /// lock so no concurrent firing commit is lost.
    pub fn revise<E>(
        &self,
        id: &str,
        revise: impl FnOnce(&Rule) -> Result<Rule, E>,
    ) -> Option<Result<Rule, E>> {
        let mut entry = self.rules.get_mut(id)?;
        Some(revise(entry.value()).map(|rule| {
            *entry = rule.clone();
            rule
        }))
    }

    /// Fires an active rule unconditionally, bypassing conditions and cooldown.
    pub fn fire_now(&self, id: &str, now: DateTime<Utc>) -> Result<Rule, FireError> {
        let mut entry = self
            .rules
            .get_mut(id)
            .ok_or_else(|| FireError::NotFound(id.to_string()))?;
        if !entry.is_active {
            return Err(FireError::Inactive(id.to_string()));
        }
        entry.record_firing(now);
        Ok(entry.value().clone())
    }
}

fn missing_metrics(rule: &Rule, snapshot: &MetricSnapshot) -> usize {
    rule.conditions
        .iter()
        .filter(|c| !snapshot.contains(&c.metric))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::condition::{Condition, Operator, Threshold};
    use crate::trigger::rule::{LogicOperator, Severity};
    use chrono::{Duration, TimeZone};

    fn sample_rule(id: &str) -> Rule {
        Rule {
            id: id.into(),
            name: "High risk".into(),
            description: String::new(),
            trigger_type: "threshold".into(),
            conditions: vec![Condition {
                metric: "risk_score".into(),
                operator: Operator::GreaterThan,
                threshold: Threshold::Number(70.0),
            }],
            logic_operator: LogicOperator::And,
            is_active: true,
            cooldown_minutes: 60,
            priority: 0,
            severity: Severity::Warning,
            trigger_count: 0,
            last_triggered_at: None,
            modules_to_trigger: vec!["notify".into()],
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn hot() -> MetricSnapshot {
        MetricSnapshot::new().with("risk_score", 82.0)
    }

    #[test]
    fn insert_and_get() {
        let store = RuleStore::new();
        store.insert(sample_rule("rule-1"));
        assert_eq!(store.get("rule-1").unwrap().name, "High risk");
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn list_active_filters() {
        let store = RuleStore::new();
        store.insert(sample_rule("rule-1"));
        let mut disabled = sample_rule("rule-2");
        disabled.is_active = false;
        store.insert(disabled);
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.list_active().len(), 1);
    }

    #[test]
    fn list_is_in_firing_order() {
        let store = RuleStore::new();
        let mut a = sample_rule("a");
        a.priority = 1;
        let mut b = sample_rule("b");
        b.priority = 9;
        store.insert(a);
        store.insert(b);
        let ids: Vec<String> = store.list().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn update_missing_returns_false() {
        let store = RuleStore::new();
        assert!(!store.update(sample_rule("nope")));
    }

    #[test]
    fn update_existing() {
        let store = RuleStore::new();
        store.insert(sample_rule("rule-1"));
        let mut updated = sample_rule("rule-1");
        updated.priority = 3;
        assert!(store.update(updated));
        assert_eq!(store.get("rule-1").unwrap().priority, 3);
    }

    #[test]
    fn delete_existing_and_missing() {
        let store = RuleStore::new();
        store.insert(sample_rule("rule-1"));
        assert!(store.delete("rule-1"));
        assert!(!store.delete("rule-1"));
    }

    #[test]
    fn firing_is_committed() {
        let store = RuleStore::new();
        store.insert(sample_rule("rule-1"));
        let (eval, rule) = store
            .evaluate_and_commit("rule-1", &hot(), now(), None)
            .unwrap();
        assert!(eval.is_fired());
        assert_eq!(rule.trigger_count, 1);
        assert_eq!(rule.last_triggered_at, Some(now()));
        assert_eq!(store.get("rule-1").unwrap().trigger_count, 1);
    }

    #[test]
    fn second_tick_inside_cooldown_is_skipped() {
        let store = RuleStore::new();
        store.insert(sample_rule("rule-1"));
        store.evaluate_and_commit("rule-1", &hot(), now(), None);
        let (eval, rule) = store
            .evaluate_and_commit("rule-1", &hot(), now() + Duration::minutes(10), None)
            .unwrap();
        assert_eq!(eval.skip_reason(), Some(SkipReason::Cooldown));
        assert_eq!(rule.trigger_count, 1);
    }

    #[test]
    fn skipped_rule_is_not_committed() {
        let store = RuleStore::new();
        store.insert(sample_rule("rule-1"));
        let cold = MetricSnapshot::new().with("risk_score", 10.0);
        let (eval, rule) = store.evaluate_and_commit("rule-1", &cold, now(), None).unwrap();
        assert!(!eval.is_fired());
        assert_eq!(rule.trigger_count, 0);
    }

    #[test]
    fn commit_scan_reports_hits_and_skips() {
        let store = RuleStore::new();
        store.insert(sample_rule("fires"));
        let mut off = sample_rule("off");
        off.is_active = false;
        store.insert(off);

        let scan = store.commit_scan(&hot(), now(), None);
        assert_eq!(scan.hits.len(), 1);
        assert_eq!(scan.hits[0].rule.id, "fires");
        assert_eq!(scan.hits[0].rule.trigger_count, 1);
        assert_eq!(scan.skipped, vec![("off".to_string(), SkipReason::Inactive)]);
    }

    #[test]
    fn commit_scan_counts_missing_metrics() {
        let store = RuleStore::new();
        store.insert(sample_rule("rule-1"));
        let scan = store.commit_scan(&MetricSnapshot::new().with("other", 1.0), now(), None);
        assert!(scan.hits.is_empty());
        assert_eq!(scan.missing_metrics, 1);
    }

    #[test]
    fn revise_keeps_concurrent_commit() {
        let store = RuleStore::new();
        store.insert(sample_rule("rule-1"));
        store.evaluate_and_commit("rule-1", &hot(), now(), None);
        let revised = store
            .revise("rule-1", |existing| {
                let mut next = existing.clone();
                next.name = "renamed".into();
                Ok::<_, ()>(next)
            })
            .unwrap()
            .unwrap();
        assert_eq!(revised.name, "renamed");
        assert_eq!(revised.trigger_count, 1);
        assert!(store.revise("ghost", |r| Ok::<_, ()>(r.clone())).is_none());
    }

    #[test]
    fn concurrent_ticks_fire_once() {
        let store = RuleStore::new();
        store.insert(sample_rule("rule-1"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.commit_scan(&hot(), now(), None).hits.len())
            })
            .collect();
        let fired: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(fired, 1);
        assert_eq!(store.get("rule-1").unwrap().trigger_count, 1);
    }

    #[test]
    fn fire_now_bypasses_conditions_and_cooldown() {
        let store = RuleStore::new();
        let mut rule = sample_rule("rule-1");
        rule.last_triggered_at = Some(now());
        rule.trigger_count = 2;
        store.insert(rule);
        let fired = store.fire_now("rule-1", now() + Duration::minutes(1)).unwrap();
        assert_eq!(fired.trigger_count, 3);
    }

    #[test]
    fn fire_now_refuses_inactive_and_unknown() {
        let store = RuleStore::new();
        let mut rule = sample_rule("rule-1");
        rule.is_active = false;
        store.insert(rule);
        assert_eq!(
            store.fire_now("rule-1", now()),
            Err(FireError::Inactive("rule-1".into()))
        );
        assert_eq!(
            store.fire_now("ghost", now()),
            Err(FireError::NotFound("ghost".into()))
        );
    }
}
