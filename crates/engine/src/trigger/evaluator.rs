use chrono::{DateTime, Utc};
use serde::Serialize;

use super::condition::{Condition, Operator};
use super::rule::{LogicOperator, Rule};
use super::snapshot::MetricSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Evaluation {
    Fired(Firing),
    Skipped { reason: SkipReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Inactive,
    Cooldown,
    NoConditions,
    ConditionsNotMet,
}

/// Per-condition detail of a firing, in condition order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Firing {
    pub outcomes: Vec<ConditionOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionOutcome {
    pub metric: String,
    pub value: Option<f64>,
    pub satisfied: bool,
}

impl Evaluation {
    pub fn is_fired(&self) -> bool {
        matches!(self, Self::Fired(_))
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Fired(_) => None,
            Self::Skipped { reason } => Some(*reason),
        }
    }

    fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Cooldown => "cooldown",
            Self::NoConditions => "invalid: no conditions",
            Self::ConditionsNotMet => "conditions not met",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether one condition holds for `snapshot`.
///
/// Fails closed: a missing metric, an unusable threshold, or a `changed_by`
/// without a nonzero previous value all yield `false`.
pub fn evaluate_condition(
    condition: &Condition,
    snapshot: &MetricSnapshot,
    previous_value: Option<f64>,
) -> bool {
    let Some(current) = snapshot.get(&condition.metric) else {
        tracing::debug!(metric = %condition.metric, "metric missing from snapshot");
        return false;
    };
    let Some(threshold) = condition.threshold.as_f64() else {
        tracing::debug!(
            metric = %condition.metric,
            threshold = %condition.threshold,
            "threshold is not numeric"
        );
        return false;
    };

    match condition.operator {
        Operator::ChangedBy => match percent_change(current, previous_value) {
            Some(change) => Operator::ChangedBy.compare(change.abs(), threshold),
            None => false,
        },
        op => op.compare(current, threshold),
    }
}

fn percent_change(current: f64, previous: Option<f64>) -> Option<f64> {
    let previous = previous?;
    if previous == 0.0 || !previous.is_finite() {
        return None;
    }
    let change = (current - previous) / previous * 100.0;
    change.is_finite().then_some(change)
}

/// Decides whether `rule` fires at `now`. Pure: committing the firing is up
/// to the caller.
pub fn evaluate_rule(
    rule: &Rule,
    snapshot: &MetricSnapshot,
    now: DateTime<Utc>,
    previous: Option<&MetricSnapshot>,
) -> Evaluation {
    if !rule.is_active {
        return Evaluation::skipped(SkipReason::Inactive);
    }
    if rule.in_cooldown(now) {
        return Evaluation::skipped(SkipReason::Cooldown);
    }
    if rule.conditions.is_empty() {
        return Evaluation::skipped(SkipReason::NoConditions);
    }

    let outcomes: Vec<ConditionOutcome> = rule
        .conditions
        .iter()
        .map(|c| {
            let previous_value = previous.and_then(|p| p.get(&c.metric));
            ConditionOutcome {
                metric: c.metric.clone(),
                value: snapshot.get(&c.metric),
                satisfied: evaluate_condition(c, snapshot, previous_value),
            }
        })
        .collect();

    if combine(rule.logic_operator, &outcomes) {
        Evaluation::Fired(Firing { outcomes })
    } else {
        Evaluation::skipped(SkipReason::ConditionsNotMet)
    }
}

// A single condition decides on its own whatever the operator says.
fn combine(logic: LogicOperator, outcomes: &[ConditionOutcome]) -> bool {
    match (outcomes, logic) {
        ([only], _) => only.satisfied,
        (all, LogicOperator::And) => all.iter().all(|o| o.satisfied),
        (all, LogicOperator::Or) => all.iter().any(|o| o.satisfied),
    }
}
