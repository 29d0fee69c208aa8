use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rule::{Rule, Severity};
use super::snapshot::MetricSnapshot;

/// A committed firing waiting to be dispatched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FiredEvent {
    pub id: String,
    pub rule_id: String,
    pub rule_name: String,
    pub trigger_type: String,
    pub severity: Severity,
    pub modules_to_trigger: Vec<String>,
    pub trigger_count: u64,
    pub snapshot: MetricSnapshot,
    pub fired_at: DateTime<Utc>,
    pub manual: bool,
}

impl FiredEvent {
    pub fn new(rule: &Rule, snapshot: &MetricSnapshot, fired_at: DateTime<Utc>) -> Self {
        Self {
            id: hermes_common::ids::generate(),
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            trigger_type: rule.trigger_type.clone(),
            severity: rule.severity,
            modules_to_trigger: rule.modules_to_trigger.clone(),
            trigger_count: rule.trigger_count,
            snapshot: snapshot.clone(),
            fired_at,
            manual: false,
        }
    }

    pub fn manual(rule: &Rule, snapshot: &MetricSnapshot, fired_at: DateTime<Utc>) -> Self {
        Self {
            manual: true,
            ..Self::new(rule, snapshot, fired_at)
        }
    }

    pub fn severity_str(&self) -> &str {
        match self.severity {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Critical => "CRIT",
        }
    }
}
