use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::trigger::FiredEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Dispatched,
    Failed,
}

/// Outcome of dispatching one fired event.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    pub event_id: String,
    pub rule_id: String,
    pub rule_name: String,
    pub modules: Vec<String>,
    pub manual: bool,
    pub status: ExecutionStatus,
    pub error: Option<String>,
    pub fired_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ExecutionRecord {
    pub fn dispatched(event: &FiredEvent, completed_at: DateTime<Utc>) -> Self {
        Self::from_event(event, ExecutionStatus::Dispatched, None, completed_at)
    }

    pub fn failed(event: &FiredEvent, error: String, completed_at: DateTime<Utc>) -> Self {
        Self::from_event(event, ExecutionStatus::Failed, Some(error), completed_at)
    }

    fn from_event(
        event: &FiredEvent,
        status: ExecutionStatus,
        error: Option<String>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: event.id.clone(),
            rule_id: event.rule_id.clone(),
            rule_name: event.rule_name.clone(),
            modules: event.modules_to_trigger.clone(),
            manual: event.manual,
            status,
            error,
            fired_at: event.fired_at,
            completed_at,
        }
    }
}

/// Bounded log of recent executions; the oldest record is evicted first.
#[derive(Clone)]
pub struct ExecutionLog {
    records: Arc<Mutex<VecDeque<ExecutionRecord>>>,
    capacity: usize,
}

impl ExecutionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&self, record: ExecutionRecord) {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Newest first.
    pub fn recent(&self, limit: usize) -> Vec<ExecutionRecord> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
