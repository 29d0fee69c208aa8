use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Metric name to value at a single evaluation instant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct MetricSnapshot {
    values: HashMap<String, f64>,
}

impl MetricSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.values.contains_key(metric)
    }

    pub fn insert(&mut self, metric: impl Into<String>, value: f64) {
        self.values.insert(metric.into(), value);
    }

    pub fn with(mut self, metric: impl Into<String>, value: f64) -> Self {
        self.insert(metric, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for MetricSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Source of the current metric snapshot for scheduled ticks.
pub trait MetricSnapshotProvider: Send + Sync {
    fn current(&self) -> Option<MetricSnapshot>;
}

/// Last snapshot seen by the engine; the baseline for `changed_by`.
#[derive(Clone, Default)]
pub struct SnapshotHistory {
    latest: Arc<Mutex<Option<MetricSnapshot>>>,
}

impl SnapshotHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `next` and returns the snapshot it replaces, atomically.
    pub fn replace(&self, next: MetricSnapshot) -> Option<MetricSnapshot> {
        let mut guard = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        guard.replace(next)
    }

    pub fn latest(&self) -> Option<MetricSnapshot> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MetricSnapshotProvider for SnapshotHistory {
    fn current(&self) -> Option<MetricSnapshot> {
        self.latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_plain_map() {
        let snap: MetricSnapshot =
            serde_json::from_str(r#"{"risk_score": 82, "consistency_score": 45.5}"#).unwrap();
        assert_eq!(snap.get("risk_score"), Some(82.0));
        assert_eq!(snap.get("consistency_score"), Some(45.5));
        assert_eq!(snap.get("missing"), None);
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn history_returns_replaced_snapshot() {
        let history = SnapshotHistory::new();
        assert!(history.replace(MetricSnapshot::new().with("a", 1.0)).is_none());
        let prev = history.replace(MetricSnapshot::new().with("a", 2.0)).unwrap();
        assert_eq!(prev.get("a"), Some(1.0));
        assert_eq!(history.current().unwrap().get("a"), Some(2.0));
    }

    #[test]
    fn collects_from_pairs() {
        let snap: MetricSnapshot = [("x", 1.0), ("y", 2.0)].into_iter().collect();
        assert!(snap.contains("x"));
        assert!(!snap.is_empty());
    }
}
