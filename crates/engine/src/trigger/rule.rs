use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::condition::Condition;

/// A persisted trigger rule.
///
/// Serializes to the entity shape the governance UI stores, so rules can be
/// exchanged with it verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub trigger_type: String,
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub logic_operator: LogicOperator,
    #[serde(default = "yes")]
    pub is_active: bool,
    #[serde(default)]
    pub cooldown_minutes: u32,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub trigger_count: u64,
    #[serde(default)]
    pub last_triggered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modules_to_trigger: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogicOperator {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Critical,
}

impl Rule {
    pub fn cooldown(&self) -> Duration {
        Duration::minutes(i64::from(self.cooldown_minutes))
    }

    /// True while `now` falls inside the cooldown window of the last firing.
    /// A clock that reads earlier than the last firing counts as inside.
    pub fn in_cooldown(&self, now: DateTime<Utc>) -> bool {
        match self.last_triggered_at {
            None => false,
            Some(last) if now < last => true,
            Some(last) => now - last < self.cooldown(),
        }
    }

    pub fn record_firing(&mut self, now: DateTime<Utc>) {
        self.trigger_count = self.trigger_count.saturating_add(1);
        self.last_triggered_at = Some(now);
    }
}

impl LogicOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl std::str::FromStr for LogicOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            _ => Err(s.to_string()),
        }
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            _ => Err(s.to_string()),
        }
    }
}

fn yes() -> bool {
    true
}
