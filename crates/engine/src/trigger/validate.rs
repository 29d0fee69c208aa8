use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::condition::{Condition, Operator, Threshold};
use super::rule::{LogicOperator, Rule, Severity};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("rule name must not be empty")]
    EmptyName,
    #[error("rule must have at least one condition")]
    NoConditions,
    #[error("condition {index}: metric must not be empty")]
    EmptyMetric { index: usize },
    #[error("condition {index}: unknown operator '{operator}'")]
    UnknownOperator { index: usize, operator: String },
    #[error("condition {index}: threshold is required")]
    MissingThreshold { index: usize },
    #[error("condition {index}: threshold '{value}' is not a number")]
    InvalidThreshold { index: usize, value: String },
    #[error("condition {index}: changed_by threshold must not be negative")]
    NegativeChangeThreshold { index: usize },
    #[error("unknown logic operator '{0}'")]
    UnknownLogicOperator(String),
    #[error("unknown severity '{0}'")]
    UnknownSeverity(String),
}

/// Loosely typed rule as submitted by an editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub trigger_type: Option<String>,
    #[serde(default)]
    pub conditions: Vec<ConditionDraft>,
    #[serde(default)]
    pub logic_operator: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub cooldown_minutes: Option<u32>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub modules_to_trigger: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionDraft {
    pub metric: String,
    pub operator: String,
    #[serde(default)]
    pub threshold: Option<Threshold>,
    #[serde(default)]
    pub threshold_string: Option<String>,
}

impl RuleDraft {
    /// Validates the draft into a rule with fresh counters.
    pub fn into_rule(self, id: String) -> Result<Rule, ValidationError> {
        self.build(id, 0, None)
    }

    /// Validates the draft as an edit of `existing`, keeping its id and
    /// firing history.
    pub fn into_revision(self, existing: &Rule) -> Result<Rule, ValidationError> {
        self.build(
            existing.id.clone(),
            existing.trigger_count,
            existing.last_triggered_at,
        )
    }

    fn build(
        self,
        id: String,
        trigger_count: u64,
        last_triggered_at: Option<DateTime<Utc>>,
    ) -> Result<Rule, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.conditions.is_empty() {
            return Err(ValidationError::NoConditions);
        }

        let conditions = self
            .conditions
            .into_iter()
            .enumerate()
            .map(|(index, draft)| draft.into_condition(index))
            .collect::<Result<Vec<_>, _>>()?;

        let logic_operator = match self.logic_operator.as_deref() {
            None => LogicOperator::default(),
            Some(s) => s.parse().map_err(ValidationError::UnknownLogicOperator)?,
        };
        let severity = match self.severity.as_deref() {
            None => Severity::default(),
            Some(s) => s.parse().map_err(ValidationError::UnknownSeverity)?,
        };

        Ok(Rule {
            id,
            name: self.name.trim().to_string(),
            description: self.description.unwrap_or_default(),
            trigger_type: self.trigger_type.unwrap_or_default(),
            conditions,
            logic_operator,
            is_active: self.is_active.unwrap_or(true),
            cooldown_minutes: self.cooldown_minutes.unwrap_or(0),
            priority: self.priority.unwrap_or(0),
            severity,
            trigger_count,
            last_triggered_at,
            modules_to_trigger: self.modules_to_trigger.unwrap_or_default(),
        })
    }
}

impl ConditionDraft {
    fn into_condition(self, index: usize) -> Result<Condition, ValidationError> {
        let metric = self.metric.trim().to_string();
        if metric.is_empty() {
            return Err(ValidationError::EmptyMetric { index });
        }
        let operator: Operator =
            self.operator
                .parse()
                .map_err(|operator| ValidationError::UnknownOperator { index, operator })?;
        let threshold = self
            .threshold
            .or(self.threshold_string.map(Threshold::Text))
            .ok_or(ValidationError::MissingThreshold { index })?;

        let condition = Condition {
            metric,
            operator,
            threshold,
        };
        check_condition(index, &condition)?;
        Ok(condition)
    }
}

impl From<&Rule> for RuleDraft {
    fn from(rule: &Rule) -> Self {
        Self {
            name: rule.name.clone(),
            description: Some(rule.description.clone()),
            trigger_type: Some(rule.trigger_type.clone()),
            conditions: rule
                .conditions
                .iter()
                .map(|c| ConditionDraft {
                    metric: c.metric.clone(),
                    operator: c.operator.as_str().to_string(),
                    threshold: Some(c.threshold.clone()),
                    threshold_string: None,
                })
                .collect(),
            logic_operator: Some(rule.logic_operator.as_str().to_string()),
            is_active: Some(rule.is_active),
            cooldown_minutes: Some(rule.cooldown_minutes),
            priority: Some(rule.priority),
            severity: Some(rule.severity.as_str().to_string()),
            modules_to_trigger: Some(rule.modules_to_trigger.clone()),
        }
    }
}

/// Rule entry of a seed file: a draft with an optional fixed id.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSeed {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub draft: RuleDraft,
}

impl RuleSeed {
    /// Validates the seed, generating an id when none was given.
    pub fn into_rule(self) -> Result<Rule, ValidationError> {
        let id = self.id.unwrap_or_else(hermes_common::ids::generate);
        self.draft.into_rule(id)
    }
}

fn check_condition(index: usize, condition: &Condition) -> Result<(), ValidationError> {
    let value = condition
        .threshold
        .as_f64()
        .ok_or_else(|| ValidationError::InvalidThreshold {
            index,
            value: condition.threshold.to_string(),
        })?;
    if condition.operator == Operator::ChangedBy && value < 0.0 {
        return Err(ValidationError::NegativeChangeThreshold { index });
    }
    Ok(())
}

/// Checks a rule that arrived already typed, e.g. from a rules file.
pub fn validate_rule(rule: &Rule) -> Result<(), ValidationError> {
    if rule.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if rule.conditions.is_empty() {
        return Err(ValidationError::NoConditions);
    }
    for (index, condition) in rule.conditions.iter().enumerate() {
        if condition.metric.trim().is_empty() {
            return Err(ValidationError::EmptyMetric { index });
        }
        check_condition(index, condition)?;
    }
    Ok(())
}
