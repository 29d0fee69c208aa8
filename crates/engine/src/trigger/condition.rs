use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    pub metric: String,
    pub operator: Operator,
    #[serde(alias = "threshold_string")]
    pub threshold: Threshold,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Operator {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    /// Percentage change against the previous value of the metric.
    #[serde(rename = "changed_by")]
    ChangedBy,
}

/// Threshold as stored: either a number or a numeric string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Threshold {
    Number(f64),
    Text(String),
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Self::LessThan,
        Self::GreaterThan,
        Self::LessOrEqual,
        Self::GreaterOrEqual,
        Self::Equal,
        Self::NotEqual,
        Self::ChangedBy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessOrEqual => "<=",
            Self::GreaterOrEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::ChangedBy => "changed_by",
        }
    }

    /// Direct comparison of `value` against `threshold`.
    ///
    /// For `ChangedBy`, `value` is the absolute percent change; zero change
    /// never satisfies it.
    pub fn compare(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::LessThan => value < threshold,
            Self::GreaterThan => value > threshold,
            Self::LessOrEqual => value <= threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::Equal => value == threshold,
            Self::NotEqual => value != threshold,
            Self::ChangedBy => value > 0.0 && value >= threshold,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl Threshold {
    /// Finite numeric value, or `None` when the threshold cannot be used.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Self::Number(v) => *v,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

impl From<f64> for Threshold {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_operators() {
        assert!(Operator::GreaterThan.compare(10.0, 5.0));
        assert!(!Operator::GreaterThan.compare(5.0, 5.0));
        assert!(Operator::LessThan.compare(1.0, 5.0));
        assert!(!Operator::LessThan.compare(10.0, 5.0));
    }

    #[test]
    fn boundaries() {
        assert!(Operator::GreaterOrEqual.compare(5.0, 5.0));
        assert!(Operator::LessOrEqual.compare(5.0, 5.0));
        assert!(!Operator::LessOrEqual.compare(5.1, 5.0));
    }

    #[test]
    fn equality() {
        assert!(Operator::Equal.compare(5.0, 5.0));
        assert!(!Operator::Equal.compare(5.1, 5.0));
        assert!(Operator::NotEqual.compare(5.1, 5.0));
        assert!(!Operator::NotEqual.compare(5.0, 5.0));
    }

    #[test]
    fn equality_has_no_tolerance() {
        assert!(!Operator::Equal.compare(1e-17, 0.0));
        assert!(Operator::NotEqual.compare(1e-17, 0.0));
        assert!(!Operator::Equal.compare(0.1 + 0.2, 0.3));
    }

    #[test]
    fn changed_by_needs_nonzero_change() {
        assert!(Operator::ChangedBy.compare(25.0, 20.0));
        assert!(!Operator::ChangedBy.compare(15.0, 20.0));
        assert!(Operator::ChangedBy.compare(0.5, 0.0));
        assert!(!Operator::ChangedBy.compare(0.0, 0.0));
    }

    #[test]
    fn operator_round_trips_symbols() {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>(), Ok(op));
        }
        assert!("=>".parse::<Operator>().is_err());
    }

    #[test]
    fn operator_serde_uses_symbols() {
        let json = serde_json::to_string(&Operator::LessOrEqual).unwrap();
        assert_eq!(json, r#""<=""#);
        let op: Operator = serde_json::from_str(r#""changed_by""#).unwrap();
        assert_eq!(op, Operator::ChangedBy);
    }

    #[test]
    fn threshold_coercion() {
        assert_eq!(Threshold::Number(70.0).as_f64(), Some(70.0));
        assert_eq!(Threshold::Text(" 12.5 ".into()).as_f64(), Some(12.5));
        assert_eq!(Threshold::Text("seventy".into()).as_f64(), None);
        assert_eq!(Threshold::Text("NaN".into()).as_f64(), None);
        assert_eq!(Threshold::Number(f64::INFINITY).as_f64(), None);
    }

    #[test]
    fn threshold_string_alias() {
        let json = r#"{"metric":"m","operator":">=","threshold_string":"0.75"}"#;
        let c: Condition = serde_json::from_str(json).unwrap();
        assert_eq!(c.threshold.as_f64(), Some(0.75));
    }
}
