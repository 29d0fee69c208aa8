mod condition;
mod evaluator;
mod event;
mod rule;
mod scanner;
mod snapshot;
mod store;
pub mod test_harness;
mod validate;

pub use condition::{Condition, Operator, Threshold};
pub use evaluator::{evaluate_condition, evaluate_rule, ConditionOutcome, Evaluation, Firing, SkipReason};
pub use event::FiredEvent;
pub use rule::{LogicOperator, Rule, Severity};
pub use scanner::{firing_order, scan, ScanHit};
pub use snapshot::{MetricSnapshot, MetricSnapshotProvider, SnapshotHistory};
pub use store::{CommittedScan, FireError, RuleStore};
pub use validate::{validate_rule, ConditionDraft, RuleDraft, RuleSeed, ValidationError};
