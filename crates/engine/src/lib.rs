//! Condition-based trigger rule engine.
//!
//! [`trigger`] holds the pure evaluation core (conditions, rules, scans) and
//! the concurrent rule store; [`TriggerEngine`] commits firings and feeds the
//! [`dispatch`] queue.

pub mod dispatch;
pub mod engine;
pub mod metrics;
pub mod trigger;

pub use engine::{EngineError, TickReport, TriggerEngine};
