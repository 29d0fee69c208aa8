use async_trait::async_trait;

use super::dispatcher::{DispatchError, Dispatcher};
use crate::trigger::FiredEvent;

/// Records the firing in the log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

#[async_trait]
impl Dispatcher for LogDispatcher {
    fn name(&self) -> &str {
        "log"
    }

    async fn dispatch(&self, event: &FiredEvent) -> Result<(), DispatchError> {
        tracing::info!(
            event_id = %event.id,
            rule_id = %event.rule_id,
            rule_name = %event.rule_name,
            severity = event.severity_str(),
            modules = ?event.modules_to_trigger,
            manual = event.manual,
            "rule fired"
        );
        Ok(())
    }
}
