use async_trait::async_trait;

use crate::trigger::FiredEvent;

/// Downstream action invoked for a fired rule.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    fn name(&self) -> &str;
    async fn dispatch(&self, event: &FiredEvent) -> Result<(), DispatchError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("encode: {0}")]
    Encode(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("rejected with status {0}")]
    Rejected(u16),
    #[error("{failed} of {total} modules failed: {first}")]
    Partial {
        failed: usize,
        total: usize,
        first: String,
    },
}
