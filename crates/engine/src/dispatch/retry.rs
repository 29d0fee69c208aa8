use async_trait::async_trait;

use super::dispatcher::{DispatchError, Dispatcher};
use crate::trigger::FiredEvent;
use hermes_common::retry::{retry_async, RetryConfig};

/// Re-attempts a failed dispatch per `policy`. With the default policy a
/// dispatch is attempted exactly once.
pub struct RetryDispatcher<D: Dispatcher> {
    inner: D,
    policy: RetryConfig,
}

impl<D: Dispatcher> RetryDispatcher<D> {
    pub fn new(inner: D, policy: RetryConfig) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<D: Dispatcher> Dispatcher for RetryDispatcher<D> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn dispatch(&self, event: &FiredEvent) -> Result<(), DispatchError> {
        retry_async(&self.policy, || self.inner.dispatch(event)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{MetricSnapshot, Severity};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct FailingDispatcher {
        calls: AtomicU32,
        max_failures: u32,
    }

    impl FailingDispatcher {
        fn new(max_failures: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                max_failures,
            }
        }
    }

    #[async_trait]
    impl Dispatcher for FailingDispatcher {
        fn name(&self) -> &str {
            "test"
        }

        async fn dispatch(&self, _event: &FiredEvent) -> Result<(), DispatchError> {
            let count = self.calls.fetch_add(1, Ordering::SeqCst);
            if count < self.max_failures {
                Err(DispatchError::Transport(format!("fail #{}", count + 1)))
            } else {
                Ok(())
            }
        }
    }

    fn sample_event() -> FiredEvent {
        FiredEvent {
            id: "evt-1".into(),
            rule_id: "r-1".into(),
            rule_name: "test rule".into(),
            trigger_type: String::new(),
            severity: Severity::Warning,
            modules_to_trigger: vec![],
            trigger_count: 1,
            snapshot: MetricSnapshot::new(),
            fired_at: chrono::Utc::now(),
            manual: false,
        }
    }

    fn policy(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            backoff_factor: 1.0,
        }
    }

    #[tokio::test]
    async fn default_policy_is_at_most_once() {
        let retry = RetryDispatcher::new(FailingDispatcher::new(1), RetryConfig::default());
        assert!(retry.dispatch(&sample_event()).await.is_err());
        assert_eq!(retry.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_after_retries() {
        let retry = RetryDispatcher::new(FailingDispatcher::new(2), policy(3));
        assert!(retry.dispatch(&sample_event()).await.is_ok());
        assert_eq!(retry.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fails_after_max_attempts() {
        let retry = RetryDispatcher::new(FailingDispatcher::new(10), policy(2));
        assert!(retry.dispatch(&sample_event()).await.is_err());
        assert_eq!(retry.inner.calls.load(Ordering::SeqCst), 2);
    }
}
