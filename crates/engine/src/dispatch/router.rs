use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::dispatcher::{DispatchError, Dispatcher};
use crate::trigger::FiredEvent;

/// Sends a fired event to the dispatcher configured for each of its
/// `modules_to_trigger`. Modules without a route, or an event with no
/// modules, go to the fallback once.
pub struct ModuleRouter {
    routes: HashMap<String, Arc<dyn Dispatcher>>,
    fallback: Arc<dyn Dispatcher>,
}

impl ModuleRouter {
    pub fn new(fallback: Arc<dyn Dispatcher>) -> Self {
        Self {
            routes: HashMap::new(),
            fallback,
        }
    }

    pub fn route(mut self, module: impl Into<String>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.routes.insert(module.into(), dispatcher);
        self
    }

    fn targets(&self, event: &FiredEvent) -> Vec<(String, Arc<dyn Dispatcher>)> {
        let mut targets = Vec::new();
        let mut needs_fallback = event.modules_to_trigger.is_empty();

        for module in &event.modules_to_trigger {
            match self.routes.get(module) {
                Some(d) => targets.push((module.clone(), d.clone())),
                None => needs_fallback = true,
            }
        }
        if needs_fallback {
            targets.push((self.fallback.name().to_string(), self.fallback.clone()));
        }
        targets
    }
}

#[async_trait]
impl Dispatcher for ModuleRouter {
    fn name(&self) -> &str {
        "router"
    }

    async fn dispatch(&self, event: &FiredEvent) -> Result<(), DispatchError> {
        let targets = self.targets(event);
        let total = targets.len();
        let mut errors = Vec::new();

        // Every target is attempted even when an earlier one fails.
        for (module, dispatcher) in targets {
            if let Err(e) = dispatcher.dispatch(event).await {
                tracing::warn!(rule_id = %event.rule_id, %module, error = %e, "module dispatch failed");
                errors.push(e);
            }
        }

        match errors.len() {
            0 => Ok(()),
            1 if total == 1 => Err(errors.remove(0)),
            failed => Err(DispatchError::Partial {
                failed,
                total,
                first: errors[0].to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{MetricSnapshot, Severity};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct Counting {
        calls: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl Dispatcher for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn dispatch(&self, _event: &FiredEvent) -> Result<(), DispatchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(DispatchError::Transport("down".into()))
            } else {
                Ok(())
            }
        }
    }

    fn event(modules: &[&str]) -> FiredEvent {
        FiredEvent {
            id: "evt".into(),
            rule_id: "r".into(),
            rule_name: "r".into(),
            trigger_type: String::new(),
            severity: Severity::Info,
            modules_to_trigger: modules.iter().map(|m| m.to_string()).collect(),
            trigger_count: 1,
            snapshot: MetricSnapshot::new(),
            fired_at: chrono::Utc::now(),
            manual: false,
        }
    }

    #[tokio::test]
    async fn routes_known_modules() {
        let fallback = Arc::new(Counting::default());
        let notify = Arc::new(Counting::default());
        let router = ModuleRouter::new(fallback.clone()).route("notify", notify.clone());

        router.dispatch(&event(&["notify"])).await.unwrap();

        assert_eq!(notify.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_modules_hit_fallback_once() {
        let fallback = Arc::new(Counting::default());
        let router = ModuleRouter::new(fallback.clone());

        router.dispatch(&event(&["a", "b"])).await.unwrap();
        router.dispatch(&event(&[])).await.unwrap();

        assert_eq!(fallback.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn one_failing_module_does_not_block_others() {
        let fallback = Arc::new(Counting::default());
        let broken = Arc::new(Counting {
            fail: true,
            ..Default::default()
        });
        let task = Arc::new(Counting::default());
        let router = ModuleRouter::new(fallback)
            .route("workflow", broken.clone())
            .route("create_task", task.clone());

        let err = router
            .dispatch(&event(&["workflow", "create_task"]))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Partial { failed: 1, total: 2, .. }));
        assert_eq!(task.calls.load(Ordering::SeqCst), 1);
    }
}
