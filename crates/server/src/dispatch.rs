use std::sync::Arc;

use hermes_common::retry::RetryConfig;
use hermes_engine::dispatch::{
    Dispatcher, LogDispatcher, ModuleRouter, RetryDispatcher, WebhookDispatcher,
};

use crate::config::DispatchConfig;

/// Builds the dispatcher chain: each configured webhook module gets a
/// retrying webhook dispatcher, everything else is logged.
pub fn build_dispatcher(cfg: &DispatchConfig) -> Arc<dyn Dispatcher> {
    let policy = RetryConfig::from(&cfg.retry);
    let mut router = ModuleRouter::new(Arc::new(LogDispatcher));

    for hook in &cfg.webhooks {
        tracing::info!(module = %hook.module, url = %hook.url, "webhook route configured");
        let webhook = WebhookDispatcher::new(hook.url.clone(), hook.secret.as_bytes().to_vec());
        router = router.route(
            hook.module.clone(),
            Arc::new(RetryDispatcher::new(webhook, policy.clone())),
        );
    }

    Arc::new(router)
}
