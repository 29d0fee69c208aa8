use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use hermes_engine::TriggerEngine;

/// Re-ticks the engine's latest snapshot every `interval`, so rules whose
/// cooldown has expired can fire again without a new push.
pub struct Ticker {
    pub interval: Duration,
    pub engine: Arc<TriggerEngine>,
}

pub struct TickerHandle {
    handle: JoinHandle<()>,
}

impl TickerHandle {
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Ticker {
    pub fn spawn(self) -> TickerHandle {
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(self.interval).await;
                let Some(report) = self.engine.retick(Utc::now()) else {
                    tracing::debug!("no snapshot yet, skipping tick");
                    continue;
                };
                if !report.fired.is_empty() {
                    tracing::info!(fired = report.fired.len(), "periodic tick fired rules");
                }
            }
        });
        TickerHandle { handle }
    }
}
