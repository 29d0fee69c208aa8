use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use super::dispatcher::Dispatcher;
use super::execution_log::{ExecutionLog, ExecutionRecord};
use crate::metrics::EngineMetrics;
use crate::trigger::FiredEvent;

/// Consumes fired events and dispatches each in its own task, with at most
/// `concurrency` dispatches in flight.
///
/// Rule state is committed before an event reaches this queue, so a failed
/// or cancelled dispatch is recorded and never retried here.
pub struct DispatchWorker {
    rx: mpsc::Receiver<FiredEvent>,
    dispatcher: Arc<dyn Dispatcher>,
    permits: Arc<Semaphore>,
    log: ExecutionLog,
    metrics: Arc<EngineMetrics>,
}

impl DispatchWorker {
    pub fn new(
        rx: mpsc::Receiver<FiredEvent>,
        dispatcher: Arc<dyn Dispatcher>,
        concurrency: usize,
        log: ExecutionLog,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            rx,
            dispatcher,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            log,
            metrics,
        }
    }

    /// Runs until the queue closes, then waits for in-flight dispatches.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await;
    }

    /// Runs until the queue closes or `shutdown` resolves. On shutdown,
    /// in-flight dispatches are aborted.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut tasks = JoinSet::new();

        loop {
            let event = tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(in_flight = tasks.len(), "dispatch worker shutting down");
                    tasks.shutdown().await;
                    return;
                }
                event = self.rx.recv() => event,
            };
            let Some(event) = event else {
                break;
            };

            let Ok(permit) = self.permits.clone().acquire_owned().await else {
                break;
            };
            let dispatcher = self.dispatcher.clone();
            let log = self.log.clone();
            let metrics = self.metrics.clone();
            tasks.spawn(async move {
                let _permit = permit;
                dispatch_one(dispatcher.as_ref(), &event, &log, &metrics).await;
            });

            while tasks.try_join_next().is_some() {}
        }

        while tasks.join_next().await.is_some() {}
        tracing::debug!("dispatch queue closed");
    }
}

async fn dispatch_one(
    dispatcher: &dyn Dispatcher,
    event: &FiredEvent,
    log: &ExecutionLog,
    metrics: &EngineMetrics,
) {
    match dispatcher.dispatch(event).await {
        Ok(()) => {
            metrics.inc_dispatch_ok();
            tracing::debug!(rule_id = %event.rule_id, dispatcher = dispatcher.name(), "dispatched");
            log.record(ExecutionRecord::dispatched(event, Utc::now()));
        }
        Err(e) => {
            metrics.inc_dispatch_failed();
            tracing::warn!(
                rule_id = %event.rule_id,
                event_id = %event.id,
                dispatcher = dispatcher.name(),
                error = %e,
                "dispatch failed, rule stays in cooldown"
            );
            log.record(ExecutionRecord::failed(event, e.to_string(), Utc::now()));
        }
    }
}
