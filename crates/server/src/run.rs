use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use hermes_engine::dispatch::{DispatchWorker, ExecutionLog};
use hermes_engine::metrics::EngineMetrics;
use hermes_engine::trigger::{Rule, RuleStore};
use hermes_engine::TriggerEngine;

use crate::config::{load_rules_file, ServerConfig};
use crate::dispatch::build_dispatcher;
use crate::rest::{self, AppState};
use crate::ticker::Ticker;

/// Engine state shared with the REST layer plus the worker draining its
/// dispatch queue.
pub struct App {
    pub state: AppState,
    pub worker: DispatchWorker,
}

pub fn build(config: &ServerConfig, rules: Vec<Rule>) -> App {
    let store = RuleStore::new();
    for rule in rules {
        store.insert(rule);
    }

    let metrics = EngineMetrics::new();
    let (engine, rx) = TriggerEngine::new(
        store,
        config.engine.dispatch_queue_capacity,
        metrics.clone(),
    );
    let executions = ExecutionLog::new(config.engine.execution_log_capacity);
    let worker = DispatchWorker::new(
        rx,
        build_dispatcher(&config.dispatch),
        config.engine.dispatch_concurrency,
        executions.clone(),
        metrics,
    );

    App {
        state: AppState {
            engine: Arc::new(engine),
            executions,
        },
        worker,
    }
}

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let rules = match &config.rules_file {
        Some(path) => load_rules_file(path)
            .with_context(|| format!("loading rules from {}", path.display()))?,
        None => Vec::new(),
    };
    tracing::info!(rules = rules.len(), "rules loaded");

    let App { state, worker } = build(&config, rules);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let worker_handle = tokio::spawn(worker.run_until(async move {
        let _ = stop_rx.await;
    }));

    let ticker = config.engine.tick_interval().map(|interval| {
        tracing::info!(interval_s = interval.as_secs(), "periodic ticking enabled");
        Ticker {
            interval,
            engine: state.engine.clone(),
        }
        .spawn()
    });

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "REST server starting");

    axum::serve(listener, rest::router(state))
        .with_graceful_shutdown(crate::shutdown::wait_for_shutdown())
        .await
        .context("REST server failed")?;

    tracing::info!("shutting down");
    if let Some(ticker) = ticker {
        ticker.abort();
    }
    let _ = stop_tx.send(());
    if let Err(e) = worker_handle.await {
        tracing::error!(error = %e, "dispatch worker panicked");
    }
    Ok(())
}
