use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use hermes_engine::dispatch::ExecutionLog;
use hermes_engine::TriggerEngine;

use super::{executions, health, metrics, rules, snapshots};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TriggerEngine>,
    pub executions: ExecutionLog,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/ready", get(health::ready))
        .route("/metrics", get(metrics::metrics))
        .route("/v1/rules", get(rules::list_rules).post(rules::create_rule))
        .route(
            "/v1/rules/{rule_id}",
            get(rules::get_rule)
                .put(rules::update_rule)
                .delete(rules::delete_rule),
        )
        .route("/v1/rules/{rule_id}/trigger", post(rules::trigger_rule))
        .route("/v1/rules/{rule_id}/evaluate", post(rules::evaluate_rule))
        .route("/v1/snapshots", post(snapshots::push_snapshot))
        .route("/v1/executions", get(executions::list_executions))
        .with_state(state)
}
