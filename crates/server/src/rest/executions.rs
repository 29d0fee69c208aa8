use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use hermes_engine::dispatch::ExecutionRecord;

use super::AppState;

const DEFAULT_LIMIT: usize = 50;

#[derive(Deserialize)]
pub struct ExecutionsQuery {
    pub limit: Option<usize>,
}

pub async fn list_executions(
    State(state): State<AppState>,
    Query(q): Query<ExecutionsQuery>,
) -> Json<Vec<ExecutionRecord>> {
    Json(state.executions.recent(q.limit.unwrap_or(DEFAULT_LIMIT)))
}
