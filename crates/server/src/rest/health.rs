use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub rules: usize,
    pub active_rules: usize,
    pub has_snapshot: bool,
}

pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let store = state.engine.store();
    Json(ReadyResponse {
        status: "ready".into(),
        rules: store.count(),
        active_rules: store.list_active().len(),
        has_snapshot: state.engine.history().latest().is_some(),
    })
}
