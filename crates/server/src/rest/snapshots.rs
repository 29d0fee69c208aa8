use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;

use hermes_engine::trigger::MetricSnapshot;
use hermes_engine::TickReport;

use super::error::ApiError;
use super::AppState;

pub async fn push_snapshot(
    State(state): State<AppState>,
    snapshot: Result<Json<MetricSnapshot>, JsonRejection>,
) -> Result<Json<TickReport>, ApiError> {
    let Json(snapshot) = snapshot?;
    tracing::debug!(metrics = snapshot.len(), "snapshot received");
    Ok(Json(state.engine.tick(snapshot, Utc::now())))
}
