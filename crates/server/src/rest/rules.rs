use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use hermes_engine::trigger::{Evaluation, FiredEvent, MetricSnapshot, Rule, RuleDraft};

use super::error::ApiError;
use super::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub active: Option<bool>,
}

pub async fn list_rules(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Json<Vec<Rule>> {
    let store = state.engine.store();
    let rules = match q.active {
        Some(true) => store.list_active(),
        Some(false) => store.list().into_iter().filter(|r| !r.is_active).collect(),
        None => store.list(),
    };
    Json(rules)
}

pub async fn get_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
) -> Result<Json<Rule>, ApiError> {
    state
        .engine
        .store()
        .get(&rule_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("rule '{rule_id}' not found")))
}

pub async fn create_rule(
    State(state): State<AppState>,
    body: Result<Json<RuleDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Rule>), ApiError> {
    let Json(body) = body?;
    let rule = state.engine.create_rule(body)?;
    Ok((StatusCode::CREATED, Json(rule)))
}

/// Replaces the rule definition; firing history is kept.
pub async fn update_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
    body: Result<Json<RuleDraft>, JsonRejection>,
) -> Result<Json<Rule>, ApiError> {
    let Json(body) = body?;
    let rule = state.engine.revise_rule(&rule_id, |_| body)?;
    Ok(Json(rule))
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine.delete_rule(&rule_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn trigger_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
) -> Result<(StatusCode, Json<FiredEvent>), ApiError> {
    let event = state.engine.trigger_manually(&rule_id, Utc::now())?;
    Ok((StatusCode::ACCEPTED, Json(event)))
}

pub async fn evaluate_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
    snapshot: Result<Json<MetricSnapshot>, JsonRejection>,
) -> Result<Json<Evaluation>, ApiError> {
    let Json(snapshot) = snapshot?;
    let evaluation = state
        .engine
        .evaluate_dry_run(&rule_id, &snapshot, Utc::now())?;
    Ok(Json(evaluation))
}
