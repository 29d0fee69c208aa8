use anyhow::{Context, Result};
use clap::Args;

use super::helpers;
use crate::output::{print_error, print_json, print_success, OutputMode};

#[derive(Args)]
pub struct HealthArgs;

pub async fn execute(
    _args: HealthArgs,
    mode: OutputMode,
    server: Option<String>,
    config_path: Option<String>,
) -> Result<()> {
    let base = helpers::resolve_server(server.as_deref(), config_path.as_deref())?;

    let healthz = check_endpoint(&format!("{base}/healthz")).await;
    let ready = check_endpoint(&format!("{base}/ready")).await;

    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "healthz": healthz.is_ok(),
            "ready": ready.as_ref().ok(),
        }))?,
        OutputMode::Human => {
            match &healthz {
                Ok(_) => print_success("Health check: OK"),
                Err(e) => print_error(&format!("Health check: {e}")),
            }
            match &ready {
                Ok(body) => print_success(&format!(
                    "Ready: {} rules ({} active), snapshot received: {}",
                    body["rules"], body["active_rules"], body["has_snapshot"]
                )),
                Err(e) => print_error(&format!("Ready check: {e}")),
            }
        }
    }

    Ok(())
}

async fn check_endpoint(url: &str) -> Result<serde_json::Value> {
    let resp = reqwest::get(url).await.context("connection failed")?;

    if resp.status().is_success() {
        Ok(resp.json().await.unwrap_or(serde_json::Value::Null))
    } else {
        anyhow::bail!("HTTP {}", resp.status())
    }
}
