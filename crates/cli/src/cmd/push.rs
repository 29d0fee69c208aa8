use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use super::helpers::{self, check_response, parse_json_data};
use crate::output::{build_table, print_json, print_success, spinner, theme, OutputMode};

#[derive(Args)]
pub struct PushArgs {
    #[arg(long, help = "Snapshot as inline JSON or a JSON/YAML file, e.g. '{\"risk_score\": 82}'")]
    data: String,
}

/// Pushes a metric snapshot; the server runs a committed tick on it.
pub async fn execute(
    args: PushArgs,
    mode: OutputMode,
    server: Option<String>,
    config_path: Option<String>,
) -> Result<()> {
    let base = helpers::resolve_server(server.as_deref(), config_path.as_deref())?;
    let snapshot = parse_json_data(&args.data)?;
    if !snapshot.is_object() {
        anyhow::bail!("snapshot must be an object of metric name to number");
    }

    let sp = match mode {
        OutputMode::Human => Some(spinner::create("Pushing snapshot...")),
        OutputMode::Json => None,
    };

    let url = format!("{base}/v1/snapshots");
    let resp = reqwest::Client::new()
        .post(&url)
        .json(&snapshot)
        .send()
        .await
        .context("sending snapshot")?;
    let report: Value = check_response(resp).await?.json().await?;

    if let Some(sp) = sp {
        spinner::finish_clear(&sp);
    }

    match mode {
        OutputMode::Json => print_json(&report)?,
        OutputMode::Human => {
            let fired = report["fired"].as_array().cloned().unwrap_or_default();
            if fired.is_empty() {
                print_success(&format!(
                    "No rules fired ({} skipped)",
                    report["skipped"].as_u64().unwrap_or(0)
                ));
                return Ok(());
            }
            theme::print_header("Fired Rules");
            let mut table = build_table(&["ID", "Name", "Priority", "Severity", "Fired", "Modules"]);
            for hit in &fired {
                let rule = &hit["rule"];
                table.add_row(vec![
                    rule["id"].as_str().unwrap_or("-").to_string(),
                    rule["name"].as_str().unwrap_or("-").to_string(),
                    rule["priority"].to_string(),
                    theme::severity(rule["severity"].as_str().unwrap_or("-")),
                    rule["trigger_count"].to_string(),
                    rule["modules_to_trigger"].to_string(),
                ]);
            }
            println!("{table}");
            let dropped = report["dropped"].as_u64().unwrap_or(0);
            if dropped > 0 {
                theme::print_warning(&format!("{dropped} event(s) dropped: dispatch queue full"));
            }
        }
    }

    Ok(())
}
