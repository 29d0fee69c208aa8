use anyhow::Result;
use clap::Args;
use serde_json::Value;

use super::helpers::{self, check_response};
use crate::output::{confirm, print_json, spinner, theme, OutputMode};

#[derive(Args)]
pub struct TriggerArgs {
    #[arg(help = "Rule ID")]
    id: String,
    #[arg(long, help = "Skip confirmation prompt")]
    yes: bool,
}

/// Fires a rule now, bypassing its conditions and cooldown.
pub async fn execute(
    args: TriggerArgs,
    mode: OutputMode,
    server: Option<String>,
    config_path: Option<String>,
) -> Result<()> {
    let base = helpers::resolve_server(server.as_deref(), config_path.as_deref())?;

    if mode == OutputMode::Human && !args.yes {
        let msg = format!("Fire rule '{}' now?", args.id);
        if !confirm::confirm_action(&msg) {
            theme::print_dim("Cancelled.");
            return Ok(());
        }
    }

    let sp = match mode {
        OutputMode::Human => Some(spinner::create("Triggering rule...")),
        OutputMode::Json => None,
    };

    let url = format!("{base}/v1/rules/{}/trigger", args.id);
    let resp = reqwest::Client::new().post(&url).send().await?;
    let event: Value = match check_response(resp).await {
        Ok(resp) => resp.json().await?,
        Err(e) => {
            if let Some(sp) = sp {
                spinner::finish_err(&sp, &e.to_string());
            }
            return Err(e);
        }
    };

    if let Some(sp) = sp {
        spinner::finish_ok(&sp, &format!("Rule '{}' triggered", args.id));
    }

    match mode {
        OutputMode::Json => print_json(&event)?,
        OutputMode::Human => {
            theme::print_kv("Event", event["id"].as_str().unwrap_or("-"));
            theme::print_kv("Trigger count", &event["trigger_count"].to_string());
            theme::print_kv("Modules", &event["modules_to_trigger"].to_string());
        }
    }

    Ok(())
}
