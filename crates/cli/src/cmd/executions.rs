use anyhow::Result;
use clap::Args;
use serde_json::Value;

use super::helpers::{self, check_response};
use crate::output::{build_table, print_json, print_success, spinner, theme, OutputMode};

#[derive(Args)]
pub struct ExecutionsArgs {
    #[arg(long, default_value_t = 20, help = "Number of records to show")]
    limit: usize,
}

pub async fn execute(
    args: ExecutionsArgs,
    mode: OutputMode,
    server: Option<String>,
    config_path: Option<String>,
) -> Result<()> {
    let base = helpers::resolve_server(server.as_deref(), config_path.as_deref())?;
    let url = format!("{base}/v1/executions?limit={}", args.limit);

    let sp = match mode {
        OutputMode::Human => Some(spinner::create("Fetching executions...")),
        OutputMode::Json => None,
    };

    let records: Vec<Value> = check_response(reqwest::get(&url).await?).await?.json().await?;

    if let Some(sp) = sp {
        spinner::finish_clear(&sp);
    }

    match mode {
        OutputMode::Json => print_json(&records)?,
        OutputMode::Human => {
            if records.is_empty() {
                print_success("No executions recorded");
                return Ok(());
            }
            theme::print_header("Recent Executions");
            let mut table = build_table(&["Fired at", "Rule", "Manual", "Status", "Error"]);
            for r in &records {
                let ok = r["status"].as_str() == Some("dispatched");
                table.add_row(vec![
                    r["fired_at"].as_str().unwrap_or("-").to_string(),
                    r["rule_name"].as_str().unwrap_or("-").to_string(),
                    theme::yes_no(r["manual"].as_bool().unwrap_or(false)),
                    theme::status(r["status"].as_str().unwrap_or("-"), ok),
                    r["error"].as_str().unwrap_or("").to_string(),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}
