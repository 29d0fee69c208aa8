use anyhow::Result;
use clap::Subcommand;
use serde_json::Value;

use super::helpers::{self, check_response, parse_json_data};
use crate::output::{build_table, confirm, print_json, print_success, spinner, theme, OutputMode};

#[derive(Subcommand)]
pub enum RulesCmd {
    List(ListArgs),
    Get(GetArgs),
    Create(CreateArgs),
    Update(UpdateArgs),
    Delete(DeleteArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {
    #[arg(long, help = "Only active rules")]
    active: bool,
}

#[derive(clap::Args)]
pub struct GetArgs {
    #[arg(help = "Rule ID")]
    id: String,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    #[arg(long, help = "JSON/YAML file path or inline JSON")]
    data: String,
}

#[derive(clap::Args)]
pub struct UpdateArgs {
    #[arg(help = "Rule ID")]
    id: String,
    #[arg(long, help = "JSON/YAML file path or inline JSON")]
    data: String,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    #[arg(help = "Rule ID")]
    id: String,
    #[arg(long, help = "Skip confirmation prompt")]
    yes: bool,
}

pub async fn execute(
    cmd: RulesCmd,
    mode: OutputMode,
    server: Option<String>,
    config_path: Option<String>,
) -> Result<()> {
    let base = helpers::resolve_server(server.as_deref(), config_path.as_deref())?;

    match cmd {
        RulesCmd::List(args) => list(&base, args, mode).await,
        RulesCmd::Get(args) => get(&base, args, mode).await,
        RulesCmd::Create(args) => create(&base, args, mode).await,
        RulesCmd::Update(args) => update(&base, args, mode).await,
        RulesCmd::Delete(args) => delete(&base, args, mode).await,
    }
}

pub(crate) fn conditions_summary(rule: &Value) -> String {
    let joiner = format!(" {} ", rule["logic_operator"].as_str().unwrap_or("AND"));
    rule["conditions"]
        .as_array()
        .map(|conds| {
            conds
                .iter()
                .map(|c| {
                    let threshold = match &c["threshold"] {
                        Value::String(s) => s.clone(),
                        v => v.to_string(),
                    };
                    format!(
                        "{} {} {}",
                        c["metric"].as_str().unwrap_or("?"),
                        c["operator"].as_str().unwrap_or("?"),
                        threshold
                    )
                })
                .collect::<Vec<_>>()
                .join(&joiner)
        })
        .unwrap_or_else(|| "-".into())
}

async fn list(base: &str, args: ListArgs, mode: OutputMode) -> Result<()> {
    let url = if args.active {
        format!("{base}/v1/rules?active=true")
    } else {
        format!("{base}/v1/rules")
    };

    let sp = match mode {
        OutputMode::Human => Some(spinner::create("Fetching rules...")),
        OutputMode::Json => None,
    };

    let resp = check_response(reqwest::get(&url).await?).await?;
    let rules: Vec<Value> = resp.json().await?;

    if let Some(sp) = sp {
        spinner::finish_clear(&sp);
    }

    match mode {
        OutputMode::Json => print_json(&rules)?,
        OutputMode::Human => {
            if rules.is_empty() {
                print_success("No trigger rules defined");
                return Ok(());
            }
            theme::print_header("Trigger Rules");
            let mut table = build_table(&[
                "ID", "Name", "Priority", "Active", "Conditions", "Cooldown", "Fired", "Last fired",
            ]);
            for r in &rules {
                table.add_row(vec![
                    r["id"].as_str().unwrap_or("-").to_string(),
                    r["name"].as_str().unwrap_or("-").to_string(),
                    r["priority"].to_string(),
                    theme::yes_no(r["is_active"].as_bool().unwrap_or(false)),
                    conditions_summary(r),
                    format!("{}m", r["cooldown_minutes"]),
                    r["trigger_count"].to_string(),
                    r["last_triggered_at"].as_str().unwrap_or("never").to_string(),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}

async fn get(base: &str, args: GetArgs, mode: OutputMode) -> Result<()> {
    let url = format!("{base}/v1/rules/{}", args.id);

    let sp = match mode {
        OutputMode::Human => Some(spinner::create("Fetching rule...")),
        OutputMode::Json => None,
    };

    let resp = check_response(reqwest::get(&url).await?).await?;
    let rule: Value = resp.json().await?;

    if let Some(sp) = sp {
        spinner::finish_clear(&sp);
    }

    match mode {
        OutputMode::Json => print_json(&rule)?,
        OutputMode::Human => {
            theme::print_header("Rule Details");
            for key in ["id", "name", "description", "trigger_type", "severity", "priority"] {
                theme::print_kv(key, &display(&rule[key]));
            }
            theme::print_kv("conditions", &conditions_summary(&rule));
            theme::print_kv("active", &theme::yes_no(rule["is_active"].as_bool().unwrap_or(false)));
            theme::print_kv("cooldown", &format!("{} min", rule["cooldown_minutes"]));
            theme::print_kv("trigger count", &display(&rule["trigger_count"]));
            theme::print_kv("last fired", rule["last_triggered_at"].as_str().unwrap_or("never"));
            theme::print_kv("modules", &display(&rule["modules_to_trigger"]));
            println!();
        }
    }

    Ok(())
}

async fn create(base: &str, args: CreateArgs, mode: OutputMode) -> Result<()> {
    let body = parse_json_data(&args.data)?;
    let url = format!("{base}/v1/rules");

    let sp = match mode {
        OutputMode::Human => Some(spinner::create("Creating rule...")),
        OutputMode::Json => None,
    };

    let client = reqwest::Client::new();
    let resp = client.post(&url).json(&body).send().await;
    let created: Value = match resp {
        Ok(resp) => match check_response(resp).await {
            Ok(resp) => resp.json().await?,
            Err(e) => return fail(sp, e),
        },
        Err(e) => return fail(sp, e.into()),
    };

    if let Some(sp) = sp {
        spinner::finish_ok(&sp, "Rule created");
    }

    match mode {
        OutputMode::Json => print_json(&created)?,
        OutputMode::Human => {
            theme::print_kv("ID", created["id"].as_str().unwrap_or("-"));
        }
    }

    Ok(())
}

async fn update(base: &str, args: UpdateArgs, mode: OutputMode) -> Result<()> {
    let body = parse_json_data(&args.data)?;
    let url = format!("{base}/v1/rules/{}", args.id);

    let sp = match mode {
        OutputMode::Human => Some(spinner::create("Updating rule...")),
        OutputMode::Json => None,
    };

    let client = reqwest::Client::new();
    let resp = client.put(&url).json(&body).send().await;
    let updated: Value = match resp {
        Ok(resp) => match check_response(resp).await {
            Ok(resp) => resp.json().await?,
            Err(e) => return fail(sp, e),
        },
        Err(e) => return fail(sp, e.into()),
    };

    if let Some(sp) = sp {
        spinner::finish_ok(&sp, &format!("Rule {} updated", args.id));
    }

    if mode == OutputMode::Json {
        print_json(&updated)?;
    }

    Ok(())
}

async fn delete(base: &str, args: DeleteArgs, mode: OutputMode) -> Result<()> {
    if mode == OutputMode::Human && !args.yes {
        let msg = format!("Delete rule '{}'?", args.id);
        if !confirm::confirm_action(&msg) {
            theme::print_dim("Cancelled.");
            return Ok(());
        }
    }

    let url = format!("{base}/v1/rules/{}", args.id);

    let sp = match mode {
        OutputMode::Human => Some(spinner::create("Deleting rule...")),
        OutputMode::Json => None,
    };

    let client = reqwest::Client::new();
    check_response(client.delete(&url).send().await?).await?;

    if let Some(sp) = sp {
        spinner::finish_ok(&sp, &format!("Rule '{}' deleted", args.id));
    }

    if mode == OutputMode::Json {
        print_json(&serde_json::json!({"deleted": true, "id": args.id}))?;
    }

    Ok(())
}

fn display(v: &Value) -> String {
    match v {
        Value::String(s) if s.is_empty() => "-".into(),
        Value::String(s) => s.clone(),
        Value::Null => "-".into(),
        other => other.to_string(),
    }
}

fn fail(sp: Option<indicatif::ProgressBar>, err: anyhow::Error) -> Result<()> {
    if let Some(sp) = sp {
        spinner::finish_err(&sp, &err.to_string());
    }
    Err(err)
}
