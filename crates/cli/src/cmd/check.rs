use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use serde_json::json;
use std::path::{Path, PathBuf};

use hermes_engine::trigger::test_harness::{run_harness, HarnessResult, Tick};
use hermes_engine::trigger::{
    evaluate_rule, firing_order, Evaluation, MetricSnapshot, Rule, RuleSeed,
};

use crate::output::{build_table, print_json, print_success, theme, OutputMode};

#[derive(Args)]
pub struct CheckArgs {
    #[arg(long, help = "Rules file (YAML or JSON list)")]
    rules: PathBuf,
    #[arg(
        long,
        required = true,
        num_args = 1..,
        help = "Snapshot file(s); several are replayed in order"
    )]
    snapshot: Vec<PathBuf>,
    #[arg(long, help = "Previous snapshot, the changed_by baseline")]
    previous: Option<PathBuf>,
    #[arg(long, default_value_t = 1, help = "Minutes between replayed snapshots")]
    every: u32,
}

/// Evaluates rules against snapshot files locally, without a server.
pub fn execute(args: CheckArgs, mode: OutputMode) -> Result<()> {
    let rules = load_rules(&args.rules)?;
    let previous = args.previous.as_deref().map(load_snapshot).transpose()?;
    let now = Utc::now();

    if let [path] = args.snapshot.as_slice() {
        let snapshot = load_snapshot(path)?;
        let results = check_once(rules, &snapshot, previous.as_ref(), now);
        return print_evaluations(&results, mode);
    }

    let snapshots = args
        .snapshot
        .iter()
        .map(|path| load_snapshot(path))
        .collect::<Result<Vec<_>>>()?;
    print_replay(&replay(rules, snapshots, previous, args.every, now), mode)
}

/// Replays `snapshots` one `every` minutes apart starting at `now`, with
/// `previous` as the `changed_by` baseline of the first one.
pub(crate) fn replay(
    rules: Vec<Rule>,
    snapshots: Vec<MetricSnapshot>,
    previous: Option<MetricSnapshot>,
    every: u32,
    now: DateTime<Utc>,
) -> HarnessResult {
    let ticks = snapshots
        .into_iter()
        .enumerate()
        .map(|(i, snapshot)| Tick {
            now: now + Duration::minutes(i64::from(every) * i as i64),
            snapshot,
        })
        .collect();
    run_harness(rules, previous, ticks)
}

pub(crate) fn load_rules(path: &Path) -> Result<Vec<Rule>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading rules from {}", path.display()))?;
    let seeds: Vec<RuleSeed> =
        serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    seeds
        .into_iter()
        .enumerate()
        .map(|(i, seed)| seed.into_rule().with_context(|| format!("rule #{i}")))
        .collect()
}

pub(crate) fn load_snapshot(path: &Path) -> Result<MetricSnapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot from {}", path.display()))?;
    serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// Every rule's decision for one snapshot, in firing order.
pub(crate) fn check_once(
    mut rules: Vec<Rule>,
    snapshot: &MetricSnapshot,
    previous: Option<&MetricSnapshot>,
    now: DateTime<Utc>,
) -> Vec<(Rule, Evaluation)> {
    rules.sort_by(firing_order);
    rules
        .into_iter()
        .map(|rule| {
            let evaluation = evaluate_rule(&rule, snapshot, now, previous);
            (rule, evaluation)
        })
        .collect()
}

fn print_evaluations(results: &[(Rule, Evaluation)], mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Json => {
            let out: Vec<_> = results
                .iter()
                .map(|(rule, evaluation)| {
                    json!({ "rule_id": rule.id, "name": rule.name, "evaluation": evaluation })
                })
                .collect();
            print_json(&out)?;
        }
        OutputMode::Human => {
            if results.is_empty() {
                print_success("No rules to check");
                return Ok(());
            }
            theme::print_header("Rule Check");
            let mut table = build_table(&["ID", "Name", "Priority", "Decision", "Detail"]);
            for (rule, evaluation) in results {
                let (decision, detail) = match evaluation {
                    Evaluation::Fired(firing) => (
                        theme::status("fired", true),
                        firing
                            .outcomes
                            .iter()
                            .map(|o| {
                                let value = o.value.map_or("-".to_string(), |v| v.to_string());
                                format!("{}={} {}", o.metric, value, if o.satisfied { "✓" } else { "✗" })
                            })
                            .collect::<Vec<_>>()
                            .join(", "),
                    ),
                    Evaluation::Skipped { reason } => {
                        (theme::status("skipped", false), reason.to_string())
                    }
                };
                table.add_row(vec![
                    rule.id.clone(),
                    rule.name.clone(),
                    rule.priority.to_string(),
                    decision,
                    detail,
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

fn print_replay(result: &HarnessResult, mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Json => {
            let firings: Vec<_> = result
                .firings
                .iter()
                .map(|f| json!({ "tick": f.tick, "rule_id": f.rule_id, "at": f.at }))
                .collect();
            print_json(&json!({ "firings": firings, "rules": result.rules }))?;
        }
        OutputMode::Human => {
            theme::print_header("Replay");
            if result.firings.is_empty() {
                print_success("No rules fired");
            } else {
                let mut table = build_table(&["Tick", "Rule", "At"]);
                for f in &result.firings {
                    table.add_row(vec![f.tick.to_string(), f.rule_id.clone(), f.at.to_rfc3339()]);
                }
                println!("{table}");
            }
            theme::print_section("Totals");
            for rule in &result.rules {
                theme::print_kv(&rule.id, &result.fired_count(&rule.id).to_string());
            }
            println!();
        }
    }
    Ok(())
}
