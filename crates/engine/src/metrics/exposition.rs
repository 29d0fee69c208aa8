use std::fmt::Write;

use super::engine_metrics::EngineMetrics;
use crate::trigger::SkipReason;

pub fn render_prometheus(m: &EngineMetrics) -> String {
    let mut out = String::with_capacity(1024);

    write_counter(&mut out, "hermes_engine_ticks_total", m.ticks_val());
    write_counter(&mut out, "hermes_engine_rules_evaluated_total", m.rules_evaluated_val());
    write_counter(&mut out, "hermes_engine_rules_fired_total", m.rules_fired_val());
    write_counter(&mut out, "hermes_engine_manual_triggers_total", m.manual_triggers_val());
    write_counter(&mut out, "hermes_engine_missing_metrics_total", m.missing_metrics_val());
    write_counter(&mut out, "hermes_engine_dispatch_ok_total", m.dispatch_ok_val());
    write_counter(&mut out, "hermes_engine_dispatch_failed_total", m.dispatch_failed_val());
    write_counter(&mut out, "hermes_engine_dispatch_dropped_total", m.dispatch_dropped_val());

    let _ = writeln!(out, "# TYPE hermes_engine_rules_skipped_total counter");
    for (label, reason) in [
        ("inactive", SkipReason::Inactive),
        ("cooldown", SkipReason::Cooldown),
        ("no_conditions", SkipReason::NoConditions),
        ("conditions_not_met", SkipReason::ConditionsNotMet),
    ] {
        let _ = writeln!(
            out,
            "hermes_engine_rules_skipped_total{{reason=\"{label}\"}} {}",
            m.skipped_val(reason)
        );
    }

    let (sum, count) = m.tick_latency_vals();
    write_summary(&mut out, "hermes_engine_tick_latency_us", sum, count);

    out
}

fn write_counter(out: &mut String, name: &str, val: u64) {
    let _ = writeln!(out, "# TYPE {name} counter");
    let _ = writeln!(out, "{name} {val}");
}

fn write_summary(out: &mut String, name: &str, sum: u64, count: u64) {
    let _ = writeln!(out, "# TYPE {name} summary");
    let _ = writeln!(out, "{name}_sum {sum}");
    let _ = writeln!(out, "{name}_count {count}");
}
