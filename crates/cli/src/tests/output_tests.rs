#[cfg(test)]
mod tests {
    use crate::cmd::rules::conditions_summary;
    use crate::output::{build_table, print_json, theme, OutputMode};

    #[test]
    fn output_mode_json() {
        let mode = OutputMode::Json;
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn print_json_valid() {
        let val = serde_json::json!({"key": "value"});
        assert!(print_json(&val).is_ok());
    }

    #[test]
    fn build_table_with_rows() {
        let mut table = build_table(&["Name", "Value"]);
        table.add_row(vec!["foo", "bar"]);
        let rendered = table.to_string();
        assert!(rendered.contains("Name"));
        assert!(rendered.contains("foo"));
        assert!(rendered.contains("bar"));
    }

    #[test]
    fn yes_no_labels() {
        assert!(theme::yes_no(true).contains("yes"));
        assert!(theme::yes_no(false).contains("no"));
    }

    #[test]
    fn summary_joins_with_logic_operator() {
        let rule = serde_json::json!({
            "logic_operator": "OR",
            "conditions": [
                {"metric": "consistency_score", "operator": "<", "threshold": 50.0},
                {"metric": "risk_score", "operator": ">", "threshold": "70"}
            ]
        });
        assert_eq!(
            conditions_summary(&rule),
            "consistency_score < 50.0 OR risk_score > 70"
        );
    }

    #[test]
    fn summary_without_conditions() {
        assert_eq!(conditions_summary(&serde_json::json!({})), "-");
    }
}
