#[cfg(test)]
mod tests {
    use crate::cmd::Commands;
    use crate::Opts;
    use clap::Parser;

    fn parse(args: &[&str]) -> Opts {
        let mut full = vec!["hermes"];
        full.extend_from_slice(args);
        Opts::parse_from(full)
    }

    #[test]
    fn parse_version() {
        let opts = parse(&["version"]);
        assert!(matches!(opts.cmd, Commands::Version));
    }

    #[test]
    fn parse_json_flag() {
        let opts = parse(&["--json", "version"]);
        assert!(opts.json);
        assert_eq!(opts.output_mode(), crate::output::OutputMode::Json);
    }

    #[test]
    fn parse_human_flag_default() {
        let opts = parse(&["version"]);
        assert!(!opts.json);
        assert_eq!(opts.output_mode(), crate::output::OutputMode::Human);
    }

    #[test]
    fn parse_server_flag() {
        let opts = parse(&["--server", "http://localhost:9090", "health"]);
        assert_eq!(opts.server.as_deref(), Some("http://localhost:9090"));
        assert!(matches!(opts.cmd, Commands::Health(_)));
    }

    #[test]
    fn parse_global_flag_after_subcommand() {
        let opts = parse(&["rules", "list", "--json"]);
        assert!(opts.json);
    }

    #[test]
    fn parse_rules_list_active() {
        let opts = parse(&["rules", "list", "--active"]);
        assert!(matches!(opts.cmd, Commands::Rules(_)));
    }

    #[test]
    fn parse_rules_create() {
        let opts = parse(&["rules", "create", "--data", "{\"name\":\"x\"}"]);
        assert!(matches!(opts.cmd, Commands::Rules(_)));
    }

    #[test]
    fn parse_rules_delete_yes() {
        let opts = parse(&["rules", "delete", "r1", "--yes"]);
        assert!(matches!(opts.cmd, Commands::Rules(_)));
    }

    #[test]
    fn parse_rules_update_requires_data() {
        let result = Opts::try_parse_from(["hermes", "rules", "update", "r1"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_trigger() {
        let opts = parse(&["trigger", "r1", "--yes"]);
        assert!(matches!(opts.cmd, Commands::Trigger(_)));
    }

    #[test]
    fn parse_push() {
        let opts = parse(&["push", "--data", "{\"risk_score\": 82}"]);
        assert!(matches!(opts.cmd, Commands::Push(_)));
    }

    #[test]
    fn parse_executions_limit() {
        let opts = parse(&["executions", "--limit", "5"]);
        assert!(matches!(opts.cmd, Commands::Executions(_)));
    }

    #[test]
    fn parse_check_multiple_snapshots() {
        let opts = parse(&[
            "check", "--rules", "rules.yml", "--snapshot", "a.json", "b.json", "--every", "5",
        ]);
        assert!(matches!(opts.cmd, Commands::Check(_)));
    }

    #[test]
    fn parse_check_requires_snapshot() {
        let result = Opts::try_parse_from(["hermes", "check", "--rules", "rules.yml"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_unknown_subcommand_fails() {
        let result = Opts::try_parse_from(["hermes", "nonexistent"]);
        assert!(result.is_err());
    }
}
