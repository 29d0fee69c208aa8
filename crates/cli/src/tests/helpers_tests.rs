#[cfg(test)]
mod tests {
    use crate::cmd::helpers;

    #[test]
    fn default_config_path_not_empty() {
        let path = helpers::default_config_path();
        assert!(path.to_string_lossy().ends_with("cli.yml"));
    }

    #[test]
    fn load_config_missing_file() {
        let result = helpers::load_config(Some("/nonexistent/path.yml"));
        assert!(result.is_err());
    }

    #[test]
    fn resolve_server_prefers_flag() {
        let url = helpers::resolve_server(Some("http://h:1/"), Some("/nonexistent.yml")).unwrap();
        assert_eq!(url, "http://h:1");
    }

    #[test]
    fn resolve_server_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.yml");
        std::fs::write(&path, "server: http://hermes.local:8080\n").unwrap();

        let url = helpers::resolve_server(None, Some(path.to_str().unwrap())).unwrap();
        assert_eq!(url, "http://hermes.local:8080");
    }

    #[test]
    fn resolve_server_config_without_server_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.yml");
        std::fs::write(&path, "{}\n").unwrap();

        let url = helpers::resolve_server(None, Some(path.to_str().unwrap())).unwrap();
        assert_eq!(url, helpers::DEFAULT_SERVER);
    }

    #[test]
    fn resolve_server_explicit_missing_config_fails() {
        assert!(helpers::resolve_server(None, Some("/nonexistent/cli.yml")).is_err());
    }

    #[test]
    fn parse_json_data_inline() {
        let v = helpers::parse_json_data(r#"{"risk_score": 82}"#).unwrap();
        assert_eq!(v["risk_score"], 82);
    }

    #[test]
    fn parse_json_data_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rule.yml");
        std::fs::write(&path, "name: High risk\ncooldown_minutes: 60\n").unwrap();

        let v = helpers::parse_json_data(path.to_str().unwrap()).unwrap();
        assert_eq!(v["name"], "High risk");
        assert_eq!(v["cooldown_minutes"], 60);
    }

    #[test]
    fn parse_json_data_invalid() {
        assert!(helpers::parse_json_data("{not json").is_err());
    }
}
