use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub server: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        return dir.join("hermes").join("cli.yml");
    }
    PathBuf::from("/etc/hermes/cli.yml")
}

pub fn load_config(config_path: Option<&str>) -> Result<CliConfig> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("loading config from {}", path.display()))?;
    serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// Server URL from the flag (or `HERMES_SERVER`), then the CLI config file,
/// then the local default. An explicit `--config` that cannot be read is an
/// error; a missing default config is not.
pub fn resolve_server(server_flag: Option<&str>, config_path: Option<&str>) -> Result<String> {
    if let Some(s) = server_flag {
        return Ok(s.trim_end_matches('/').to_string());
    }
    let cfg = match config_path {
        Some(_) => load_config(config_path)?,
        None => load_config(None).unwrap_or_default(),
    };
    Ok(cfg
        .server
        .map(|s| s.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string()))
}

/// Inline JSON, or the path of a JSON/YAML file.
pub fn parse_json_data(data: &str) -> Result<serde_json::Value> {
    if std::path::Path::new(data).exists() {
        let content = std::fs::read_to_string(data)?;
        Ok(serde_yaml::from_str(&content).with_context(|| format!("parsing {data}"))?)
    } else {
        Ok(serde_json::from_str(data).context("parsing inline JSON")?)
    }
}

/// Fails with the server's `{"error": ...}` message on a non-2xx status.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or_else(|| status.to_string());
    anyhow::bail!("HTTP {}: {message}", status.as_u16())
}
