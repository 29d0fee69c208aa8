use std::path::Path;

use super::schema::ServerConfig;
use hermes_engine::trigger::{Rule, RuleSeed, ValidationError};

pub const CONFIG_ENV: &str = "HERMES_CONFIG";
pub const LISTEN_ADDR_ENV: &str = "HERMES_LISTEN_ADDR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("validation: {0}")]
    Validation(String),
    #[error("rule #{index}: {source}")]
    Rule {
        index: usize,
        #[source]
        source: ValidationError,
    },
}

pub fn load_from_file(path: &Path) -> Result<ServerConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents)
}

pub fn load_from_str(yaml: &str) -> Result<ServerConfig, ConfigError> {
    let cfg: ServerConfig = serde_yaml::from_str(yaml)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Loads the file named by `HERMES_CONFIG` (or `default_path`), falling
/// back to defaults when it does not exist, then applies
/// `HERMES_LISTEN_ADDR`.
pub fn load(default_path: &Path) -> Result<ServerConfig, ConfigError> {
    let path = std::env::var_os(CONFIG_ENV)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| default_path.to_path_buf());

    let mut cfg = if path.exists() {
        load_from_file(&path)?
    } else {
        tracing::info!(path = %path.display(), "config file not found, using defaults");
        ServerConfig::default()
    };

    if let Ok(addr) = std::env::var(LISTEN_ADDR_ENV) {
        cfg.listen_addr = addr
            .parse()
            .map_err(|_| ConfigError::Validation(format!("{LISTEN_ADDR_ENV} is not a socket address: {addr}")))?;
    }
    Ok(cfg)
}

fn validate(cfg: &ServerConfig) -> Result<(), ConfigError> {
    if cfg.engine.dispatch_queue_capacity == 0 {
        return Err(ConfigError::Validation(
            "engine.dispatch_queue_capacity must be > 0".into(),
        ));
    }
    if cfg.engine.dispatch_concurrency == 0 {
        return Err(ConfigError::Validation(
            "engine.dispatch_concurrency must be > 0".into(),
        ));
    }
    if cfg.engine.execution_log_capacity == 0 {
        return Err(ConfigError::Validation(
            "engine.execution_log_capacity must be > 0".into(),
        ));
    }
    if cfg.dispatch.retry.max_attempts == 0 {
        return Err(ConfigError::Validation(
            "dispatch.retry.max_attempts must be >= 1".into(),
        ));
    }
    if !cfg.dispatch.retry.backoff_factor.is_finite() || cfg.dispatch.retry.backoff_factor < 1.0 {
        return Err(ConfigError::Validation(
            "dispatch.retry.backoff_factor must be >= 1.0".into(),
        ));
    }
    for hook in &cfg.dispatch.webhooks {
        if hook.module.is_empty() {
            return Err(ConfigError::Validation("webhook module must not be empty".into()));
        }
        if !(hook.url.starts_with("http://") || hook.url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "webhook url for '{}' must be http(s)",
                hook.module
            )));
        }
    }
    Ok(())
}

/// Reads a YAML (or JSON) list of rule drafts and validates each one. Rules
/// without an id get a generated one.
pub fn load_rules_file(path: &Path) -> Result<Vec<Rule>, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse_rules(&contents)
}

pub fn parse_rules(yaml: &str) -> Result<Vec<Rule>, ConfigError> {
    let seeds: Vec<RuleSeed> = serde_yaml::from_str(yaml)?;
    seeds
        .into_iter()
        .enumerate()
        .map(|(index, seed)| {
            seed.into_rule()
                .map_err(|source| ConfigError::Rule { index, source })
        })
        .collect()
}
