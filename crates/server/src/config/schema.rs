use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use hermes_common::retry::RetryConfig;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub rules_file: Option<PathBuf>,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Re-tick the latest snapshot this often; 0 ticks only on push.
    #[serde(default)]
    pub tick_interval_secs: u64,
    #[serde(default = "default_queue_capacity")]
    pub dispatch_queue_capacity: usize,
    #[serde(default = "default_concurrency")]
    pub dispatch_concurrency: usize,
    #[serde(default = "default_log_capacity")]
    pub execution_log_capacity: usize,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DispatchConfig {
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub webhooks: Vec<WebhookRoute>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WebhookRoute {
    pub module: String,
    pub url: String,
    #[serde(default)]
    pub secret: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default)]
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            engine: EngineConfig::default(),
            dispatch: DispatchConfig::default(),
            rules_file: None,
            log: LogConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 0,
            dispatch_queue_capacity: default_queue_capacity(),
            dispatch_concurrency: default_concurrency(),
            execution_log_capacity: default_log_capacity(),
        }
    }
}

impl EngineConfig {
    pub fn tick_interval(&self) -> Option<Duration> {
        (self.tick_interval_secs > 0).then(|| Duration::from_secs(self.tick_interval_secs))
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(s: &RetrySettings) -> Self {
        RetryConfig {
            max_attempts: s.max_attempts,
            initial_delay: Duration::from_millis(s.initial_delay_ms),
            backoff_factor: s.backoff_factor,
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_concurrency() -> usize {
    4
}

fn default_log_capacity() -> usize {
    500
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_delay_ms() -> u64 {
    200
}

fn default_backoff_factor() -> f64 {
    2.0
}
