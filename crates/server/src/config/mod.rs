mod loader;
mod schema;

pub use loader::{
    load, load_from_file, load_from_str, load_rules_file, parse_rules, ConfigError, CONFIG_ENV,
    LISTEN_ADDR_ENV,
};
pub use schema::{DispatchConfig, EngineConfig, LogConfig, RetrySettings, ServerConfig, WebhookRoute};
