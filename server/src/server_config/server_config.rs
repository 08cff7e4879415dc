use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::time::Duration;
use thiserror::Error;

use crate::address::BatchSize;

const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// CIDR blocks ("a.b.c.d/n") registered at start-up when the config file changes.
    #[serde(default)]
    pub initial_blocks: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub listen_address: String,
    pub log_file: String,
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

impl ServerConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct PersistenceConfig {
    #[serde(default, deserialize_with = "batch_size_setting")]
    pub batch_size: BatchSize,
}

fn default_query_timeout_secs() -> u64 {
    DEFAULT_QUERY_TIMEOUT_SECS
}

// accepts 256, "256" or anything else (falls back to one)
fn batch_size_setting<'de, D>(deserializer: D) -> Result<BatchSize, D::Error>
where
    D: Deserializer<'de>,
{
    let setting = Value::deserialize(deserializer)?;
    Ok(match setting {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .and_then(BatchSize::new)
            .unwrap_or(BatchSize::ONE),
        Value::String(s) => BatchSize::from_setting(Some(&s)),
        _ => BatchSize::ONE,
    })
}

pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let file_content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_config(&file_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER: &str = r#""server": { "listen_address": "127.0.0.1:8080", "log_file": "requests.log" }"#;

    fn with_persistence(persistence: &str) -> Config {
        parse_config(&format!("{{ {SERVER}, \"persistence\": {persistence} }}")).unwrap()
    }

    #[test]
    fn full_config_parses() {
        let config = parse_config(
            r#"{
                "server": { "listen_address": "0.0.0.0:8080", "log_file": "ipam.log", "query_timeout_secs": 5 },
                "persistence": { "batch_size": 256 },
                "initial_blocks": ["10.0.0.0/24", "10.0.1.0/30"]
            }"#,
        )
        .unwrap();

        assert_eq!(config.server.listen_address, "0.0.0.0:8080");
        assert_eq!(config.server.query_timeout(), Duration::from_secs(5));
        assert_eq!(config.persistence.batch_size.get(), 256);
        assert_eq!(config.initial_blocks, vec!["10.0.0.0/24", "10.0.1.0/30"]);
    }

    #[test]
    fn optional_sections_default() {
        let config = parse_config(&format!("{{ {SERVER} }}")).unwrap();
        assert_eq!(config.persistence.batch_size, BatchSize::ONE);
        assert_eq!(config.server.query_timeout_secs, DEFAULT_QUERY_TIMEOUT_SECS);
        assert!(config.initial_blocks.is_empty());
    }

    #[test]
    fn batch_size_is_lenient() {
        assert_eq!(with_persistence(r#"{ "batch_size": "128" }"#).persistence.batch_size.get(), 128);
        for bad in ["0", "-3", "\"many\"", "null", "1.5", "true", "{}"] {
            let config = with_persistence(&format!("{{ \"batch_size\": {bad} }}"));
            assert_eq!(config.persistence.batch_size, BatchSize::ONE, "{bad}");
        }
        assert_eq!(with_persistence("{}").persistence.batch_size, BatchSize::ONE);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_config("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(parse_config("{ server: "), Err(ConfigError::Parse(_))));
    }
}
