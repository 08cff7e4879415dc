pub mod server_config;

pub use server_config::{load_config, parse_config, Config, ConfigError, PersistenceConfig, ServerConfig};
