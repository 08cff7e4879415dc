//! Start-up tasks: schema creation and config-driven block seeding.

use thiserror::Error;

use crate::error::AddressError;
use crate::server_config::ConfigError;

pub mod config_hash;
pub mod create_db_tables;
pub mod seed_blocks;

pub use config_hash::ConfigHashFile;
pub use create_db_tables::create_db;
pub use seed_blocks::{seed_blocks, seed_if_config_changed};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("seeding failed: {0}")]
    Seed(#[from] AddressError),
}
