use std::time::Duration;

use thiserror::Error;

/// Failures raised by an address store backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),
    /// A bulk insert hit an address that is already stored.
    #[error("address {0} already stored")]
    DuplicateAddress(u32),
    #[error("corrupt address row: {0}")]
    CorruptRow(String),
}

/// Errors surfaced by the address engine and the service operations on top of it.
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("{0}")]
    InvalidAddress(String),
    #[error("{0}")]
    InvalidCidr(String),
    #[error("{0}")]
    InvalidPage(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Overlap(String),
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T, E = AddressError> = std::result::Result<T, E>;
