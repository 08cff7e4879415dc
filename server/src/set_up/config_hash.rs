use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

pub const DEFAULT_HASH_FILE: &str = ".last_config_hash";

pub fn calculate_config_hash(file_path: impl AsRef<Path>) -> Result<String, io::Error> {
    let config_data = fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(config_data);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Remembers the hash of the last config file whose seed blocks were applied.
#[derive(Debug, Clone)]
pub struct ConfigHashFile {
    path: PathBuf,
}

impl ConfigHashFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn store(&self, hash: &str) -> Result<(), io::Error> {
        fs::write(&self.path, hash)
    }

    pub fn load_previous(&self) -> Result<Option<String>, io::Error> {
        match fs::read_to_string(&self.path) {
            Ok(hash) => Ok(Some(hash.trim().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns the new hash when `config_path` differs from the stored one.
    pub fn changed_hash(&self, config_path: impl AsRef<Path>) -> Result<Option<String>, io::Error> {
        let new_hash = calculate_config_hash(config_path)?;
        match self.load_previous()? {
            Some(previous) if previous == new_hash => Ok(None),
            _ => Ok(Some(new_hash)),
        }
    }
}

impl Default for ConfigHashFile {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_FILE)
    }
}
