use std::path::Path;

use tracing::{info, warn};

use crate::address::{cidr, AddressService};
use crate::error::AddressError;
use crate::set_up::config_hash::ConfigHashFile;
use crate::set_up::SetupError;
use crate::store::AddressStore;

/// Registers each configured block, skipping blocks that overlap existing addresses.
/// Returns the number of addresses added.
pub async fn seed_blocks<S: AddressStore + ?Sized>(
    service: &AddressService<S>,
    blocks: &[String],
) -> Result<u64, AddressError> {
    let mut added = 0;
    for block in blocks {
        let (network_address, mask_bits) = cidr::parse_block(block)?;
        match service.add_block(&network_address, mask_bits).await {
            Ok(count) => {
                info!(%block, count, "seeded address block");
                added += count;
            }
            Err(AddressError::Overlap(reason)) => warn!(%block, %reason, "skipping seed block"),
            Err(e) => return Err(e),
        }
    }
    Ok(added)
}

/// Seeds `blocks` only when the config file changed since the last successful seeding.
pub async fn seed_if_config_changed<S: AddressStore + ?Sized>(
    service: &AddressService<S>,
    blocks: &[String],
    config_path: impl AsRef<Path>,
    hashes: &ConfigHashFile,
) -> Result<(), SetupError> {
    let Some(new_hash) = hashes.changed_hash(config_path)? else {
        info!("server configuration unchanged - skipping block seeding");
        return Ok(());
    };
    info!(blocks = blocks.len(), "server configuration changed - seeding address blocks");
    let added = seed_blocks(service, blocks).await?;
    hashes.store(&new_hash)?;
    info!(added, "address blocks seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use super::*;
    use crate::address::BatchSize;
    use crate::store::MemoryStore;

    fn service() -> AddressService<MemoryStore> {
        AddressService::new(Arc::new(MemoryStore::new()), BatchSize::new(64).unwrap())
    }

    fn blocks(list: &[&str]) -> Vec<String> {
        list.iter().map(|b| b.to_string()).collect()
    }

    #[tokio::test]
    async fn overlapping_seed_blocks_are_skipped() {
        let service = service();
        let added = seed_blocks(&service, &blocks(&["10.0.0.0/30", "10.0.0.0/24", "10.0.1.0/31"]))
            .await
            .unwrap();

        assert_eq!(added, 6);
        assert_eq!(service.count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn malformed_seed_block_aborts() {
        let service = service();
        let err = seed_blocks(&service, &blocks(&["10.0.0.0/30", "10.0.0.0"])).await.unwrap_err();

        assert!(matches!(err, AddressError::InvalidCidr(_)));
        assert_eq!(service.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn seeding_runs_once_per_config_version() {
        let dir = std::env::temp_dir().join(format!("ipam-seed-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let config = dir.join("server-config.json");
        fs::write(&config, "v1").unwrap();
        let hashes = ConfigHashFile::new(dir.join(".last_config_hash"));
        let service = service();
        let seeds = blocks(&["192.168.0.0/30"]);

        seed_if_config_changed(&service, &seeds, &config, &hashes).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 4);

        // unchanged config: nothing seeded even after the store was wiped
        service.delete_all().await.unwrap();
        seed_if_config_changed(&service, &seeds, &config, &hashes).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 0);

        fs::write(&config, "v2").unwrap();
        seed_if_config_changed(&service, &seeds, &config, &hashes).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 4);
        fs::remove_dir_all(dir).unwrap();
    }
}
