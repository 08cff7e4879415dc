use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tokio_postgres::{Client, Row};

use crate::address::{codec, AddressRecord};
use crate::error::StorageError;
use crate::store::{AddressStore, Page};

/// Address store backed by the `ip_addresses` table.
///
/// Addresses are kept as `BIGINT`, so every row read back is narrowed to `u32` before use.
pub struct PostgresStore {
    client: Client,
    query_timeout: Duration,
}

impl PostgresStore {
    pub fn new(client: Client, query_timeout: Duration) -> Self {
        Self { client, query_timeout }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, tokio_postgres::Error>>,
    ) -> Result<T, StorageError> {
        match timeout(self.query_timeout, call).await {
            Ok(result) => result.map_err(StorageError::from),
            Err(_) => Err(StorageError::Timeout(self.query_timeout)),
        }
    }
}

fn record_from_row(row: &Row) -> Result<AddressRecord, StorageError> {
    let address: i64 = row.try_get("address")?;
    let acquired: bool = row.try_get("acquired")?;
    let address = codec::narrow(address).map_err(|e| StorageError::CorruptRow(e.to_string()))?;
    Ok(AddressRecord { address, acquired })
}

fn records_from_rows(rows: Vec<Row>) -> Result<Vec<AddressRecord>, StorageError> {
    rows.iter().map(record_from_row).collect()
}

#[async_trait]
impl AddressStore for PostgresStore {
    async fn exists_in_range(&self, start: u32, end: u32) -> Result<bool, StorageError> {
        let query = "
            SELECT EXISTS (
                SELECT 1 FROM ip_addresses
                WHERE address BETWEEN $1 AND $2
            )";
        let row = self
            .bounded(self.client.query_one(query, &[&i64::from(start), &i64::from(end)]))
            .await?;
        Ok(row.try_get(0)?)
    }

    async fn get(&self, address: u32) -> Result<Option<AddressRecord>, StorageError> {
        let query = "SELECT address, acquired FROM ip_addresses WHERE address = $1";
        let row = self
            .bounded(self.client.query_opt(query, &[&i64::from(address)]))
            .await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn update(&self, record: AddressRecord) -> Result<Option<AddressRecord>, StorageError> {
        let query = "
            UPDATE ip_addresses SET acquired = $2
            WHERE address = $1
            RETURNING address, acquired";
        let row = self
            .bounded(self.client.query_opt(query, &[&i64::from(record.address), &record.acquired]))
            .await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn insert_batch(&self, records: &[AddressRecord]) -> Result<(), StorageError> {
        if records.is_empty() {
            return Ok(());
        }
        // one statement per batch: it commits or fails as a unit
        let query = "
            INSERT INTO ip_addresses (address, acquired)
            SELECT * FROM UNNEST($1::BIGINT[], $2::BOOL[])";
        let addresses: Vec<i64> = records.iter().map(|r| i64::from(r.address)).collect();
        let flags: Vec<bool> = records.iter().map(|r| r.acquired).collect();
        self.bounded(self.client.execute(query, &[&addresses, &flags])).await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<AddressRecord>, StorageError> {
        let query = "SELECT address, acquired FROM ip_addresses ORDER BY address";
        let rows = self.bounded(self.client.query(query, &[])).await?;
        records_from_rows(rows)
    }

    async fn list_page(&self, page: Page) -> Result<Vec<AddressRecord>, StorageError> {
        let (Some(offset), Ok(limit)) = (
            page.offset().and_then(|o| i64::try_from(o).ok()),
            i64::try_from(page.size),
        ) else {
            return Ok(Vec::new());
        };
        let query = "
            SELECT address, acquired FROM ip_addresses
            ORDER BY address
            LIMIT $1 OFFSET $2";
        let rows = self.bounded(self.client.query(query, &[&limit, &offset])).await?;
        records_from_rows(rows)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let row = self
            .bounded(self.client.query_one("SELECT COUNT(*) FROM ip_addresses", &[]))
            .await?;
        let count: i64 = row.try_get(0)?;
        u64::try_from(count).map_err(|_| StorageError::CorruptRow(format!("negative count {count}")))
    }

    async fn delete_all(&self) -> Result<(), StorageError> {
        self.bounded(self.client.execute("DELETE FROM ip_addresses", &[])).await?;
        Ok(())
    }
}
