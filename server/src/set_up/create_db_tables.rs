use tokio_postgres::Error;
use tracing::info;

pub async fn create_db(client: &tokio_postgres::Client) -> Result<(), Error> {
    create_ip_address_table(client).await?;
    Ok(())
}

async fn create_ip_address_table(client: &tokio_postgres::Client) -> Result<(), Error> {
    let table_exists_query = "
        SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_name = 'ip_addresses'
        );
    ";
    let row = client.query_one(table_exists_query, &[]).await?;
    let table_exists: bool = row.get(0);

    if table_exists {
        info!("table ip_addresses already exists - skipping creation");
    } else {
        // BIGINT because Postgres has no unsigned 32-bit type
        let create_ip_addresses_table_query = "
            CREATE TABLE IF NOT EXISTS ip_addresses (
                address BIGINT PRIMARY KEY CHECK (address BETWEEN 0 AND 4294967295),
                acquired BOOLEAN NOT NULL DEFAULT FALSE
            )
        ";
        client.execute(create_ip_addresses_table_query, &[]).await?;
        info!("table ip_addresses created successfully");
    }
    Ok(())
}
