use std::env;
use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio_postgres::NoTls;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ipam_server::logger::Logger;
use ipam_server::server::{create_router, with_request_log};
use ipam_server::server_config::load_config;
use ipam_server::set_up::{create_db, seed_if_config_changed, ConfigHashFile};
use ipam_server::{AddressService, PostgresStore};

const DEFAULT_CONFIG_PATH: &str = "app/server-config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = env::var("IPAM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&config_path)?;
    info!(%config_path, batch_size = %config.persistence.batch_size, "configuration loaded");

    let db_url = env::var("POSTGRES_URL").context("Failed to find POSTGRES_URL")?;
    let (client, connection) = tokio_postgres::connect(&db_url, NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("Connection error: {}", e);
        }
    });
    info!("connected to database");

    create_db(&client).await.context("Error creating db")?;

    let store = Arc::new(PostgresStore::new(client, config.server.query_timeout()));
    let service = AddressService::new(store, config.persistence.batch_size);

    seed_if_config_changed(&service, &config.initial_blocks, &config_path, &ConfigHashFile::default()).await?;

    let logger = Logger::new(&config.server.log_file);
    let app = with_request_log(create_router(service), logger);

    let listener = TcpListener::bind(&config.server.listen_address).await?;
    info!("address API listening on {}", config.server.listen_address);
    axum::serve(listener, app).await?;

    Ok(())
}
