//! Connection setup.

use crate::config::{DbConfig, Environment};
use crate::error::{JoblyError, JoblyResult};
use tokio_postgres::{Client, NoTls};

/// Connect to the database configured for the current [`Environment`].
///
/// The connection driver runs on a spawned tokio task; driver errors are
/// logged on the `jobly::db` target and surface as failed queries.
pub async fn connect(config: &DbConfig) -> JoblyResult<Client> {
    connect_url(config.database_url(Environment::from_env())).await
}

/// Connect to an explicit URL.
pub async fn connect_url(url: &str) -> JoblyResult<Client> {
    let (client, connection) = tokio_postgres::connect(url, NoTls)
        .await
        .map_err(|e| JoblyError::Connection(e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(target: "jobly::db", error = %e, "database connection error");
        }
    });

    tracing::info!(target: "jobly::db", "connected to database");
    Ok(client)
}
