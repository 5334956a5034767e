// [libs/infra/persistence/src/client.rs]
/*!
 * Cliente de conexión libSQL. Distingue URLs remotas (`libsql://`,
 * `https://`) de locales/en-memoria y aplica el esquema una sola vez al
 * conectar. En modo memoria, ancla una conexión viva para que las tablas
 * sobrevivan entre llamadas (SQLite purga la base en memoria cuando la
 * última conexión se cierra).
 */

use crate::errors::PersistenceError;
use crate::schema::apply_full_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct LedgerClient {
    driver: Arc<Database>,
    _memory_anchor: Option<Arc<Connection>>,
}

impl LedgerClient {
    #[instrument(skip(database_access_token))]
    pub async fn connect(
        database_connection_url: &str,
        database_access_token: Option<String>,
    ) -> Result<Self, PersistenceError> {
        if database_connection_url.is_empty() {
            return Err(PersistenceError::Configuration("DATABASE_URL is empty".into()));
        }

        info!(url = %database_connection_url, "connecting to ledger");

        let is_remote = database_connection_url.starts_with("libsql://")
            || database_connection_url.starts_with("https://");
        let is_memory = database_connection_url.contains(":memory:")
            || database_connection_url.contains("mode=memory");

        let database_driver = if is_remote {
            let token = database_access_token.ok_or_else(|| {
                PersistenceError::Configuration("remote connection requires an access token".into())
            })?;
            Builder::new_remote(database_connection_url.to_string(), token)
                .build()
                .await
        } else {
            Builder::new_local(database_connection_url).build().await
        }
        .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        let driver = Arc::new(database_driver);
        let mut anchor = None;

        if is_memory {
            let anchor_conn = driver
                .connect()
                .map_err(|e| PersistenceError::Connection(e.to_string()))?;
            apply_full_schema(&anchor_conn)
                .await
                .map_err(|e| PersistenceError::Connection(e.to_string()))?;
            anchor = Some(Arc::new(anchor_conn));
            info!("in-memory ledger anchored");
        } else {
            let bootstrap_conn = driver
                .connect()
                .map_err(|e| PersistenceError::Connection(e.to_string()))?;
            apply_full_schema(&bootstrap_conn)
                .await
                .map_err(|e| PersistenceError::Connection(e.to_string()))?;
        }

        Ok(Self {
            driver,
            _memory_anchor: anchor,
        })
    }

    pub fn get_connection(&self) -> Result<Connection, PersistenceError> {
        self.driver.connect().map_err(|e| {
            error!(error = %e, "connection allocation failed");
            PersistenceError::Connection(e.to_string())
        })
    }
}
