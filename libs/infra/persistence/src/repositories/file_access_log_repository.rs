// [libs/infra/persistence/src/repositories/file_access_log_repository.rs]
use crate::errors::PersistenceError;
use crate::LedgerClient;
use libsql::params;
use skyclaim_claim_models::{ClaimFileId, FileAccessAction, FileAccessLog};
use tracing::instrument;

pub struct FileAccessLogRepository {
    client: LedgerClient,
}

impl FileAccessLogRepository {
    pub fn new(client: LedgerClient) -> Self {
        Self { client }
    }

    /// Registra un acceso a un archivo, exitoso o fallido. Se llama
    /// incondicionalmente antes de entregar contenido al cliente,
    /// incluyendo el intento fallido cuando la verificación de
    /// integridad no pasa.
    #[instrument(skip(self, log))]
    pub async fn record(&self, log: &FileAccessLog) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "INSERT INTO file_access_logs (id, claim_file_id, actor_id, action, client_ip, user_agent, occurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                log.id.0.to_string(),
                log.claim_file_id.0.to_string(),
                log.actor_id.0.to_string(),
                action_to_str(log.action),
                log.client_ip.clone(),
                log.user_agent.clone(),
                log.occurred_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn count_for_file(&self, claim_file_id: ClaimFileId) -> Result<u64, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM file_access_logs WHERE claim_file_id = ?1",
                params![claim_file_id.0.to_string()],
            )
            .await?;
        let row = rows.next().await?.ok_or(PersistenceError::FileNotFound)?;
        Ok(row.get::<i64>(0)? as u64)
    }
}

fn action_to_str(action: FileAccessAction) -> &'static str {
    match action {
        FileAccessAction::Upload => "upload",
        FileAccessAction::Download => "download",
        FileAccessAction::Delete => "delete",
        FileAccessAction::ViewMetadata => "view_metadata",
        FileAccessAction::Reject => "reject",
        FileAccessAction::Approve => "approve",
    }
}
