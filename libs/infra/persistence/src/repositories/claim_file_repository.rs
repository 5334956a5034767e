// [libs/infra/persistence/src/repositories/claim_file_repository.rs]
use crate::errors::PersistenceError;
use crate::LedgerClient;
use chrono::Utc;
use libsql::{params, Row};
use skyclaim_claim_models::{
    ClaimFile, ClaimFileId, ClaimId, CustomerId, DocumentType, EncryptionScheme, ValidationStatus,
};
use std::str::FromStr;
use tracing::instrument;

pub struct ClaimFileRepository {
    client: LedgerClient,
}

impl ClaimFileRepository {
    pub fn new(client: LedgerClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, file))]
    pub async fn create(&self, file: &ClaimFile) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "INSERT INTO claim_files (
                id, claim_id, uploaded_by, document_type, original_filename, declared_mime_type,
                sniffed_mime_type, size_bytes, ciphertext_size_bytes, storage_key, wrapped_file_key,
                stream_format_version, plaintext_sha256, validation_status, rejection_reason, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                file.id.0.to_string(),
                file.claim_id.0.to_string(),
                file.uploaded_by.0.to_string(),
                document_type_to_str(file.document_type),
                file.original_filename.clone(),
                file.declared_mime_type.clone(),
                file.sniffed_mime_type.clone(),
                file.size_bytes as i64,
                file.ciphertext_size_bytes as i64,
                file.storage_key.clone(),
                file.wrapped_file_key.clone(),
                file.encryption_scheme.stream_format_version as i64,
                file.plaintext_sha256.clone(),
                validation_status_to_str(file.validation_status),
                file.rejection_reason.clone(),
                file.created_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: ClaimFileId) -> Result<ClaimFile, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(SELECT_COLUMNS_AND_FROM_BY_ID, params![id.0.to_string()])
            .await?;
        let row = rows.next().await?.ok_or(PersistenceError::FileNotFound)?;
        map_row(&row)
    }

    #[instrument(skip(self))]
    pub async fn list_for_claim(&self, claim_id: ClaimId) -> Result<Vec<ClaimFile>, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(SELECT_COLUMNS_AND_FROM_BY_CLAIM, params![claim_id.0.to_string()])
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn mark_validation_result(
        &self,
        id: ClaimFileId,
        sniffed_mime_type: Option<&str>,
        status: ValidationStatus,
        rejection_reason: Option<&str>,
    ) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        let affected = conn
            .execute(
                "UPDATE claim_files SET sniffed_mime_type = ?2, validation_status = ?3, rejection_reason = ?4 WHERE id = ?1",
                params![
                    id.0.to_string(),
                    sniffed_mime_type,
                    validation_status_to_str(status),
                    rejection_reason,
                ],
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::FileNotFound);
        }
        Ok(())
    }

    /// Registra la decisión de un revisor humano sobre el archivo
    /// (acciones `reject`/`approve` del rastro de acceso).
    #[instrument(skip(self))]
    pub async fn record_review_decision(
        &self,
        id: ClaimFileId,
        reviewer_id: CustomerId,
        status: ValidationStatus,
        rejection_reason: Option<&str>,
    ) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        let affected = conn
            .execute(
                "UPDATE claim_files SET validation_status = ?2, rejection_reason = ?3, reviewer_id = ?4, reviewed_at = ?5 WHERE id = ?1",
                params![
                    id.0.to_string(),
                    validation_status_to_str(status),
                    rejection_reason,
                    reviewer_id.0.to_string(),
                    Utc::now().to_rfc3339(),
                ],
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::FileNotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn soft_delete(&self, id: ClaimFileId) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        let affected = conn
            .execute(
                "UPDATE claim_files SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
                params![id.0.to_string(), Utc::now().to_rfc3339()],
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::FileNotFound);
        }
        Ok(())
    }

    /// Borra lógicamente todos los archivos de un reclamo descartado
    /// durante la purga de borradores vencidos.
    #[instrument(skip(self))]
    pub async fn soft_delete_for_claim(&self, claim_id: ClaimId) -> Result<u64, PersistenceError> {
        let conn = self.client.get_connection()?;
        let affected = conn
            .execute(
                "UPDATE claim_files SET deleted_at = ?2 WHERE claim_id = ?1 AND deleted_at IS NULL",
                params![claim_id.0.to_string(), Utc::now().to_rfc3339()],
            )
            .await?;
        Ok(affected)
    }
}

const SELECT_COLUMNS_AND_FROM_BY_ID: &str = "SELECT id, claim_id, uploaded_by, document_type, original_filename, declared_mime_type,
    sniffed_mime_type, size_bytes, ciphertext_size_bytes, storage_key, wrapped_file_key, stream_format_version,
    plaintext_sha256, validation_status, rejection_reason, reviewer_id, reviewed_at,
    deleted_at, created_at FROM claim_files WHERE id = ?1 AND deleted_at IS NULL";

const SELECT_COLUMNS_AND_FROM_BY_CLAIM: &str = "SELECT id, claim_id, uploaded_by, document_type, original_filename, declared_mime_type,
    sniffed_mime_type, size_bytes, ciphertext_size_bytes, storage_key, wrapped_file_key, stream_format_version,
    plaintext_sha256, validation_status, rejection_reason, reviewer_id, reviewed_at,
    deleted_at, created_at FROM claim_files WHERE claim_id = ?1 AND deleted_at IS NULL ORDER BY created_at ASC";

fn document_type_to_str(t: DocumentType) -> &'static str {
    match t {
        DocumentType::BoardingPass => "boarding_pass",
        DocumentType::IdDocument => "id_document",
        DocumentType::Receipt => "receipt",
        DocumentType::BankStatement => "bank_statement",
        DocumentType::FlightTicket => "flight_ticket",
        DocumentType::DelayCertificate => "delay_certificate",
        DocumentType::CancellationNotice => "cancellation_notice",
        DocumentType::Other => "other",
    }
}

fn document_type_from_str(s: &str) -> DocumentType {
    match s {
        "boarding_pass" => DocumentType::BoardingPass,
        "id_document" => DocumentType::IdDocument,
        "receipt" => DocumentType::Receipt,
        "bank_statement" => DocumentType::BankStatement,
        "flight_ticket" => DocumentType::FlightTicket,
        "delay_certificate" => DocumentType::DelayCertificate,
        "cancellation_notice" => DocumentType::CancellationNotice,
        _ => DocumentType::Other,
    }
}

fn validation_status_to_str(s: ValidationStatus) -> &'static str {
    match s {
        ValidationStatus::Pending => "pending",
        ValidationStatus::Passed => "passed",
        ValidationStatus::RejectedFormat => "rejected_format",
        ValidationStatus::RejectedMalware => "rejected_malware",
        ValidationStatus::RejectedSize => "rejected_size",
        ValidationStatus::Failed => "failed",
    }
}

fn validation_status_from_str(s: &str) -> ValidationStatus {
    match s {
        "passed" => ValidationStatus::Passed,
        "rejected_format" => ValidationStatus::RejectedFormat,
        "rejected_malware" => ValidationStatus::RejectedMalware,
        "rejected_size" => ValidationStatus::RejectedSize,
        "failed" => ValidationStatus::Failed,
        _ => ValidationStatus::Pending,
    }
}

fn map_row(row: &Row) -> Result<ClaimFile, PersistenceError> {
    Ok(ClaimFile {
        id: ClaimFileId::from_str(&row.get::<String>(0)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        claim_id: ClaimId::from_str(&row.get::<String>(1)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        uploaded_by: CustomerId::from_str(&row.get::<String>(2)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        document_type: document_type_from_str(&row.get::<String>(3)?),
        original_filename: row.get(4)?,
        declared_mime_type: row.get(5)?,
        sniffed_mime_type: row.get(6)?,
        size_bytes: row.get::<i64>(7)? as u64,
        ciphertext_size_bytes: row.get::<i64>(8)? as u64,
        storage_key: row.get(9)?,
        wrapped_file_key: row.get(10)?,
        encryption_scheme: EncryptionScheme {
            algorithm: "aes-256-gcm-chunked".to_string(),
            stream_format_version: row.get::<i64>(11)? as u8,
        },
        plaintext_sha256: row.get(12)?,
        validation_status: validation_status_from_str(&row.get::<String>(13)?),
        rejection_reason: row.get(14)?,
        reviewer_id: row
            .get::<Option<String>>(15)?
            .map(|s| CustomerId::from_str(&s))
            .transpose()
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        reviewed_at: row
            .get::<Option<String>>(16)?
            .map(|s| chrono::DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
            .transpose()
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        deleted_at: row
            .get::<Option<String>>(17)?
            .map(|s| chrono::DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
            .transpose()
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        created_at: chrono::DateTime::parse_from_rfc3339(&row.get::<String>(18)?)
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?
            .with_timezone(&Utc),
    })
}
