// [libs/domain/claim-models/src/document.rs]
use crate::{ClaimFileId, ClaimId, CustomerId, FileAccessLogId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Categoría declarada del documento, usada por `skyclaim-document-pipeline`
/// para escoger la tabla de reglas de validación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    BoardingPass,
    IdDocument,
    Receipt,
    BankStatement,
    FlightTicket,
    DelayCertificate,
    CancellationNotice,
    Other,
}

/// Resultado del pipeline de validación/escaneo de un archivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pending,
    Passed,
    RejectedFormat,
    RejectedMalware,
    RejectedSize,
    Failed,
}

/// Etiqueta del esquema de cifrado aplicado al contenido almacenado, junto
/// con los parámetros no secretos necesarios para descifrar (nonce de
/// archivo, versión de formato). La llave en sí nunca se serializa aquí.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionScheme {
    pub algorithm: String,
    pub stream_format_version: u8,
}

impl Default for EncryptionScheme {
    fn default() -> Self {
        Self { algorithm: "aes-256-gcm-chunked".to_string(), stream_format_version: 1 }
    }
}

/// Metadatos de un archivo adjunto a un reclamo. El contenido en sí nunca
/// vive aquí: reside cifrado en el almacén de objetos (WebDAV), direccionado
/// por `storage_key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimFile {
    pub id: ClaimFileId,
    pub claim_id: ClaimId,
    pub uploaded_by: CustomerId,
    pub document_type: DocumentType,
    pub original_filename: String,
    pub declared_mime_type: String,
    pub sniffed_mime_type: Option<String>,
    pub size_bytes: u64,
    /// Longitud en bytes del objeto cifrado realmente escrito en el
    /// almacén remoto (incluye cabecera de streaming y tags de
    /// autenticación por fragmento); distinto de `size_bytes`, que es el
    /// tamaño en texto plano.
    pub ciphertext_size_bytes: u64,
    /// Clave del objeto en el almacén WebDAV; opaca fuera de la capa de
    /// almacenamiento.
    pub storage_key: String,
    /// Llave de archivo de un solo uso, envuelta (cifrada) bajo la llave
    /// de proceso y serializada como JSON de `EncryptedField`. `None`
    /// para archivos que nunca pasaron por el cifrado en streaming.
    pub wrapped_file_key: Option<String>,
    pub encryption_scheme: EncryptionScheme,
    /// Digesto SHA-256 del contenido en texto plano, calculado antes de
    /// cifrar, para la verificación de integridad post-escritura
    pub plaintext_sha256: String,
    pub validation_status: ValidationStatus,
    pub rejection_reason: Option<String>,
    pub reviewer_id: Option<CustomerId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Acción registrada en el rastro de acceso a un archivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAccessAction {
    Upload,
    Download,
    Delete,
    ViewMetadata,
    Reject,
    Approve,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAccessLog {
    pub id: FileAccessLogId,
    pub claim_file_id: ClaimFileId,
    pub actor_id: CustomerId,
    pub action: FileAccessAction,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub occurred_at: DateTime<Utc>,
}
