// [libs/domain/document-pipeline/src/lib.rs]
/*!
 * Tubería de documentos adjuntos: autorización, sniff de contenido,
 * validación por tipo de documento, escaneo de malware, cifrado en
 * streaming con llave de archivo envuelta, subida WebDAV, verificación
 * de integridad post-escritura y registro en el rastro de acceso.
 * Ninguna etapa se salta: una subida que falla en cualquier punto no
 * deja un renglón de `ClaimFile` huérfano.
 */

pub mod errors;
pub mod rules;
pub mod scanner;
pub mod sniff;

pub use errors::DocumentError;
pub use scanner::{MalwareScanner, NullScanner, RemoteScanner, ScanVerdict};
pub use sniff::{declared_matches_sniffed, sniff_content_type, SniffedContentType};

use bytes::Bytes;
use chrono::Utc;
use rules::rule_for;
use scanner::check_pdf_structure;
use sha2::{Digest, Sha256};
use skyclaim_claim_models::{
    ClaimFile, ClaimFileId, ClaimId, CustomerId, DocumentType, EncryptionScheme, FileAccessAction,
    FileAccessLog, FileAccessLogId, Role, ValidationStatus,
};
use skyclaim_crypto_vault::{decrypt_field, encrypt_field, EncryptedField, EncryptionKey};
use skyclaim_object_store::WebDavClient;
use skyclaim_persistence::{ClaimFileRepository, ClaimRepository, FileAccessLogRepository};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Quien solicita la operación, ya autenticado; la tubería decide si
/// tiene permiso, no el llamador.
#[derive(Debug, Clone, Copy)]
pub struct RequestingActor {
    pub customer_id: CustomerId,
    pub role: Role,
}

impl RequestingActor {
    fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Superadmin)
    }
}

pub struct UploadRequest {
    pub claim_id: ClaimId,
    pub actor: RequestingActor,
    pub document_type: DocumentType,
    pub original_filename: String,
    pub declared_mime_type: String,
    pub content: Vec<u8>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

pub struct DocumentPipeline {
    claims: ClaimRepository,
    files: ClaimFileRepository,
    access_logs: FileAccessLogRepository,
    store: WebDavClient,
    scanner: Arc<dyn MalwareScanner>,
    file_key: Arc<EncryptionKey>,
    streaming_threshold_bytes: u64,
}

impl DocumentPipeline {
    pub fn new(
        claims: ClaimRepository,
        files: ClaimFileRepository,
        access_logs: FileAccessLogRepository,
        store: WebDavClient,
        scanner: Arc<dyn MalwareScanner>,
        file_key: Arc<EncryptionKey>,
        streaming_threshold_bytes: u64,
    ) -> Self {
        Self { claims, files, access_logs, store, scanner, file_key, streaming_threshold_bytes }
    }

    /// Ejecuta las etapas del pipeline de subida: autorización, sniff de
    /// contenido, validación por tipo, escaneo, cifrado, escritura remota
    /// y verificación de integridad. No crea ningún renglón de
    /// `ClaimFile` ni escribe al almacén de objetos hasta que todas las
    /// validaciones pasan.
    #[instrument(skip(self, request), fields(claim_id = %request.claim_id))]
    pub async fn upload(&self, request: UploadRequest) -> Result<ClaimFile, DocumentError> {
        self.authorize_for_claim(request.claim_id, &request.actor).await?;

        let sniffed = sniff_content_type(&request.content);
        if !declared_matches_sniffed(&request.declared_mime_type, sniffed) {
            return Err(DocumentError::MimeMismatch);
        }

        let rule = rule_for(request.document_type);
        if !rule.allows_size(request.content.len() as u64) {
            return Err(DocumentError::TooLarge);
        }
        if !rule.allows_content_type(sniffed.as_mime()) {
            return Err(DocumentError::UnsupportedContentType);
        }

        if sniffed == SniffedContentType::Pdf {
            check_pdf_structure(&request.content)?;
        }

        if rule.requires_scan {
            match self.scanner.scan(&request.content).await? {
                ScanVerdict::Threat => return Err(DocumentError::MalwareDetected),
                ScanVerdict::Clean => {}
            }
        }

        let plaintext_sha256 = hex::encode(Sha256::digest(&request.content));

        let per_file_key = EncryptionKey::from_bytes(rand_key_bytes());
        let use_oneshot = (request.content.len() as u64) < self.streaming_threshold_bytes;
        let ciphertext = if use_oneshot {
            skyclaim_crypto_vault::stream::encrypt_oneshot(&per_file_key, &request.content)?
        } else {
            let mut ciphertext = Vec::new();
            skyclaim_crypto_vault::stream::encrypt_stream(
                &per_file_key,
                &mut Cursor::new(&request.content),
                &mut ciphertext,
            )?;
            ciphertext
        };
        let encryption_scheme = if use_oneshot {
            EncryptionScheme { algorithm: "aes-256-gcm-oneshot".to_string(), stream_format_version: 1 }
        } else {
            EncryptionScheme::default()
        };
        let wrapped_file_key = wrap_file_key(&self.file_key, &per_file_key)?;

        let file_id = ClaimFileId::new();
        let storage_key = format!("claims/{}/{}.enc", request.claim_id, file_id);
        self.store.mkcol_idempotent(&format!("claims/{}", request.claim_id)).await?;
        self.store.put(&storage_key, Bytes::from(ciphertext.clone())).await?;

        if let Err(e) = self
            .verify_round_trip(&storage_key, ciphertext.len() as u64, &per_file_key, &plaintext_sha256, &encryption_scheme.algorithm)
            .await
        {
            warn!(claim_id = %request.claim_id, storage_key, "post-write integrity check failed, removing orphaned object");
            let _ = self.store.delete(&storage_key).await;
            return Err(e);
        }

        let file = ClaimFile {
            id: file_id,
            claim_id: request.claim_id,
            uploaded_by: request.actor.customer_id,
            document_type: request.document_type,
            original_filename: request.original_filename,
            declared_mime_type: request.declared_mime_type,
            sniffed_mime_type: Some(sniffed.as_mime().to_string()),
            size_bytes: request.content.len() as u64,
            ciphertext_size_bytes: ciphertext.len() as u64,
            storage_key,
            wrapped_file_key: Some(wrapped_file_key),
            encryption_scheme,
            plaintext_sha256,
            validation_status: ValidationStatus::Passed,
            rejection_reason: None,
            reviewer_id: None,
            reviewed_at: None,
            deleted_at: None,
            created_at: Utc::now(),
        };
        self.files.create(&file).await?;
        self.log_access(file.id, request.actor.customer_id, FileAccessAction::Upload, request.client_ip, request.user_agent)
            .await;

        info!(claim_id = %request.claim_id, file_id = %file.id, "document uploaded");
        Ok(file)
    }

    /// Descifra y entrega el contenido en texto plano de un archivo ya
    /// validado. Registra el acceso incondicionalmente, incluso cuando
    /// la verificación de integridad falla.
    #[instrument(skip(self))]
    pub async fn download(
        &self,
        claim_file_id: ClaimFileId,
        actor: RequestingActor,
        client_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Result<Vec<u8>, DocumentError> {
        let file = self.files.find_by_id(claim_file_id).await?;
        self.authorize_for_claim(file.claim_id, &actor).await?;

        let result = self.fetch_and_decrypt(&file).await;
        self.log_access(file.id, actor.customer_id, FileAccessAction::Download, client_ip, user_agent).await;
        result
    }

    /// Resolución administrativa de una revisión humana (aprobar o
    /// rechazar el documento). Sólo personal con `Role::Admin` o
    /// superior puede invocar esto.
    #[instrument(skip(self, reason))]
    pub async fn record_review_decision(
        &self,
        claim_file_id: ClaimFileId,
        reviewer: RequestingActor,
        approve: bool,
        reason: Option<&str>,
    ) -> Result<(), DocumentError> {
        if !reviewer.is_admin() {
            return Err(DocumentError::Forbidden);
        }
        let status = if approve { ValidationStatus::Passed } else { ValidationStatus::RejectedFormat };
        self.files.record_review_decision(claim_file_id, reviewer.customer_id, status, reason).await?;
        let action = if approve { FileAccessAction::Approve } else { FileAccessAction::Reject };
        self.log_access(claim_file_id, reviewer.customer_id, action, None, None).await;
        Ok(())
    }

    async fn authorize_for_claim(&self, claim_id: ClaimId, actor: &RequestingActor) -> Result<(), DocumentError> {
        if actor.is_admin() {
            return Ok(());
        }
        let (claim, _, _) = self.claims.find_any(claim_id).await?;
        if claim.customer_id == actor.customer_id {
            Ok(())
        } else {
            Err(DocumentError::Forbidden)
        }
    }

    async fn verify_round_trip(
        &self,
        storage_key: &str,
        ciphertext_len: u64,
        per_file_key: &EncryptionKey,
        expected_sha256: &str,
        algorithm: &str,
    ) -> Result<(), DocumentError> {
        let remote_len = self.store.head(storage_key).await?;
        if remote_len != ciphertext_len {
            return Err(DocumentError::IntegrityCheckFailed);
        }
        let fetched = self.store.get_range(storage_key, 0, ciphertext_len.saturating_sub(1)).await?;
        let plaintext = decrypt_by_scheme(per_file_key, fetched.as_ref(), algorithm)?;
        let actual_sha256 = hex::encode(Sha256::digest(&plaintext));
        if actual_sha256 != expected_sha256 {
            return Err(DocumentError::IntegrityCheckFailed);
        }
        Ok(())
    }

    async fn fetch_and_decrypt(&self, file: &ClaimFile) -> Result<Vec<u8>, DocumentError> {
        let wrapped = file.wrapped_file_key.as_deref().ok_or(DocumentError::IntegrityCheckFailed)?;
        let per_file_key = unwrap_file_key(&self.file_key, wrapped)?;
        let fetched = self
            .store
            .get_range(&file.storage_key, 0, file.ciphertext_size_bytes.saturating_sub(1))
            .await?;
        let plaintext = decrypt_by_scheme(&per_file_key, fetched.as_ref(), &file.encryption_scheme.algorithm)?;
        let actual_sha256 = hex::encode(Sha256::digest(&plaintext));
        if actual_sha256 != file.plaintext_sha256 {
            return Err(DocumentError::IntegrityCheckFailed);
        }
        Ok(plaintext)
    }

    async fn log_access(
        &self,
        claim_file_id: ClaimFileId,
        actor_id: CustomerId,
        action: FileAccessAction,
        client_ip: Option<String>,
        user_agent: Option<String>,
    ) {
        let log = FileAccessLog {
            id: FileAccessLogId::new(),
            claim_file_id,
            actor_id,
            action,
            client_ip,
            user_agent,
            occurred_at: Utc::now(),
        };
        if let Err(e) = self.access_logs.record(&log).await {
            warn!(claim_file_id = %claim_file_id, error = %e, "failed to record file access log");
        }
    }
}

/// Descifra `ciphertext` con el algoritmo anotado en `ClaimFile.encryption_scheme`.
/// Archivos por debajo del umbral de streaming se cifraron con una sola
/// llamada AEAD; el resto usa el formato fragmentado.
fn decrypt_by_scheme(key: &EncryptionKey, ciphertext: &[u8], algorithm: &str) -> Result<Vec<u8>, DocumentError> {
    match algorithm {
        "aes-256-gcm-oneshot" => Ok(skyclaim_crypto_vault::stream::decrypt_oneshot(key, ciphertext)?),
        _ => {
            let mut plaintext = Vec::new();
            skyclaim_crypto_vault::stream::decrypt_stream(key, &mut Cursor::new(ciphertext), &mut plaintext)?;
            Ok(plaintext)
        }
    }
}

fn rand_key_bytes() -> [u8; 32] {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// Envuelve la llave de archivo de un solo uso bajo la llave de proceso y
/// la serializa como JSON de `EncryptedField`.
fn wrap_file_key(process_key: &EncryptionKey, file_key: &EncryptionKey) -> Result<String, DocumentError> {
    let hex_key = hex::encode(file_key_bytes(file_key));
    let wrapped = encrypt_field(process_key, &hex_key)?;
    serde_json::to_string(&wrapped).map_err(|e| DocumentError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

fn unwrap_file_key(process_key: &EncryptionKey, wrapped: &str) -> Result<EncryptionKey, DocumentError> {
    let field: EncryptedField =
        serde_json::from_str(wrapped).map_err(|e| DocumentError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    let hex_key = decrypt_field(process_key, &field)?;
    EncryptionKey::from_hex(&hex_key).map_err(DocumentError::from)
}

/// La llave de archivo nunca se expone fuera de este módulo en texto
/// plano salvo para envolverla bajo la llave de proceso.
fn file_key_bytes(key: &EncryptionKey) -> [u8; 32] {
    *key.expose_secret()
}
