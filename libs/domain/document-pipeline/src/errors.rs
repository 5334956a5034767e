// [libs/domain/document-pipeline/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("[DOC_FORBIDDEN] caller is not the claim owner or an admin")]
    Forbidden,

    #[error("[DOC_MIME_MISMATCH] declared content type does not match the sniffed content type")]
    MimeMismatch,

    #[error("[DOC_TYPE_UNSUPPORTED] content type is not allowed for this document type")]
    UnsupportedContentType,

    #[error("[DOC_TOO_LARGE] file exceeds the maximum size for this document type")]
    TooLarge,

    #[error("[DOC_UNSAFE_PDF] PDF contains embedded JavaScript, embedded files, or too many pages")]
    UnsafePdf,

    #[error("[DOC_SCANNER_HIT] malware scanner flagged this file")]
    MalwareDetected,

    #[error("[DOC_SCANNER_UNAVAILABLE] malware scanner is unreachable and fail-open is disabled")]
    ScannerUnavailable,

    #[error("[DOC_INTEGRITY_FAILED] post-write verification did not match the uploaded content")]
    IntegrityCheckFailed,

    #[error("[DOC_NOT_FOUND] file not found")]
    NotFound,

    #[error("[DOC_STORE_FAULT] {0}")]
    ObjectStore(#[from] skyclaim_object_store::ObjectStoreError),

    #[error("[DOC_VAULT_FAULT] {0}")]
    Vault(#[from] skyclaim_crypto_vault::VaultError),

    #[error("[DOC_PERSISTENCE_FAULT] {0}")]
    Persistence(#[from] skyclaim_persistence::PersistenceError),

    #[error("[DOC_IO_FAULT] {0}")]
    Io(#[from] std::io::Error),
}
