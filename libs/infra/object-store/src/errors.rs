// [libs/infra/object-store/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObjectStoreError {
    #[error("[OSTORE_NET_FAULT] request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("[OSTORE_NOT_FOUND] object not found: {0}")]
    NotFound(String),

    #[error("[OSTORE_AUTH_FAULT] storage backend rejected credentials")]
    Unauthorized,

    #[error("[OSTORE_REMOTE_FAULT] storage backend returned {status}: {detail}")]
    RemoteRejection { status: u16, detail: String },

    #[error("[OSTORE_EXHAUSTED] retry budget exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("[OSTORE_IO_FAULT] {0}")]
    Io(#[from] std::io::Error),
}

/// Bucket de clasificación para decidir si un fallo amerita reintento. Vive
/// separado de `ObjectStoreError` para que `skyclaim-document-pipeline` y
/// `skyclaim-claim-lifecycle` puedan reutilizar la misma clasificación sin
/// volver a derivarla desde el código de estado HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    Retryable,
    Permanent,
    Auth,
}

impl ObjectStoreError {
    pub fn classify(&self) -> FaultClass {
        match self {
            ObjectStoreError::Transport(e) => {
                if e.is_timeout() || e.is_connect() {
                    FaultClass::Retryable
                } else {
                    FaultClass::Permanent
                }
            }
            ObjectStoreError::Unauthorized => FaultClass::Auth,
            ObjectStoreError::RemoteRejection { status, .. } => classify_status(*status),
            ObjectStoreError::NotFound(_) => FaultClass::Permanent,
            ObjectStoreError::RetriesExhausted { .. } => FaultClass::Permanent,
            ObjectStoreError::Io(_) => FaultClass::Retryable,
        }
    }
}

pub fn classify_status(status: u16) -> FaultClass {
    match status {
        401 | 403 => FaultClass::Auth,
        // 507 means the backend is out of storage; retrying the same write
        // won't free space, so treat it as permanent rather than transient.
        507 => FaultClass::Permanent,
        408 | 429 | 500..=599 => FaultClass::Retryable,
        _ => FaultClass::Permanent,
    }
}
