// [apps/api/src/errors.rs]
//! Traduce cada error de dominio a una forma estable en el borde HTTP:
//! un código fijo, un estado HTTP y un mensaje seguro para el cliente.
//! Nunca se expone el texto crudo de un error interno.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use skyclaim_auth_service::AuthError;
use skyclaim_claim_lifecycle::LifecycleError;
use skyclaim_document_pipeline::DocumentError;
use skyclaim_persistence::PersistenceError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("internal error")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
    timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ApiError {
    fn code_and_status(&self) -> (&'static str, StatusCode) {
        match self {
            ApiError::Validation(_) => ("validation", StatusCode::BAD_REQUEST),
            ApiError::Internal(_) => ("internal", StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Auth(e) => auth_code_and_status(e),
            ApiError::Lifecycle(e) => lifecycle_code_and_status(e),
            ApiError::Document(e) => document_code_and_status(e),
            ApiError::Persistence(e) => persistence_code_and_status(e),
        }
    }

    /// Mensaje seguro para el cliente; nunca el `Display` de un error
    /// interno (evita filtrar detalle de esquema, SQL o rutas de archivo).
    fn public_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Auth(e) => auth_public_message(e),
            ApiError::Lifecycle(_) => "la transición solicitada no es válida".to_string(),
            ApiError::Document(e) => document_public_message(e),
            ApiError::Persistence(_) | ApiError::Internal(_) => "ocurrió un error interno".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, status) = self.code_and_status();
        if status.is_server_error() {
            match &self {
                // `Internal` wraps a vault/serde error string that may echo back a
                // fragment of the plaintext it failed to encode; never log it raw.
                ApiError::Internal(_) => {
                    tracing::error!(error = skyclaim_observability::redact_pii(""), "unhandled server error")
                }
                other => tracing::error!(error = %other, "unhandled server error"),
            }
        }
        let body = ErrorBody { error: ErrorDetail { code, message: self.public_message(), details: None }, timestamp: chrono::Utc::now() };
        (status, Json(body)).into_response()
    }
}

fn auth_code_and_status(e: &AuthError) -> (&'static str, StatusCode) {
    match e {
        AuthError::InvalidCredentials => ("unauthenticated", StatusCode::UNAUTHORIZED),
        AuthError::AccountLocked => ("account_locked", StatusCode::LOCKED),
        AuthError::WeakPassword => ("validation", StatusCode::BAD_REQUEST),
        AuthError::DuplicateEmail => ("conflict", StatusCode::CONFLICT),
        AuthError::TokenInvalid => ("unauthenticated", StatusCode::UNAUTHORIZED),
        AuthError::RateLimited => ("rate_limited", StatusCode::TOO_MANY_REQUESTS),
        AuthError::NotFound => ("not_found", StatusCode::NOT_FOUND),
        AuthError::Hashing(_) | AuthError::FieldEncoding(_) => ("internal", StatusCode::INTERNAL_SERVER_ERROR),
        AuthError::Jwt(_) => ("unauthenticated", StatusCode::UNAUTHORIZED),
        AuthError::Persistence(inner) => persistence_code_and_status(inner),
        AuthError::Vault(_) => ("internal", StatusCode::INTERNAL_SERVER_ERROR),
        AuthError::RateLimiterBackend(_) => ("dependency_unavailable", StatusCode::SERVICE_UNAVAILABLE),
    }
}

fn auth_public_message(e: &AuthError) -> String {
    match e {
        AuthError::InvalidCredentials => "credenciales inválidas".to_string(),
        AuthError::AccountLocked => "la cuenta está temporalmente bloqueada".to_string(),
        AuthError::WeakPassword => "la contraseña no cumple la política de seguridad".to_string(),
        AuthError::DuplicateEmail => "el correo ya está registrado".to_string(),
        AuthError::TokenInvalid => "el token es inválido o expiró".to_string(),
        AuthError::RateLimited => "demasiados intentos, intenta más tarde".to_string(),
        AuthError::NotFound => "recurso no encontrado".to_string(),
        _ => "ocurrió un error interno".to_string(),
    }
}

fn lifecycle_code_and_status(e: &LifecycleError) -> (&'static str, StatusCode) {
    match e {
        LifecycleError::InvalidTransition => ("conflict", StatusCode::CONFLICT),
        LifecycleError::RequiredFieldsMissing => ("validation", StatusCode::BAD_REQUEST),
        LifecycleError::ConsentMissing => ("validation", StatusCode::BAD_REQUEST),
        LifecycleError::DuplicateClaim => ("conflict", StatusCode::CONFLICT),
        LifecycleError::GuardFailed(_) => ("validation", StatusCode::BAD_REQUEST),
        LifecycleError::Forbidden => ("forbidden", StatusCode::FORBIDDEN),
        LifecycleError::ConcurrentModification => ("conflict", StatusCode::CONFLICT),
        LifecycleError::NotFound => ("not_found", StatusCode::NOT_FOUND),
        LifecycleError::Persistence(inner) => persistence_code_and_status(inner),
    }
}

fn document_code_and_status(e: &DocumentError) -> (&'static str, StatusCode) {
    match e {
        DocumentError::Forbidden => ("forbidden", StatusCode::FORBIDDEN),
        DocumentError::MimeMismatch => ("mime_mismatch", StatusCode::BAD_REQUEST),
        DocumentError::UnsupportedContentType => ("validation", StatusCode::BAD_REQUEST),
        DocumentError::TooLarge => ("validation", StatusCode::PAYLOAD_TOO_LARGE),
        DocumentError::UnsafePdf => ("validation", StatusCode::BAD_REQUEST),
        DocumentError::MalwareDetected => ("scanner_detected_threat", StatusCode::UNPROCESSABLE_ENTITY),
        DocumentError::ScannerUnavailable => ("scanner_unavailable", StatusCode::SERVICE_UNAVAILABLE),
        DocumentError::IntegrityCheckFailed => ("integrity_check_failed", StatusCode::INTERNAL_SERVER_ERROR),
        DocumentError::NotFound => ("not_found", StatusCode::NOT_FOUND),
        DocumentError::ObjectStore(_) => ("dependency_unavailable", StatusCode::BAD_GATEWAY),
        DocumentError::Vault(_) | DocumentError::Persistence(PersistenceError::Configuration(_)) => {
            ("internal", StatusCode::INTERNAL_SERVER_ERROR)
        }
        DocumentError::Persistence(inner) => persistence_code_and_status(inner),
        DocumentError::Io(_) => ("internal", StatusCode::INTERNAL_SERVER_ERROR),
    }
}

fn document_public_message(e: &DocumentError) -> String {
    match e {
        DocumentError::Forbidden => "no tienes permiso sobre este documento".to_string(),
        DocumentError::MimeMismatch => "el contenido del archivo no coincide con el tipo declarado".to_string(),
        DocumentError::UnsupportedContentType => "tipo de archivo no admitido para este documento".to_string(),
        DocumentError::TooLarge => "el archivo excede el tamaño máximo permitido".to_string(),
        DocumentError::UnsafePdf => "el PDF contiene elementos no permitidos".to_string(),
        DocumentError::MalwareDetected => "el archivo fue marcado como potencialmente dañino".to_string(),
        DocumentError::ScannerUnavailable => "el servicio de escaneo no está disponible, intenta más tarde".to_string(),
        DocumentError::NotFound => "documento no encontrado".to_string(),
        _ => "ocurrió un error interno".to_string(),
    }
}

fn persistence_code_and_status(e: &PersistenceError) -> (&'static str, StatusCode) {
    match e {
        PersistenceError::Connection(_) => ("dependency_unavailable", StatusCode::SERVICE_UNAVAILABLE),
        PersistenceError::Configuration(_) => ("internal", StatusCode::INTERNAL_SERVER_ERROR),
        PersistenceError::Query(_) => ("internal", StatusCode::INTERNAL_SERVER_ERROR),
        PersistenceError::Mapping(_) => ("internal", StatusCode::INTERNAL_SERVER_ERROR),
        PersistenceError::ClaimNotFound => ("not_found", StatusCode::NOT_FOUND),
        PersistenceError::OwnershipConflict => ("forbidden", StatusCode::FORBIDDEN),
        PersistenceError::InvalidState => ("conflict", StatusCode::CONFLICT),
        PersistenceError::VersionConflict => ("conflict", StatusCode::CONFLICT),
        PersistenceError::DuplicateClaim => ("conflict", StatusCode::CONFLICT),
        PersistenceError::TransactionFailed => ("internal", StatusCode::INTERNAL_SERVER_ERROR),
        PersistenceError::CustomerNotFound => ("not_found", StatusCode::NOT_FOUND),
        PersistenceError::DuplicateEmail => ("conflict", StatusCode::CONFLICT),
        PersistenceError::FileNotFound => ("not_found", StatusCode::NOT_FOUND),
        PersistenceError::TokenNotUsable => ("unauthenticated", StatusCode::UNAUTHORIZED),
        PersistenceError::ClaimGroupNotFound => ("not_found", StatusCode::NOT_FOUND),
        PersistenceError::AlreadySent => ("conflict", StatusCode::CONFLICT),
    }
}
