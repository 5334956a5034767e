// [apps/api/src/handlers/files.rs]
//! Subida y descarga de documentos adjuntos a un reclamo, delegando todo
//! el trabajo pesado a `skyclaim-document-pipeline`.

use crate::errors::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;
use axum::extract::{Extension, Multipart, Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{http::StatusCode, Json};
use serde::Serialize;
use skyclaim_claim_models::{ClaimFileId, ClaimId, DocumentType};
use skyclaim_document_pipeline::{RequestingActor, UploadRequest};
use std::str::FromStr;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileView {
    pub id: String,
    pub claim_id: String,
    pub document_type: DocumentType,
    pub original_filename: String,
    pub size_bytes: u64,
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()).map(|v| v.to_string())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers.get(axum::http::header::USER_AGENT).and_then(|v| v.to_str().ok()).map(|v| v.to_string())
}

/// Espera un formulario `multipart/form-data` con los campos `claim_id`,
/// `document_type`, `filename` y el archivo en el campo `file`.
pub async fn upload(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let client_ip = client_ip(&headers);
    let user_agent = user_agent(&headers);

    let mut claim_id: Option<ClaimId> = None;
    let mut document_type: Option<DocumentType> = None;
    let mut original_filename: Option<String> = None;
    let mut declared_mime_type: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| ApiError::Validation(e.to_string()))? {
        match field.name().unwrap_or_default() {
            "claim_id" => {
                let text = field.text().await.map_err(|e| ApiError::Validation(e.to_string()))?;
                claim_id = Some(ClaimId::from_str(&text).map_err(|_| ApiError::Validation("claim_id inválido".to_string()))?);
            }
            "document_type" => {
                let text = field.text().await.map_err(|e| ApiError::Validation(e.to_string()))?;
                document_type = Some(
                    serde_json::from_value(serde_json::Value::String(text))
                        .map_err(|_| ApiError::Validation("document_type inválido".to_string()))?,
                );
            }
            "file" => {
                original_filename = field.file_name().map(|s| s.to_string());
                declared_mime_type = field.content_type().map(|s| s.to_string());
                content = Some(field.bytes().await.map_err(|e| ApiError::Validation(e.to_string()))?.to_vec());
            }
            _ => {}
        }
    }

    let claim_id = claim_id.ok_or_else(|| ApiError::Validation("falta claim_id".to_string()))?;
    let document_type = document_type.ok_or_else(|| ApiError::Validation("falta document_type".to_string()))?;
    let content = content.ok_or_else(|| ApiError::Validation("falta el archivo".to_string()))?;
    let original_filename = original_filename.unwrap_or_else(|| "upload".to_string());
    let declared_mime_type = declared_mime_type.unwrap_or_else(|| "application/octet-stream".to_string());

    if content.len() as u64 > state.config.max_file_size_bytes {
        return Err(ApiError::Document(skyclaim_document_pipeline::DocumentError::TooLarge));
    }

    let request = UploadRequest {
        claim_id,
        actor: RequestingActor { customer_id: actor.customer_id, role: actor.role },
        document_type,
        original_filename,
        declared_mime_type,
        content,
        client_ip,
        user_agent,
    };

    let file = state.documents.upload(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(UploadedFileView {
            id: file.id.0.to_string(),
            claim_id: file.claim_id.0.to_string(),
            document_type: file.document_type,
            original_filename: file.original_filename,
            size_bytes: file.size_bytes,
        }),
    ))
}

pub async fn download(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    headers: HeaderMap,
    Path(file_id): Path<ClaimFileId>,
) -> Result<impl IntoResponse, ApiError> {
    let client_ip = client_ip(&headers);
    let user_agent = user_agent(&headers);
    let actor = RequestingActor { customer_id: actor.customer_id, role: actor.role };
    let bytes = state.documents.download(file_id, actor, client_ip, user_agent).await?;
    Ok((
        [(axum::http::header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    ))
}
