// [apps/api/src/handlers/auth.rs]
//! Registro, sesión y recuperación de contraseña.
//! El refresh token viaja únicamente como cookie `HttpOnly` + `Secure` +
//! `SameSite=Strict`; el access token viaja en el cuerpo de la respuesta
//! para que el cliente lo adjunte como `Authorization: Bearer`.

use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{Json, http::StatusCode};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use skyclaim_auth_service::IssuedSession;
use skyclaim_claim_models::{Customer, Role};

const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Mejor esfuerzo para identificar al cliente detrás de un balanceador;
/// nunca se confía ciegamente en ella más allá de alimentar el limitador
/// de tasa y el rastro de auditoría.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct EmailOnlyRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerView {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub email_verified: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_token: String,
    pub customer: CustomerView,
}

fn session_response(state: &AppState, session: &IssuedSession) -> Result<SessionResponse, ApiError> {
    let email = state.auth.decrypt_email(&session.customer.email)?;
    Ok(SessionResponse {
        access_token: session.access_token.clone(),
        customer: CustomerView {
            id: session.customer.id.0.to_string(),
            email,
            role: session.customer.role,
            email_verified: session.customer.email_verified,
        },
    })
}

fn refresh_cookie(plaintext: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, plaintext))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/api/v1/auth")
        .build()
}

pub async fn register(State(state): State<AppState>, Json(body): Json<RegisterRequest>) -> Result<impl IntoResponse, ApiError> {
    let customer: Customer = state.auth.register(&body.email, &body.password).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": customer.id.0.to_string() }))))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ip = client_ip(&headers);
    let session = state.auth.login(&body.email, &body.password, &ip).await?;
    let jar = jar.add(refresh_cookie(session.refresh_token_plaintext.clone()));
    let response = session_response(&state, &session)?;
    Ok((jar, Json(response)))
}

pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse, ApiError> {
    let token = jar
        .get(REFRESH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .ok_or(ApiError::Auth(skyclaim_auth_service::AuthError::TokenInvalid))?;
    let session = state.auth.refresh(&token).await?;
    let jar = jar.add(refresh_cookie(session.refresh_token_plaintext.clone()));
    let response = session_response(&state, &session)?;
    Ok((jar, Json(response)))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse, ApiError> {
    if let Some(cookie) = jar.get(REFRESH_COOKIE_NAME) {
        state.auth.logout(cookie.value()).await?;
    }
    let jar = jar.remove(Cookie::from(REFRESH_COOKIE_NAME));
    Ok((jar, StatusCode::NO_CONTENT))
}

pub async fn request_magic_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<EmailOnlyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ip = client_ip(&headers);
    state.auth.request_magic_link(&body.email, &ip).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn verify_magic_link(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.auth.verify_magic_link(&token).await?;
    let jar = jar.add(refresh_cookie(session.refresh_token_plaintext.clone()));
    let response = session_response(&state, &session)?;
    Ok((jar, Json(response)))
}

pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(body): Json<EmailOnlyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.request_password_reset(&body.email).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetConfirmRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.confirm_password_reset(&body.token, &body.new_password).await?;
    Ok(StatusCode::NO_CONTENT)
}
