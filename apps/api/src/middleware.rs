// [apps/api/src/middleware.rs]
//! Guardia de autenticación perimetral. A diferencia de un esquema que
//! delega la verificación de firma a una capa externa, aquí el propio
//! proceso valida el JWT antes de dejar pasar la petición, fijando
//! siempre el algoritmo a HS256 en vez de confiar en el encabezado.

use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use skyclaim_claim_models::{CustomerId, Role};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub customer_id: CustomerId,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Superadmin)
    }
}

pub async fn auth_guard(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Auth(skyclaim_auth_service::AuthError::TokenInvalid))?;

    let (customer_id, role) = state.jwt.verify_access_token(token)?;
    debug!(customer_id = %customer_id, "request authenticated");

    req.extensions_mut().insert(AuthenticatedUser { customer_id, role });
    Ok(next.run(req).await)
}
