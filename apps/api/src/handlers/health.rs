// [apps/api/src/handlers/health.rs]
//! Sondas de disponibilidad usadas por balanceadores y orquestadores.
//! `/health` sólo confirma que el proceso responde; `/health/db` además
//! ejecuta una consulta trivial contra la base para distinguir un
//! proceso vivo de uno que no puede alcanzar su almacenamiento.

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

pub async fn health_db(State(state): State<AppState>) -> impl IntoResponse {
    let conn = match state.client.get_connection() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::SERVICE_UNAVAILABLE, "db unavailable"),
    };

    match conn.query("SELECT 1", ()).await {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "db unavailable"),
    }
}
