// [apps/api/src/routes.rs]
//! Topología HTTP completa. Las rutas de autenticación pública quedan
//! fuera de `auth_guard`; todo lo demás bajo `/api/v1` exige un access
//! token válido, y las rutas de `admin` además exigen rol admin (ver
//! `handlers::admin::require_admin`).

use crate::handlers::{admin, auth, claims, files, health};
use crate::middleware::auth_guard;
use crate::state::AppState;
use axum::http::{header, Method};
use axum::routing::{get, patch, post};
use axum::{middleware, Router};
use std::time::Duration;
use tower_http::cors::CorsLayer;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let public_auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/magic-link/request", post(auth::request_magic_link))
        .route("/magic-link/verify/:token", get(auth::verify_magic_link))
        .route("/password/reset-request", post(auth::request_password_reset))
        .route("/password/reset-confirm", post(auth::confirm_password_reset));

    let claim_routes = Router::new()
        .route("/", get(claims::list_claims).post(claims::create_draft))
        .route("/:claim_id", get(claims::get_claim).patch(claims::update_draft))
        .route("/:claim_id/consent", post(claims::record_consent))
        .route("/:claim_id/submit", post(claims::submit_claim))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let file_routes = Router::new()
        .route("/upload", post(files::upload))
        .route("/:file_id/download", get(files::download))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let admin_routes = Router::new()
        .route("/claims/:claim_id/status", patch(admin::transition_status))
        .route("/claims/:claim_id/notes", post(admin::add_note))
        .route("/claims/:claim_id/history", get(admin::list_history))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/health/db", get(health::health_db))
        .nest(
            "/api/v1",
            Router::new()
                .nest("/auth", public_auth_routes)
                .nest("/claims", claim_routes)
                .nest("/files", file_routes)
                .nest("/admin", admin_routes),
        )
        .layer(cors)
        .with_state(state)
}
