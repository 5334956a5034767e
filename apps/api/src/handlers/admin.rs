// [apps/api/src/handlers/admin.rs]
//! Acciones exclusivas de personal administrativo: transiciones de
//! estado manuales, notas internas y el historial de auditoría de un
//! reclamo. El guarda de rol se aplica aquí, no en la
//! máquina de estados, que sólo conoce `Actor::Admin` de forma abstracta.

use crate::errors::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::response::IntoResponse;
use axum::{http::StatusCode, Json};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use skyclaim_claim_models::{ClaimId, ClaimNote, ClaimNoteId, ClaimStatus, ClaimStatusHistory};
use skyclaim_eligibility_engine::evaluate;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub to: ClaimStatus,
    pub reason: Option<String>,
    pub compensation_amount: Option<Decimal>,
}

#[derive(Deserialize)]
pub struct NoteRequest {
    pub body: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryView {
    pub from_status: Option<ClaimStatus>,
    pub to_status: ClaimStatus,
    pub reason: Option<String>,
    pub occurred_at: chrono::DateTime<Utc>,
}

fn require_admin(actor: &AuthenticatedUser) -> Result<(), ApiError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Lifecycle(skyclaim_claim_lifecycle::LifecycleError::Forbidden))
    }
}

pub async fn transition_status(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(claim_id): Path<ClaimId>,
    Json(body): Json<TransitionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&actor)?;

    if body.to == ClaimStatus::UnderReview {
        evaluate_and_record_eligibility(&state, claim_id).await?;
    }

    state
        .lifecycle
        .admin_transition(claim_id, body.to, actor.customer_id, body.reason.as_deref(), body.compensation_amount)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Evalúa la elegibilidad con los hechos de vuelo ya congelados al enviar
/// el reclamo y fija `compensation_amount` por primera vez. Antes de esta
/// transición el monto permanece nulo: nadie puede aprobar un reclamo que
/// todavía no ha pasado por revisión.
async fn evaluate_and_record_eligibility(state: &AppState, claim_id: ClaimId) -> Result<(), ApiError> {
    let (claim, _, _) = state.claims().find_any(claim_id).await?;
    let region = claim
        .passenger_region
        .ok_or_else(|| ApiError::Validation("el reclamo no tiene un marco regulatorio declarado".to_string()))?;

    let facts = skyclaim_claim_models::FlightFacts {
        flight_number: claim.flight_number.clone(),
        departure_airport: claim.departure_airport.clone(),
        arrival_airport: claim.arrival_airport.clone(),
        scheduled_departure: claim.scheduled_departure,
        scheduled_arrival: claim.scheduled_arrival,
        actual_departure: claim.actual_departure,
        actual_arrival: claim.actual_arrival,
        status: skyclaim_claim_models::FlightStatus::Arrived,
        extraordinary_circumstance: claim.extraordinary_circumstance,
    };
    let result = evaluate(&facts, region, Some(claim.incident_type));

    state
        .claims()
        .record_eligibility_result(
            claim_id,
            result.amount,
            Some(result.currency),
            Some(result.regulation),
            result.flight_distance_km,
            result.delay_hours_at_gate,
            result.extraordinary_circumstances,
            result.manual_review_required,
        )
        .await?;
    Ok(())
}

pub async fn add_note(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(claim_id): Path<ClaimId>,
    Json(body): Json<NoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&actor)?;
    let note = ClaimNote { id: ClaimNoteId::new(), claim_id, author_id: actor.customer_id, body: body.body, created_at: Utc::now() };
    state.claim_notes().create(&note).await?;
    Ok(StatusCode::CREATED)
}

pub async fn list_history(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(claim_id): Path<ClaimId>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&actor)?;
    let history: Vec<ClaimStatusHistory> = state.claim_notes().list_status_history(claim_id).await?;
    let views: Vec<HistoryEntryView> = history
        .into_iter()
        .map(|h| HistoryEntryView { from_status: h.from_status, to_status: h.to_status, reason: h.reason, occurred_at: h.occurred_at })
        .collect();
    Ok(Json(views))
}
