// [apps/api/src/handlers/claims.rs]
//! Creación, consulta y envío de reclamos desde la perspectiva del
//! cliente. Al enviar, los hechos de vuelo quedan congelados en el
//! reclamo, pero el cálculo de elegibilidad se difiere al paso en el
//! que personal administrativo mueve el reclamo a revisión.

use crate::errors::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::response::IntoResponse;
use axum::{http::StatusCode, Json};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use skyclaim_claim_models::{Claim, ClaimId, ClaimStatus, IncidentType, PassengerRegion};
use skyclaim_crypto_vault::{decrypt_field, encrypt_field, EncryptedField, EncryptionKey};
use skyclaim_persistence::{DraftFieldUpdate, PersistenceError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClaimRequest {
    pub flight_number: String,
    pub flight_date: NaiveDate,
    pub airline: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: Option<DateTime<Utc>>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub incident_type: IncidentType,
    pub incident_description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClaimRequest {
    pub flight_number: String,
    pub flight_date: NaiveDate,
    pub airline: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: Option<DateTime<Utc>>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub incident_type: IncidentType,
    pub incident_description: Option<String>,
    #[serde(default)]
    pub booking_reference: Option<String>,
    #[serde(default)]
    pub ticket_number: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitClaimRequest {
    /// Marco regulatorio bajo el que se evalúa este reclamo. El cliente lo
    /// elige explícitamente (la ruta no determina por sí sola la
    /// jurisdicción aplicable entre EU261/US DOT/CA APR).
    pub region: PassengerRegion,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRequest {
    pub terms_accepted: bool,
    pub privacy_accepted: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightInfoView {
    pub flight_number: String,
    pub airline: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimView {
    pub id: String,
    pub status: ClaimStatus,
    pub flight_info: FlightInfoView,
    pub incident_type: IncidentType,
    pub compensation_amount: Option<String>,
    pub compensation_currency: Option<String>,
    pub manual_review_required: bool,
    pub rejection_reason: Option<String>,
    pub booking_reference: Option<String>,
    pub ticket_number: Option<String>,
}

/// Construye la vista de un reclamo. `booking_reference`/`ticket_number`
/// llegan ya descifrados por el llamador (`decrypt_sensitive_fields`) — este
/// módulo nunca serializa el texto cifrado tal cual viene de la base de
/// datos.
fn claim_view(claim: &Claim, booking_reference: Option<String>, ticket_number: Option<String>) -> ClaimView {
    ClaimView {
        id: claim.id.0.to_string(),
        status: claim.status,
        flight_info: FlightInfoView {
            flight_number: claim.flight_number.clone(),
            airline: claim.airline.clone(),
            departure_airport: claim.departure_airport.clone(),
            arrival_airport: claim.arrival_airport.clone(),
            scheduled_departure: claim.scheduled_departure,
            scheduled_arrival: claim.scheduled_arrival,
        },
        incident_type: claim.incident_type,
        compensation_amount: claim.compensation_amount.map(|a| a.to_string()),
        compensation_currency: claim.compensation_currency.clone(),
        manual_review_required: claim.manual_review_required,
        rejection_reason: claim.rejection_reason.clone(),
        booking_reference,
        ticket_number,
    }
}

/// Descifra los campos sensibles que `ClaimRepository` devuelve todavía
/// envueltos (ver doc de `ClaimRepository::find_for_customer`). Un registro
/// corrupto o cifrado con otra llave falla cerrado como `ApiError::Internal`
/// en vez de devolver texto parcial.
fn decrypt_sensitive_fields(
    key: &EncryptionKey,
    booking_reference_encrypted: Option<String>,
    ticket_number_encrypted: Option<String>,
) -> Result<(Option<String>, Option<String>), ApiError> {
    Ok((decrypt_stored_field(key, booking_reference_encrypted)?, decrypt_stored_field(key, ticket_number_encrypted)?))
}

fn decrypt_stored_field(key: &EncryptionKey, stored: Option<String>) -> Result<Option<String>, ApiError> {
    stored
        .map(|raw| {
            let field: EncryptedField =
                serde_json::from_str(&raw).map_err(|e| ApiError::Internal(e.to_string()))?;
            decrypt_field(key, &field).map_err(|e| ApiError::Internal(e.to_string()))
        })
        .transpose()
}

fn encrypt_stored_field(key: &EncryptionKey, plaintext: Option<&str>) -> Result<Option<String>, ApiError> {
    plaintext
        .map(|p| {
            let field = encrypt_field(key, p).map_err(|e| ApiError::Internal(e.to_string()))?;
            serde_json::to_string(&field).map_err(|e| ApiError::Internal(e.to_string()))
        })
        .transpose()
}

pub async fn create_draft(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Json(body): Json<CreateClaimRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let claim = Claim {
        id: ClaimId::new(),
        customer_id: actor.customer_id,
        claim_group_id: None,
        flight_number: body.flight_number,
        flight_date: body.flight_date,
        airline: body.airline,
        departure_airport: body.departure_airport,
        arrival_airport: body.arrival_airport,
        scheduled_departure: body.scheduled_departure,
        scheduled_arrival: body.scheduled_arrival,
        actual_departure: body.actual_departure,
        actual_arrival: body.actual_arrival,
        incident_type: body.incident_type,
        incident_description: body.incident_description,
        status: ClaimStatus::Draft,
        passenger_region: None,
        compensation_amount: None,
        compensation_currency: None,
        regulation: None,
        flight_distance_km: None,
        delay_hours_at_gate: None,
        extraordinary_circumstance: None,
        manual_review_required: false,
        rejection_reason: None,
        assignee_id: None,
        reviewer_id: None,
        booking_reference: None,
        ticket_number: None,
        terms_consent: None,
        privacy_consent: None,
        created_at: now,
        submitted_at: None,
        updated_at: now,
        version: 0,
    };
    state.claims().create(&claim).await?;
    Ok((StatusCode::CREATED, Json(claim_view(&claim, None, None))))
}

pub async fn get_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(claim_id): Path<ClaimId>,
) -> Result<impl IntoResponse, ApiError> {
    let (claim, booking_reference_encrypted, ticket_number_encrypted) = if actor.is_admin() {
        state.claims().find_any(claim_id).await?
    } else {
        state.claims().find_for_customer(claim_id, actor.customer_id).await?
    };
    let (booking_reference, ticket_number) =
        decrypt_sensitive_fields(&state.field_key, booking_reference_encrypted, ticket_number_encrypted)?;
    Ok(Json(claim_view(&claim, booking_reference, ticket_number)))
}

/// Lista los reclamos del cliente. No descifra `booking_reference`/
/// `ticket_number` aquí: descifrar N campos por cada elemento de una lista
/// sería costoso sin necesidad, y `get_claim` ya los expone para el detalle
/// de un reclamo puntual.
pub async fn list_claims(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = state.claims().list_for_customer(actor.customer_id).await?;
    Ok(Json(claims.iter().map(|c| claim_view(c, None, None)).collect::<Vec<_>>()))
}

pub async fn record_consent(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(claim_id): Path<ClaimId>,
    headers: axum::http::HeaderMap,
    Json(body): Json<ConsentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // `find_for_customer` sirve como verificación de pertenencia: falla con
    // `ClaimNotFound` si el reclamo no existe o no es del cliente actual.
    state.claims().find_for_customer(claim_id, actor.customer_id).await?;
    if !body.terms_accepted || !body.privacy_accepted {
        return Err(ApiError::Validation("ambos consentimientos son obligatorios".to_string()));
    }
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let now = Utc::now();
    state.claims().record_consent(claim_id, now, &ip, now, &ip).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Corrige los datos de vuelo de un borrador. `update_draft_fields` exige
/// `status = 'draft'` en la propia sentencia `UPDATE`, así que un intento
/// de editar un reclamo ya enviado falla con `InvalidState` en vez de
/// aplicarse parcialmente.
pub async fn update_draft(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(claim_id): Path<ClaimId>,
    Json(body): Json<UpdateClaimRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Verifica pertenencia y existencia antes de aplicar el cambio; un
    // `PersistenceError::InvalidState` posterior sólo puede significar que
    // el borrador ya fue enviado.
    state.claims().find_for_customer(claim_id, actor.customer_id).await?;

    let update = DraftFieldUpdate {
        flight_number: body.flight_number,
        flight_date: body.flight_date,
        airline: body.airline,
        departure_airport: body.departure_airport,
        arrival_airport: body.arrival_airport,
        scheduled_departure: body.scheduled_departure,
        scheduled_arrival: body.scheduled_arrival,
        actual_departure: body.actual_departure,
        actual_arrival: body.actual_arrival,
        incident_type: body.incident_type,
        incident_description: body.incident_description,
    };

    match state.claims().update_draft_fields(claim_id, actor.customer_id, &update).await {
        Ok(()) => {}
        Err(PersistenceError::InvalidState) => {
            return Err(ApiError::Validation("sólo se puede editar un reclamo en borrador".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    if body.booking_reference.is_some() || body.ticket_number.is_some() {
        let booking_reference_encrypted = encrypt_stored_field(&state.field_key, body.booking_reference.as_deref())?;
        let ticket_number_encrypted = encrypt_stored_field(&state.field_key, body.ticket_number.as_deref())?;
        state
            .claims()
            .record_booking_identifiers(claim_id, booking_reference_encrypted.as_deref(), ticket_number_encrypted.as_deref())
            .await?;
    }

    let (claim, booking_reference_encrypted, ticket_number_encrypted) =
        state.claims().find_for_customer(claim_id, actor.customer_id).await?;
    let (booking_reference, ticket_number) =
        decrypt_sensitive_fields(&state.field_key, booking_reference_encrypted, ticket_number_encrypted)?;
    Ok(Json(claim_view(&claim, booking_reference, ticket_number)))
}

/// Envía el borrador. La elegibilidad no se calcula aquí: el reclamo
/// queda en `submitted` sin `compensation_amount`, y es la transición
/// administrativa a `under_review` la que evalúa los hechos de vuelo ya
/// congelados y fija el monto.
pub async fn submit_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(claim_id): Path<ClaimId>,
    Json(body): Json<SubmitClaimRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.claims().record_passenger_region(claim_id, body.region).await?;
    state.lifecycle.submit(claim_id, actor.customer_id).await?;

    let (claim, booking_reference_encrypted, ticket_number_encrypted) =
        state.claims().find_for_customer(claim_id, actor.customer_id).await?;
    let (booking_reference, ticket_number) =
        decrypt_sensitive_fields(&state.field_key, booking_reference_encrypted, ticket_number_encrypted)?;
    Ok(Json(claim_view(&claim, booking_reference, ticket_number)))
}
