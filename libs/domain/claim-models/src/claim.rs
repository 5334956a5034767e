// [libs/domain/claim-models/src/claim.rs]
use crate::{ClaimGroupId, ClaimId, CustomerId};
use crate::flight::{ExtraordinaryCircumstance, PassengerRegion, Regulation};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tipo de incidente declarado por el pasajero al abrir el reclamo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Delay,
    Cancellation,
    DeniedBoarding,
    BaggageDelay,
}

/// Estados de la máquina finita de reclamos. El orden de
/// las variantes no implica orden temporal; la tabla de transiciones
/// válidas vive en `skyclaim-claim-lifecycle`, no aquí.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Paid,
    Closed,
    /// Terminal implícito emitido por la tarea programada de purga de
    /// borradores vencidos.
    Discarded,
}

/// Marca de consentimiento: instante de aceptación + IP de origen, para
/// el rastro de auditoría legal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub accepted_at: DateTime<Utc>,
    pub client_ip: String,
}

/// Un reclamo de un pasajero por un vuelo perturbado.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub customer_id: CustomerId,
    pub claim_group_id: Option<ClaimGroupId>,
    pub flight_number: String,
    pub flight_date: chrono::NaiveDate,
    pub airline: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: Option<DateTime<Utc>>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub incident_type: IncidentType,
    pub incident_description: Option<String>,
    pub status: ClaimStatus,
    /// Marco regulatorio elegido por el pasajero al enviar el reclamo;
    /// ausente mientras el reclamo sigue en `Draft`. Persistido aquí para
    /// que la evaluación de elegibilidad pueda recalcularse más tarde, en
    /// el momento en que se fija `compensation_amount`, sin depender de
    /// que el cliente la repita.
    pub passenger_region: Option<PassengerRegion>,
    pub compensation_amount: Option<Decimal>,
    pub compensation_currency: Option<String>,
    pub regulation: Option<Regulation>,
    pub flight_distance_km: Option<f64>,
    pub delay_hours_at_gate: Option<f64>,
    pub extraordinary_circumstance: Option<ExtraordinaryCircumstance>,
    /// Copiado tal cual del `EligibilityResult` del motor en el momento del
    /// envío; no siempre coincide con `extraordinary_circumstance.is_some()`
    /// (p. ej. un aeropuerto desconocido también fuerza revisión manual sin
    /// que haya circunstancia extraordinaria alguna).
    pub manual_review_required: bool,
    pub rejection_reason: Option<String>,
    pub assignee_id: Option<CustomerId>,
    pub reviewer_id: Option<CustomerId>,
    pub booking_reference: Option<String>,
    pub ticket_number: Option<String>,
    pub terms_consent: Option<ConsentRecord>,
    pub privacy_consent: Option<ConsentRecord>,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    /// Columna de control optimista.
    pub version: i64,
}

impl Claim {
    /// Invariante: el grupo de una reclamación sólo puede
    /// enviarse si el consentimiento colectivo fue confirmado; esta
    /// función no consulta el grupo (eso es I/O), sólo expresa el
    /// requisito local del propio reclamo.
    pub fn has_required_submission_fields(&self) -> bool {
        self.terms_consent.is_some()
            && self.privacy_consent.is_some()
            && !self.flight_number.trim().is_empty()
            && self.scheduled_arrival.is_some()
    }
}
