// [libs/infra/persistence/src/repositories/claim_repository.rs]
use crate::errors::PersistenceError;
use crate::LedgerClient;
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{params, Connection, Row};
use rust_decimal::Decimal;
use skyclaim_claim_models::{
    Claim, ClaimGroupId, ClaimId, ClaimStatus, ConsentRecord, CustomerId, ExtraordinaryCircumstance,
    IncidentType, PassengerRegion, Regulation,
};
use std::str::FromStr;
use tracing::{instrument, warn};

pub struct ClaimRepository {
    client: LedgerClient,
}

/// Campos de vuelo editables mientras el reclamo sigue en `Draft`. Separado
/// de `Claim` para no tener que reconstruir un reclamo completo (con
/// estado, compensación, etc.) sólo para corregir un dato de vuelo.
pub struct DraftFieldUpdate {
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

impl ClaimRepository {
    pub fn new(client: LedgerClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, claim))]
    pub async fn create(&self, claim: &Claim) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        insert_claim(&conn, claim).await
    }

    /// Retorna el reclamo junto con sus campos cifrados a nivel de campo
    /// (`booking_reference`, `ticket_number`) aún envueltos; el llamador
    /// (normalmente un handler de `apps/api`) es quien posee la llave de
    /// cifrado y decide si descifra, igual que `CustomerRepository::find_by_id`
    /// con el correo.
    #[instrument(skip(self))]
    pub async fn find_for_customer(
        &self,
        id: ClaimId,
        customer_id: CustomerId,
    ) -> Result<(Claim, Option<String>, Option<String>), PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(SELECT_CLAIM_BY_ID_AND_CUSTOMER, params![id.0.to_string(), customer_id.0.to_string()])
            .await?;
        let row = rows.next().await?.ok_or(PersistenceError::ClaimNotFound)?;
        map_row(&row)
    }

    /// Carga sin restricción de dueño; uso exclusivo de personal con
    /// `Role::Admin` o superior, que el llamador debe haber verificado ya.
    #[instrument(skip(self))]
    pub async fn find_any(&self, id: ClaimId) -> Result<(Claim, Option<String>, Option<String>), PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn.query(SELECT_CLAIM_BY_ID, params![id.0.to_string()]).await?;
        let row = rows.next().await?.ok_or(PersistenceError::ClaimNotFound)?;
        map_row(&row)
    }

    #[instrument(skip(self))]
    pub async fn list_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Claim>, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                &format!("{SELECT_CLAIM_COLUMNS} FROM claims WHERE customer_id = ?1 ORDER BY created_at DESC"),
                params![customer_id.0.to_string()],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(map_row(&row)?.0);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn list_for_group(&self, group_id: ClaimGroupId) -> Result<Vec<Claim>, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                &format!("{SELECT_CLAIM_COLUMNS} FROM claims WHERE claim_group_id = ?1"),
                params![group_id.0.to_string()],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(map_row(&row)?.0);
        }
        Ok(out)
    }

    /// Persiste la referencia de reserva y el número de billete ya cifrados
    /// a nivel de campo por el llamador (`skyclaim-crypto-vault::encrypt_field`).
    #[instrument(skip(self, booking_reference_encrypted, ticket_number_encrypted))]
    pub async fn record_booking_identifiers(
        &self,
        id: ClaimId,
        booking_reference_encrypted: Option<&str>,
        ticket_number_encrypted: Option<&str>,
    ) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        let affected = conn
            .execute(
                "UPDATE claims SET booking_reference_encrypted = ?2, ticket_number_encrypted = ?3, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![id.0.to_string(), booking_reference_encrypted, ticket_number_encrypted],
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::ClaimNotFound);
        }
        Ok(())
    }

    /// Transición de estado protegida por versión optimista: falla
    /// cerrado (0 filas afectadas) si `expected_version` no coincide con
    /// la versión actual, o si el reclamo no está en `expected_status`.
    #[instrument(skip(self))]
    pub async fn guarded_transition(
        &self,
        id: ClaimId,
        expected_status: ClaimStatus,
        new_status: ClaimStatus,
        expected_version: i64,
    ) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        self.guarded_transition_on(&conn, id, expected_status, new_status, expected_version).await
    }

    pub async fn guarded_transition_on(
        &self,
        conn: &Connection,
        id: ClaimId,
        expected_status: ClaimStatus,
        new_status: ClaimStatus,
        expected_version: i64,
    ) -> Result<(), PersistenceError> {
        let result = conn
            .execute(
                "UPDATE claims SET status = ?4, updated_at = CURRENT_TIMESTAMP, version = version + 1
                 WHERE id = ?1 AND status = ?2 AND version = ?3",
                params![
                    id.0.to_string(),
                    status_to_str(expected_status),
                    expected_version,
                    status_to_str(new_status),
                ],
            )
            .await;
        let affected = match result {
            Ok(affected) => affected,
            // `idx_claims_unique_non_draft` rejects a second non-draft claim for the
            // same (customer, flight_number, flight_date); surface it as a conflict,
            // not an opaque query fault.
            Err(e) if e.to_string().contains("UNIQUE") => return Err(PersistenceError::DuplicateClaim),
            Err(e) => return Err(PersistenceError::Query(e)),
        };
        if affected == 0 {
            return self.diagnose_transition_failure(conn, id, expected_version).await;
        }
        Ok(())
    }

    async fn diagnose_transition_failure(
        &self,
        conn: &Connection,
        id: ClaimId,
        expected_version: i64,
    ) -> Result<(), PersistenceError> {
        let mut rows = conn
            .query("SELECT version FROM claims WHERE id = ?1", params![id.0.to_string()])
            .await?;
        match rows.next().await? {
            None => Err(PersistenceError::ClaimNotFound),
            Some(row) => {
                let current_version: i64 = row.get(0)?;
                if current_version != expected_version {
                    warn!(claim_id = %id, "version conflict on claim transition");
                    Err(PersistenceError::VersionConflict)
                } else {
                    Err(PersistenceError::InvalidState)
                }
            }
        }
    }

    /// Registra el marco regulatorio elegido por el pasajero en el envío;
    /// no toca `compensation_amount` ni el resto de los campos calculados
    /// por el motor de elegibilidad.
    #[instrument(skip(self))]
    pub async fn record_passenger_region(&self, id: ClaimId, region: PassengerRegion) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        let affected = conn
            .execute(
                "UPDATE claims SET passenger_region = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![id.0.to_string(), passenger_region_to_str(region)],
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::ClaimNotFound);
        }
        Ok(())
    }

    /// Asienta el resultado del motor de elegibilidad en el reclamo.
    #[instrument(skip(self))]
    pub async fn record_eligibility_result(
        &self,
        id: ClaimId,
        amount: Option<Decimal>,
        currency: Option<&str>,
        regulation: Option<Regulation>,
        flight_distance_km: Option<f64>,
        delay_hours_at_gate: Option<f64>,
        extraordinary_circumstance: Option<ExtraordinaryCircumstance>,
        manual_review_required: bool,
    ) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "UPDATE claims SET
                compensation_amount = ?2, compensation_currency = ?3, regulation = ?4,
                flight_distance_km = ?5, delay_hours_at_gate = ?6, extraordinary_circumstance = ?7,
                manual_review_required = ?8, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?1",
            params![
                id.0.to_string(),
                amount.map(|a| a.to_string()),
                currency,
                regulation.map(regulation_to_str),
                flight_distance_km,
                delay_hours_at_gate,
                extraordinary_circumstance.map(extraordinary_to_str),
                manual_review_required,
            ],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, reason))]
    pub async fn record_rejection(&self, id: ClaimId, reason: &str) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "UPDATE claims SET rejection_reason = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
            params![id.0.to_string(), reason],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn record_consent(
        &self,
        id: ClaimId,
        terms_consent_at: DateTime<Utc>,
        terms_consent_ip: &str,
        privacy_consent_at: DateTime<Utc>,
        privacy_consent_ip: &str,
    ) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        let affected = conn
            .execute(
                "UPDATE claims SET
                    terms_consent_at = ?2, terms_consent_ip = ?3,
                    privacy_consent_at = ?4, privacy_consent_ip = ?5,
                    updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?1",
                params![
                    id.0.to_string(),
                    terms_consent_at.to_rfc3339(),
                    terms_consent_ip,
                    privacy_consent_at.to_rfc3339(),
                    privacy_consent_ip,
                ],
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::ClaimNotFound);
        }
        Ok(())
    }

    /// Actualiza los campos de vuelo de un borrador todavía no enviado.
    /// La cláusula `status = 'draft'` en el `WHERE` hace de guarda: no hay
    /// forma de editar un reclamo ya enviado a través de este método, sin
    /// necesidad de una transacción aparte para comprobarlo antes.
    #[instrument(skip(self, claim))]
    pub async fn update_draft_fields(
        &self,
        id: ClaimId,
        customer_id: CustomerId,
        claim: &DraftFieldUpdate,
    ) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        let affected = conn
            .execute(
                "UPDATE claims SET
                    flight_number = ?3, flight_date = ?4, airline = ?5,
                    departure_airport = ?6, arrival_airport = ?7,
                    scheduled_departure = ?8, scheduled_arrival = ?9,
                    actual_departure = ?10, actual_arrival = ?11,
                    incident_type = ?12, incident_description = ?13,
                    updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?1 AND customer_id = ?2 AND status = 'draft'",
                params![
                    id.0.to_string(),
                    customer_id.0.to_string(),
                    claim.flight_number.clone(),
                    claim.flight_date.to_string(),
                    claim.airline.clone(),
                    claim.departure_airport.clone(),
                    claim.arrival_airport.clone(),
                    claim.scheduled_departure.to_rfc3339(),
                    claim.scheduled_arrival.map(|t| t.to_rfc3339()),
                    claim.actual_departure.map(|t| t.to_rfc3339()),
                    claim.actual_arrival.map(|t| t.to_rfc3339()),
                    incident_to_str(claim.incident_type),
                    claim.incident_description.clone(),
                ],
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::InvalidState);
        }
        Ok(())
    }

    /// Borradores todavía vivos, para que `reminder_scheduler` (en
    /// `apps/api`) decida en memoria si cada uno ya alcanzó el siguiente
    /// umbral de recordatorio. Devuelve
    /// `(id, customer_id, created_at, last_reminder_tier)`.
    #[instrument(skip(self))]
    pub async fn find_drafts_for_reminder_scan(
        &self,
        limit: i64,
    ) -> Result<Vec<(ClaimId, CustomerId, DateTime<Utc>, i64)>, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT id, customer_id, created_at, last_reminder_tier FROM claims
                 WHERE status = 'draft' AND last_reminder_tier < 4 LIMIT ?1",
                params![limit],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let id_str: String = row.get(0)?;
            let customer_id_str: String = row.get(1)?;
            let created_at_str: String = row.get(2)?;
            out.push((
                ClaimId::from_str(&id_str).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
                CustomerId::from_str(&customer_id_str).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
                parse_dt(&created_at_str)?,
                row.get(3)?,
            ));
        }
        Ok(out)
    }

    /// Asienta el último recordatorio de borrador enviado, para no repetirlo
    /// en la siguiente pasada del scheduler.
    #[instrument(skip(self))]
    pub async fn record_reminder_tier(&self, id: ClaimId, tier: i64) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "UPDATE claims SET last_reminder_tier = ?2 WHERE id = ?1",
            params![id.0.to_string(), tier],
        )
        .await?;
        Ok(())
    }

    /// Borradores vencidos elegibles para purga automática. Usado por el
    /// reaper de `apps/api`.
    #[instrument(skip(self))]
    pub async fn find_stale_drafts(&self, older_than: DateTime<Utc>, limit: i64) -> Result<Vec<ClaimId>, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT id FROM claims WHERE status = 'draft' AND created_at < ?1 LIMIT ?2",
                params![older_than.to_rfc3339(), limit],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let id_str: String = row.get(0)?;
            out.push(ClaimId::from_str(&id_str).map_err(|e| PersistenceError::Mapping(e.to_string()))?);
        }
        Ok(out)
    }
}

async fn insert_claim(conn: &Connection, claim: &Claim) -> Result<(), PersistenceError> {
    conn.execute(
        "INSERT INTO claims (
            id, customer_id, claim_group_id, flight_number, flight_date, airline,
            departure_airport, arrival_airport, scheduled_departure, scheduled_arrival,
            actual_departure, actual_arrival, incident_type, incident_description, status,
            created_at, updated_at, version
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            claim.id.0.to_string(),
            claim.customer_id.0.to_string(),
            claim.claim_group_id.map(|g| g.0.to_string()),
            claim.flight_number.clone(),
            claim.flight_date.to_string(),
            claim.airline.clone(),
            claim.departure_airport.clone(),
            claim.arrival_airport.clone(),
            claim.scheduled_departure.to_rfc3339(),
            claim.scheduled_arrival.map(|t| t.to_rfc3339()),
            claim.actual_departure.map(|t| t.to_rfc3339()),
            claim.actual_arrival.map(|t| t.to_rfc3339()),
            incident_to_str(claim.incident_type),
            claim.incident_description.clone(),
            status_to_str(claim.status),
            claim.created_at.to_rfc3339(),
            claim.updated_at.to_rfc3339(),
            claim.version,
        ],
    )
    .await?;
    Ok(())
}

const SELECT_CLAIM_COLUMNS: &str = "SELECT id, customer_id, claim_group_id, flight_number, flight_date, airline,
    departure_airport, arrival_airport, scheduled_departure, scheduled_arrival,
    actual_departure, actual_arrival, incident_type, incident_description, status,
    compensation_amount, compensation_currency, regulation, flight_distance_km,
    delay_hours_at_gate, extraordinary_circumstance, rejection_reason, assignee_id,
    reviewer_id, terms_consent_at, terms_consent_ip, privacy_consent_at, privacy_consent_ip,
    booking_reference_encrypted, ticket_number_encrypted,
    created_at, submitted_at, updated_at, version, manual_review_required, passenger_region";

const SELECT_CLAIM_BY_ID: &str = "SELECT id, customer_id, claim_group_id, flight_number, flight_date, airline,
    departure_airport, arrival_airport, scheduled_departure, scheduled_arrival,
    actual_departure, actual_arrival, incident_type, incident_description, status,
    compensation_amount, compensation_currency, regulation, flight_distance_km,
    delay_hours_at_gate, extraordinary_circumstance, rejection_reason, assignee_id,
    reviewer_id, terms_consent_at, terms_consent_ip, privacy_consent_at, privacy_consent_ip,
    booking_reference_encrypted, ticket_number_encrypted,
    created_at, submitted_at, updated_at, version, manual_review_required, passenger_region FROM claims WHERE id = ?1";

const SELECT_CLAIM_BY_ID_AND_CUSTOMER: &str = "SELECT id, customer_id, claim_group_id, flight_number, flight_date, airline,
    departure_airport, arrival_airport, scheduled_departure, scheduled_arrival,
    actual_departure, actual_arrival, incident_type, incident_description, status,
    compensation_amount, compensation_currency, regulation, flight_distance_km,
    delay_hours_at_gate, extraordinary_circumstance, rejection_reason, assignee_id,
    reviewer_id, terms_consent_at, terms_consent_ip, privacy_consent_at, privacy_consent_ip,
    booking_reference_encrypted, ticket_number_encrypted,
    created_at, submitted_at, updated_at, version, manual_review_required, passenger_region FROM claims WHERE id = ?1 AND customer_id = ?2";

fn status_to_str(status: ClaimStatus) -> &'static str {
    match status {
        ClaimStatus::Draft => "draft",
        ClaimStatus::Submitted => "submitted",
        ClaimStatus::UnderReview => "under_review",
        ClaimStatus::Approved => "approved",
        ClaimStatus::Rejected => "rejected",
        ClaimStatus::Paid => "paid",
        ClaimStatus::Closed => "closed",
        ClaimStatus::Discarded => "discarded",
    }
}

fn status_from_str(s: &str) -> Result<ClaimStatus, PersistenceError> {
    Ok(match s {
        "draft" => ClaimStatus::Draft,
        "submitted" => ClaimStatus::Submitted,
        "under_review" => ClaimStatus::UnderReview,
        "approved" => ClaimStatus::Approved,
        "rejected" => ClaimStatus::Rejected,
        "paid" => ClaimStatus::Paid,
        "closed" => ClaimStatus::Closed,
        "discarded" => ClaimStatus::Discarded,
        other => return Err(PersistenceError::Mapping(format!("unknown claim status {other}"))),
    })
}

fn incident_to_str(incident: IncidentType) -> &'static str {
    match incident {
        IncidentType::Delay => "delay",
        IncidentType::Cancellation => "cancellation",
        IncidentType::DeniedBoarding => "denied_boarding",
        IncidentType::BaggageDelay => "baggage_delay",
    }
}

fn incident_from_str(s: &str) -> Result<IncidentType, PersistenceError> {
    Ok(match s {
        "delay" => IncidentType::Delay,
        "cancellation" => IncidentType::Cancellation,
        "denied_boarding" => IncidentType::DeniedBoarding,
        "baggage_delay" => IncidentType::BaggageDelay,
        other => return Err(PersistenceError::Mapping(format!("unknown incident type {other}"))),
    })
}

fn passenger_region_to_str(r: PassengerRegion) -> &'static str {
    match r {
        PassengerRegion::Eu => "eu",
        PassengerRegion::Us => "us",
        PassengerRegion::Ca => "ca",
    }
}

fn passenger_region_from_str(s: &str) -> Option<PassengerRegion> {
    match s {
        "eu" => Some(PassengerRegion::Eu),
        "us" => Some(PassengerRegion::Us),
        "ca" => Some(PassengerRegion::Ca),
        _ => None,
    }
}

fn regulation_to_str(r: Regulation) -> &'static str {
    match r {
        Regulation::Eu261 => "eu261",
        Regulation::UsDot => "us_dot",
        Regulation::CaApr => "ca_apr",
    }
}

fn regulation_from_str(s: &str) -> Option<Regulation> {
    match s {
        "eu261" => Some(Regulation::Eu261),
        "us_dot" => Some(Regulation::UsDot),
        "ca_apr" => Some(Regulation::CaApr),
        _ => None,
    }
}

fn extraordinary_to_str(c: ExtraordinaryCircumstance) -> &'static str {
    match c {
        ExtraordinaryCircumstance::Weather => "weather",
        ExtraordinaryCircumstance::AirTrafficControl => "air_traffic_control",
        ExtraordinaryCircumstance::Security => "security",
        ExtraordinaryCircumstance::Political => "political",
    }
}

fn extraordinary_from_str(s: &str) -> Option<ExtraordinaryCircumstance> {
    match s {
        "weather" => Some(ExtraordinaryCircumstance::Weather),
        "air_traffic_control" => Some(ExtraordinaryCircumstance::AirTrafficControl),
        "security" => Some(ExtraordinaryCircumstance::Security),
        "political" => Some(ExtraordinaryCircumstance::Political),
        _ => None,
    }
}

fn parse_dt(s: &str) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| PersistenceError::Mapping(e.to_string()))
}

fn parse_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>, PersistenceError> {
    s.map(|s| parse_dt(&s)).transpose()
}

fn map_row(row: &Row) -> Result<(Claim, Option<String>, Option<String>), PersistenceError> {
    let id_str: String = row.get(0)?;
    let customer_id_str: String = row.get(1)?;
    let claim_group_id_str: Option<String> = row.get(2)?;
    let flight_date_str: String = row.get(4)?;
    let compensation_amount_str: Option<String> = row.get(15)?;

    let terms_consent_at: Option<String> = row.get(24)?;
    let terms_consent_ip: Option<String> = row.get(25)?;
    let privacy_consent_at: Option<String> = row.get(26)?;
    let privacy_consent_ip: Option<String> = row.get(27)?;
    let booking_reference_encrypted: Option<String> = row.get(28)?;
    let ticket_number_encrypted: Option<String> = row.get(29)?;

    let terms_consent = match (terms_consent_at, terms_consent_ip) {
        (Some(at), Some(ip)) => Some(ConsentRecord { accepted_at: parse_dt(&at)?, client_ip: ip }),
        _ => None,
    };
    let privacy_consent = match (privacy_consent_at, privacy_consent_ip) {
        (Some(at), Some(ip)) => Some(ConsentRecord { accepted_at: parse_dt(&at)?, client_ip: ip }),
        _ => None,
    };

    let claim = Claim {
        id: ClaimId::from_str(&id_str).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        customer_id: CustomerId::from_str(&customer_id_str).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        claim_group_id: claim_group_id_str
            .map(|s| ClaimGroupId::from_str(&s))
            .transpose()
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        flight_number: row.get(3)?,
        flight_date: NaiveDate::from_str(&flight_date_str).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        airline: row.get(5)?,
        departure_airport: row.get(6)?,
        arrival_airport: row.get(7)?,
        scheduled_departure: parse_dt(&row.get::<String>(8)?)?,
        scheduled_arrival: parse_opt_dt(row.get(9)?)?,
        actual_departure: parse_opt_dt(row.get(10)?)?,
        actual_arrival: parse_opt_dt(row.get(11)?)?,
        incident_type: incident_from_str(&row.get::<String>(12)?)?,
        incident_description: row.get(13)?,
        status: status_from_str(&row.get::<String>(14)?)?,
        compensation_amount: compensation_amount_str
            .map(|s| Decimal::from_str(&s))
            .transpose()
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        compensation_currency: row.get(16)?,
        regulation: row.get::<Option<String>>(17)?.and_then(|s| regulation_from_str(&s)),
        flight_distance_km: row.get(18)?,
        delay_hours_at_gate: row.get(19)?,
        extraordinary_circumstance: row.get::<Option<String>>(20)?.and_then(|s| extraordinary_from_str(&s)),
        rejection_reason: row.get(21)?,
        assignee_id: row
            .get::<Option<String>>(22)?
            .map(|s| CustomerId::from_str(&s))
            .transpose()
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        reviewer_id: row
            .get::<Option<String>>(23)?
            .map(|s| CustomerId::from_str(&s))
            .transpose()
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        booking_reference: None,
        ticket_number: None,
        terms_consent,
        privacy_consent,
        created_at: parse_dt(&row.get::<String>(30)?)?,
        submitted_at: parse_opt_dt(row.get(31)?)?,
        updated_at: parse_dt(&row.get::<String>(32)?)?,
        version: row.get(33)?,
        manual_review_required: row.get::<i64>(34)? != 0,
        passenger_region: row.get::<Option<String>>(35)?.and_then(|s| passenger_region_from_str(&s)),
    };

    Ok((claim, booking_reference_encrypted, ticket_number_encrypted))
}
