// [libs/domain/claim-models/src/outbox.rs]
use crate::{ClaimId, CustomerId, OutboxEventId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tipo de efecto secundario diferido encolado junto a una transición de
/// estado, nunca disparado dentro de la transacción que lo originó
/// El patrón outbox reemplaza el disparo directo de notificaciones
/// dentro de una transacción de base de datos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ClaimSubmitted,
    ClaimApproved,
    ClaimRejected,
    ClaimPaid,
    DraftReminder,
    DraftDiscarded,
    MagicLinkRequested,
    PasswordResetRequested,
}

/// Renglón de la tabla outbox. `payload_json` transporta lo que el relay
/// necesita para despachar el efecto (destinatario, plantilla, datos) sin
/// que el relay tenga que releer el agregado original.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: OutboxEventId,
    pub kind: EventKind,
    pub claim_id: Option<ClaimId>,
    pub customer_id: Option<CustomerId>,
    pub payload_json: String,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub attempt_count: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OutboxEvent {
    pub fn is_pending(&self) -> bool {
        self.dispatched_at.is_none()
    }
}
