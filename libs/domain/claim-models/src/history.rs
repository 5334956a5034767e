// [libs/domain/claim-models/src/history.rs]
use crate::{ClaimId, ClaimNoteId, ClaimStatus, ClaimStatusHistoryId, CustomerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Renglón append-only del rastro de auditoría de transiciones de estado
/// de un reclamo. Nunca se actualiza ni se borra.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimStatusHistory {
    pub id: ClaimStatusHistoryId,
    pub claim_id: ClaimId,
    pub from_status: Option<ClaimStatus>,
    pub to_status: ClaimStatus,
    pub actor_id: Option<CustomerId>,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Nota interna de revisión adjunta a un reclamo, visible sólo para
/// personal con `Role::Admin` o superior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimNote {
    pub id: ClaimNoteId,
    pub claim_id: ClaimId,
    pub author_id: CustomerId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
