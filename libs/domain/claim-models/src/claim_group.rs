// [libs/domain/claim-models/src/claim_group.rs]
use crate::{ClaimGroupId, CustomerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Agrupa varios reclamos presentados conjuntamente por los pasajeros de
/// un mismo vuelo. Un
/// grupo sólo transiciona como unidad: el envío conjunto requiere que
/// todos los miembros hayan otorgado consentimiento individual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimGroup {
    pub id: ClaimGroupId,
    pub primary_customer_id: CustomerId,
    pub flight_number: String,
    pub flight_date: chrono::NaiveDate,
    /// Cantidad de pasajeros esperados en el grupo; usado para decidir si
    /// el consentimiento colectivo está completo antes de permitir el
    /// envío conjunto.
    pub expected_member_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClaimGroup {
    /// El grupo está listo para envío conjunto sólo si cada reclamo
    /// miembro superó `Claim::has_required_submission_fields`; esa
    /// verificación cruzada vive en `skyclaim-claim-lifecycle` porque
    /// requiere cargar los reclamos miembro, no este tipo aislado.
    pub fn is_complete(&self, consenting_member_count: u32) -> bool {
        consenting_member_count >= self.expected_member_count
    }
}
