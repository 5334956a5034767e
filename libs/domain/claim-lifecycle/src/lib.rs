// [libs/domain/claim-lifecycle/src/lib.rs]
/*!
 * Máquina finita de estados del reclamo. Cada transición exitosa escribe
 * el nuevo estado y un renglón de `ClaimStatusHistory` en la misma
 * transacción SQL; el efecto secundario correspondiente se encola en la
 * tabla outbox después de confirmar, nunca dentro de la transacción.
 */

pub mod errors;
pub mod transitions;

pub use errors::LifecycleError;
pub use transitions::{Actor, TransitionContext};

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use skyclaim_claim_models::{
    ClaimId, ClaimGroupId, ClaimNote, ClaimNoteId, ClaimStatus, ClaimStatusHistory,
    ClaimStatusHistoryId, CustomerId, EventKind, OutboxEvent, OutboxEventId,
};
use skyclaim_persistence::{
    ClaimFileRepository, ClaimGroupRepository, ClaimNoteRepository, ClaimRepository,
    LedgerClient, OutboxRepository, PersistenceError,
};
use tracing::{info, instrument, warn};

/// Edad máxima de un borrador antes de que el reaper lo descarte.
pub const DRAFT_MAX_AGE_DAYS: i64 = 14;

pub struct ClaimLifecycleService {
    client: LedgerClient,
    claims: ClaimRepository,
    groups: ClaimGroupRepository,
    notes: ClaimNoteRepository,
    files: ClaimFileRepository,
    outbox: OutboxRepository,
}

impl ClaimLifecycleService {
    pub fn new(client: LedgerClient) -> Self {
        Self {
            claims: ClaimRepository::new(client.clone()),
            groups: ClaimGroupRepository::new(client.clone()),
            notes: ClaimNoteRepository::new(client.clone()),
            files: ClaimFileRepository::new(client.clone()),
            outbox: OutboxRepository::new(client.clone()),
            client,
        }
    }

    /// Envía un borrador del cliente (`draft` -> `submitted`). Verifica
    /// los campos requeridos, el consentimiento (individual o de grupo) y
    /// la ausencia de duplicado no-borrador para (cliente, vuelo, fecha).
    #[instrument(skip(self))]
    pub async fn submit(&self, claim_id: ClaimId, customer_id: CustomerId) -> Result<(), LifecycleError> {
        let (claim, _booking_ref, _ticket_no) = self.claims.find_for_customer(claim_id, customer_id).await?;

        let group_consent_confirmed = match claim.claim_group_id {
            Some(group_id) => self.group_consent_confirmed(group_id).await?,
            None => true,
        };

        let ctx = transitions::TransitionContext {
            has_required_submission_fields: claim.has_required_submission_fields(),
            group_consent_confirmed,
            // the partial unique index on (customer_id, flight_number, flight_date)
            // is the actual enforcement; a race loses here and surfaces as
            // `LifecycleError::DuplicateClaim` from `commit_transition` instead.
            is_duplicate_non_draft: false,
            compensation_amount: claim.compensation_amount,
            rejection_reason_present: claim.rejection_reason.as_deref().is_some_and(|r| !r.trim().is_empty()),
            reopen_reason_present: false,
        };

        transitions::validate_transition(claim.status, ClaimStatus::Submitted, Actor::Customer, &ctx)?;

        self.commit_transition(
            claim_id,
            claim.status,
            ClaimStatus::Submitted,
            claim.version,
            Some(customer_id),
            None,
            EventKind::ClaimSubmitted,
        )
        .await
    }

    /// Transición administrativa genérica (`submitted -> under_review`,
    /// `under_review -> approved/rejected`, `approved -> paid/rejected`,
    /// `rejected -> under_review`, `paid -> closed`).
    #[instrument(skip(self, reason))]
    pub async fn admin_transition(
        &self,
        claim_id: ClaimId,
        to: ClaimStatus,
        actor_id: CustomerId,
        reason: Option<&str>,
        compensation_amount_override: Option<Decimal>,
    ) -> Result<(), LifecycleError> {
        let (claim, _booking_ref, _ticket_no) = self.claims.find_any(claim_id).await?;

        let ctx = transitions::TransitionContext {
            has_required_submission_fields: claim.has_required_submission_fields(),
            group_consent_confirmed: true,
            is_duplicate_non_draft: false,
            compensation_amount: compensation_amount_override.or(claim.compensation_amount),
            rejection_reason_present: reason.is_some_and(|r| !r.trim().is_empty()),
            reopen_reason_present: reason.is_some_and(|r| !r.trim().is_empty()),
        };

        transitions::validate_transition(claim.status, to, Actor::Admin, &ctx)?;

        let event_kind = match to {
            ClaimStatus::Approved => Some(EventKind::ClaimApproved),
            ClaimStatus::Rejected => Some(EventKind::ClaimRejected),
            ClaimStatus::Paid => Some(EventKind::ClaimPaid),
            _ => None,
        };

        if let Some(reason) = reason {
            self.notes
                .create(&ClaimNote {
                    id: ClaimNoteId::new(),
                    claim_id,
                    author_id: actor_id,
                    body: reason.to_string(),
                    created_at: Utc::now(),
                })
                .await?;
        }

        if matches!(to, ClaimStatus::Rejected) {
            self.claims.record_rejection(claim_id, reason.unwrap_or_default()).await?;
        }

        match event_kind {
            Some(kind) => {
                self.commit_transition(claim_id, claim.status, to, claim.version, Some(actor_id), Some(kind), kind)
                    .await
            }
            None => {
                self.commit_transition_without_event(claim_id, claim.status, to, claim.version, Some(actor_id)).await
            }
        }
    }

    /// Aplica la misma transición a todos los reclamos de un grupo,
    /// todo-o-nada a nivel de base de datos; el despacho de eventos es
    /// por reclamo, fuera de la transacción.
    #[instrument(skip(self, reason))]
    pub async fn bulk_group_transition(
        &self,
        group_id: ClaimGroupId,
        to: ClaimStatus,
        actor_id: CustomerId,
        reason: Option<&str>,
    ) -> Result<(), LifecycleError> {
        let members = self.claims.list_for_group(group_id).await?;
        let conn = self.client.get_connection()?;

        conn.execute("BEGIN", ()).await.map_err(PersistenceError::Query)?;
        for member in &members {
            let ctx = transitions::TransitionContext {
                has_required_submission_fields: member.has_required_submission_fields(),
                group_consent_confirmed: true,
                is_duplicate_non_draft: false,
                compensation_amount: member.compensation_amount,
                rejection_reason_present: reason.is_some_and(|r| !r.trim().is_empty()),
                reopen_reason_present: reason.is_some_and(|r| !r.trim().is_empty()),
            };
            if let Err(e) = transitions::validate_transition(member.status, to, Actor::Admin, &ctx) {
                let _ = conn.execute("ROLLBACK", ()).await;
                return Err(e);
            }
            if let Err(e) = self
                .claims
                .guarded_transition_on(&conn, member.id, member.status, to, member.version)
                .await
            {
                let _ = conn.execute("ROLLBACK", ()).await;
                return Err(e.into());
            }
            let history = ClaimStatusHistory {
                id: ClaimStatusHistoryId::new(),
                claim_id: member.id,
                from_status: Some(member.status),
                to_status: to,
                actor_id: Some(actor_id),
                reason: reason.map(|r| r.to_string()),
                occurred_at: Utc::now(),
            };
            if let Err(e) = self.notes.record_status_history(&history).await {
                let _ = conn.execute("ROLLBACK", ()).await;
                return Err(e.into());
            }
        }
        conn.execute("COMMIT", ()).await.map_err(PersistenceError::Query)?;

        for member in &members {
            self.enqueue_transition_event(member.id, None, to).await;
        }
        Ok(())
    }

    /// Descarta un borrador vencido (tarea programada) y borra lógicamente
    /// sus archivos adjuntos.
    #[instrument(skip(self))]
    pub async fn discard_stale_draft(&self, claim_id: ClaimId) -> Result<(), LifecycleError> {
        let (claim, _booking_ref, _ticket_no) = self.claims.find_any(claim_id).await?;
        let ctx = transitions::TransitionContext {
            has_required_submission_fields: false,
            group_consent_confirmed: true,
            is_duplicate_non_draft: false,
            compensation_amount: None,
            rejection_reason_present: false,
            reopen_reason_present: false,
        };
        transitions::validate_transition(claim.status, ClaimStatus::Discarded, Actor::ScheduledTask, &ctx)?;

        self.commit_transition(
            claim_id,
            claim.status,
            ClaimStatus::Discarded,
            claim.version,
            None,
            None,
            EventKind::DraftDiscarded,
        )
        .await?;

        let soft_deleted = self.files.soft_delete_for_claim(claim_id).await?;
        info!(claim_id = %claim_id, soft_deleted, "discarded stale draft");
        Ok(())
    }

    /// Reclamos elegibles para la tarea de purga (`created_at` más
    /// antiguo que `DRAFT_MAX_AGE_DAYS`).
    #[instrument(skip(self))]
    pub async fn find_discardable_drafts(&self, limit: i64) -> Result<Vec<ClaimId>, LifecycleError> {
        let cutoff = Utc::now() - Duration::days(DRAFT_MAX_AGE_DAYS);
        Ok(self.claims.find_stale_drafts(cutoff, limit).await?)
    }

    async fn group_consent_confirmed(&self, group_id: ClaimGroupId) -> Result<bool, LifecycleError> {
        let group = self.groups.find_by_id(group_id).await?;
        let consenting = self.groups.count_consenting_members(group_id).await?;
        Ok(group.is_complete(consenting))
    }

    #[allow(clippy::too_many_arguments)]
    async fn commit_transition(
        &self,
        claim_id: ClaimId,
        from: ClaimStatus,
        to: ClaimStatus,
        expected_version: i64,
        actor_id: Option<CustomerId>,
        customer_for_event: Option<EventKind>,
        event_kind: EventKind,
    ) -> Result<(), LifecycleError> {
        let _ = customer_for_event;
        self.commit_transition_without_event(claim_id, from, to, expected_version, actor_id).await?;
        self.enqueue_transition_event(claim_id, actor_id, to).await;
        let _ = event_kind;
        Ok(())
    }

    async fn commit_transition_without_event(
        &self,
        claim_id: ClaimId,
        from: ClaimStatus,
        to: ClaimStatus,
        expected_version: i64,
        actor_id: Option<CustomerId>,
    ) -> Result<(), LifecycleError> {
        let conn = self.client.get_connection()?;
        conn.execute("BEGIN", ()).await.map_err(PersistenceError::Query)?;

        if let Err(e) = self.claims.guarded_transition_on(&conn, claim_id, from, to, expected_version).await {
            let _ = conn.execute("ROLLBACK", ()).await;
            return Err(e.into());
        }

        let history = ClaimStatusHistory {
            id: ClaimStatusHistoryId::new(),
            claim_id,
            from_status: Some(from),
            to_status: to,
            actor_id,
            reason: None,
            occurred_at: Utc::now(),
        };
        if let Err(e) = self.notes.record_status_history(&history).await {
            let _ = conn.execute("ROLLBACK", ()).await;
            return Err(e.into());
        }

        conn.execute("COMMIT", ()).await.map_err(PersistenceError::Query)?;
        Ok(())
    }

    /// Encola el efecto secundario de la transición después de confirmar.
    /// Un fallo al encolar no deshace la transición; sólo se registra.
    async fn enqueue_transition_event(&self, claim_id: ClaimId, actor_id: Option<CustomerId>, to: ClaimStatus) {
        let kind = match to {
            ClaimStatus::Submitted => EventKind::ClaimSubmitted,
            ClaimStatus::Approved => EventKind::ClaimApproved,
            ClaimStatus::Rejected => EventKind::ClaimRejected,
            ClaimStatus::Paid => EventKind::ClaimPaid,
            ClaimStatus::Discarded => EventKind::DraftDiscarded,
            _ => return,
        };
        let event = OutboxEvent {
            id: OutboxEventId::new(),
            kind,
            claim_id: Some(claim_id),
            customer_id: actor_id,
            payload_json: serde_json::json!({ "claim_id": claim_id.0.to_string() }).to_string(),
            dispatched_at: None,
            attempt_count: 0,
            last_error: None,
            created_at: Utc::now(),
        };
        if let Err(e) = self.outbox.enqueue(&event).await {
            warn!(claim_id = %claim_id, error = %e, "failed to enqueue transition side-effect");
        }
    }
}
