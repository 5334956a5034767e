// [libs/infra/persistence/src/repositories/outbox_repository.rs]
use crate::errors::PersistenceError;
use crate::LedgerClient;
use libsql::{params, Row};
use skyclaim_claim_models::{ClaimId, CustomerId, EventKind, OutboxEvent, OutboxEventId};
use std::str::FromStr;
use tracing::instrument;

pub struct OutboxRepository {
    client: LedgerClient,
}

impl OutboxRepository {
    pub fn new(client: LedgerClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, event))]
    pub async fn enqueue(&self, event: &OutboxEvent) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "INSERT INTO outbox_events (id, kind, claim_id, customer_id, payload_json, attempt_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
            params![
                event.id.0.to_string(),
                event_kind_to_str(event.kind),
                event.claim_id.map(|c| c.0.to_string()),
                event.customer_id.map(|c| c.0.to_string()),
                event.payload_json.clone(),
                event.created_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    /// Trae un lote de eventos pendientes de despacho, ordenados por
    /// antigüedad. El relevo (`outbox_relay` en `apps/api`) es el único
    /// llamador; no hay bloqueo pesimista aquí porque el relevo corre en
    /// una sola instancia lógica por diseño.
    #[instrument(skip(self))]
    pub async fn fetch_pending_batch(&self, limit: u32) -> Result<Vec<OutboxEvent>, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT id, kind, claim_id, customer_id, payload_json, dispatched_at, attempt_count, last_error, created_at
                 FROM outbox_events WHERE dispatched_at IS NULL ORDER BY created_at ASC LIMIT ?1",
                params![limit as i64],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn mark_dispatched(&self, id: OutboxEventId) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "UPDATE outbox_events SET dispatched_at = ?2 WHERE id = ?1",
            params![id.0.to_string(), chrono::Utc::now().to_rfc3339()],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, error))]
    pub async fn mark_failed(&self, id: OutboxEventId, error: &str) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "UPDATE outbox_events SET attempt_count = attempt_count + 1, last_error = ?2 WHERE id = ?1",
            params![id.0.to_string(), error],
        )
        .await?;
        Ok(())
    }

    /// Inserta la llave de idempotencia del efecto secundario ya despachado.
    /// Una violación de UNIQUE significa que otro worker (o un reintento del
    /// mismo) ya completó este envío — se reporta como `AlreadySent` para
    /// que `task_worker` lo trate como éxito, no como error (Design Notes:
    /// reemplazo de reintentos basados en excepciones por decisiones
    /// explícitas).
    #[instrument(skip(self))]
    pub async fn claim_idempotency_key(
        &self,
        idempotency_key: &str,
        outbox_event_id: OutboxEventId,
    ) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        let result = conn
            .execute(
                "INSERT INTO sent_events (idempotency_key, outbox_event_id) VALUES (?1, ?2)",
                params![idempotency_key, outbox_event_id.0.to_string()],
            )
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE") => Err(PersistenceError::AlreadySent),
            Err(e) => Err(PersistenceError::Query(e)),
        }
    }
}

fn event_kind_to_str(kind: EventKind) -> &'static str {
    match kind {
        EventKind::ClaimSubmitted => "claim_submitted",
        EventKind::ClaimApproved => "claim_approved",
        EventKind::ClaimRejected => "claim_rejected",
        EventKind::ClaimPaid => "claim_paid",
        EventKind::DraftReminder => "draft_reminder",
        EventKind::DraftDiscarded => "draft_discarded",
        EventKind::MagicLinkRequested => "magic_link_requested",
        EventKind::PasswordResetRequested => "password_reset_requested",
    }
}

fn event_kind_from_str(s: &str) -> EventKind {
    match s {
        "claim_approved" => EventKind::ClaimApproved,
        "claim_rejected" => EventKind::ClaimRejected,
        "claim_paid" => EventKind::ClaimPaid,
        "draft_reminder" => EventKind::DraftReminder,
        "draft_discarded" => EventKind::DraftDiscarded,
        "magic_link_requested" => EventKind::MagicLinkRequested,
        "password_reset_requested" => EventKind::PasswordResetRequested,
        _ => EventKind::ClaimSubmitted,
    }
}

fn map_row(row: &Row) -> Result<OutboxEvent, PersistenceError> {
    Ok(OutboxEvent {
        id: OutboxEventId::from_str(&row.get::<String>(0)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        kind: event_kind_from_str(&row.get::<String>(1)?),
        claim_id: row
            .get::<Option<String>>(2)?
            .map(|s| ClaimId::from_str(&s))
            .transpose()
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        customer_id: row
            .get::<Option<String>>(3)?
            .map(|s| CustomerId::from_str(&s))
            .transpose()
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        payload_json: row.get(4)?,
        dispatched_at: row
            .get::<Option<String>>(5)?
            .map(|s| chrono::DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&chrono::Utc)))
            .transpose()
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        attempt_count: row.get::<i64>(6)? as u32,
        last_error: row.get(7)?,
        created_at: chrono::DateTime::parse_from_rfc3339(&row.get::<String>(8)?)
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?
            .with_timezone(&chrono::Utc),
    })
}
