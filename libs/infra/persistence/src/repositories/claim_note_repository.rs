// [libs/infra/persistence/src/repositories/claim_note_repository.rs]
use crate::errors::PersistenceError;
use crate::LedgerClient;
use libsql::{params, Row};
use skyclaim_claim_models::{ClaimId, ClaimNote, ClaimNoteId, ClaimStatus, ClaimStatusHistory, CustomerId};
use std::str::FromStr;
use tracing::instrument;

pub struct ClaimNoteRepository {
    client: LedgerClient,
}

impl ClaimNoteRepository {
    pub fn new(client: LedgerClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, note))]
    pub async fn create(&self, note: &ClaimNote) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "INSERT INTO claim_notes (id, claim_id, author_id, body, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                note.id.0.to_string(),
                note.claim_id.0.to_string(),
                note.author_id.0.to_string(),
                note.body.clone(),
                note.created_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_for_claim(&self, claim_id: ClaimId) -> Result<Vec<ClaimNote>, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT id, claim_id, author_id, body, created_at FROM claim_notes
                 WHERE claim_id = ?1 ORDER BY created_at ASC",
                params![claim_id.0.to_string()],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(map_note_row(&row)?);
        }
        Ok(out)
    }

    #[instrument(skip(self, entry))]
    pub async fn record_status_history(&self, entry: &ClaimStatusHistory) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "INSERT INTO claim_status_history (id, claim_id, from_status, to_status, actor_id, reason, occurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.id.0.to_string(),
                entry.claim_id.0.to_string(),
                entry.from_status.map(status_to_str),
                status_to_str(entry.to_status),
                entry.actor_id.map(|a| a.0.to_string()),
                entry.reason.clone(),
                entry.occurred_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_status_history(&self, claim_id: ClaimId) -> Result<Vec<ClaimStatusHistory>, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT id, claim_id, from_status, to_status, actor_id, reason, occurred_at
                 FROM claim_status_history WHERE claim_id = ?1 ORDER BY occurred_at ASC",
                params![claim_id.0.to_string()],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(map_history_row(&row)?);
        }
        Ok(out)
    }
}

fn status_to_str(s: ClaimStatus) -> &'static str {
    match s {
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

fn status_from_str(s: &str) -> ClaimStatus {
    match s {
        "submitted" => ClaimStatus::Submitted,
        "under_review" => ClaimStatus::UnderReview,
        "approved" => ClaimStatus::Approved,
        "rejected" => ClaimStatus::Rejected,
        "paid" => ClaimStatus::Paid,
        "closed" => ClaimStatus::Closed,
        "discarded" => ClaimStatus::Discarded,
        _ => ClaimStatus::Draft,
    }
}

fn map_note_row(row: &Row) -> Result<ClaimNote, PersistenceError> {
    Ok(ClaimNote {
        id: ClaimNoteId::from_str(&row.get::<String>(0)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        claim_id: ClaimId::from_str(&row.get::<String>(1)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        author_id: CustomerId::from_str(&row.get::<String>(2)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        body: row.get(3)?,
        created_at: chrono::DateTime::parse_from_rfc3339(&row.get::<String>(4)?)
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?
            .with_timezone(&chrono::Utc),
    })
}

fn map_history_row(row: &Row) -> Result<ClaimStatusHistory, PersistenceError> {
    Ok(ClaimStatusHistory {
        id: skyclaim_claim_models::ClaimStatusHistoryId::from_str(&row.get::<String>(0)?)
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        claim_id: ClaimId::from_str(&row.get::<String>(1)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        from_status: row.get::<Option<String>>(2)?.map(|s| status_from_str(&s)),
        to_status: status_from_str(&row.get::<String>(3)?),
        actor_id: row
            .get::<Option<String>>(4)?
            .map(|s| CustomerId::from_str(&s))
            .transpose()
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        reason: row.get(5)?,
        occurred_at: chrono::DateTime::parse_from_rfc3339(&row.get::<String>(6)?)
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?
            .with_timezone(&chrono::Utc),
    })
}
