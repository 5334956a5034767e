// [libs/infra/persistence/src/repositories/claim_group_repository.rs]
use crate::errors::PersistenceError;
use crate::LedgerClient;
use libsql::{params, Row};
use skyclaim_claim_models::{ClaimGroup, ClaimGroupId, CustomerId};
use std::str::FromStr;
use tracing::instrument;

pub struct ClaimGroupRepository {
    client: LedgerClient,
}

impl ClaimGroupRepository {
    pub fn new(client: LedgerClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, group))]
    pub async fn create(&self, group: &ClaimGroup) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "INSERT INTO claim_groups (id, primary_customer_id, flight_number, flight_date, expected_member_count, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                group.id.0.to_string(),
                group.primary_customer_id.0.to_string(),
                group.flight_number.clone(),
                group.flight_date.to_string(),
                group.expected_member_count as i64,
                group.created_at.to_rfc3339(),
                group.updated_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: ClaimGroupId) -> Result<ClaimGroup, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT id, primary_customer_id, flight_number, flight_date, expected_member_count, created_at, updated_at
                 FROM claim_groups WHERE id = ?1",
                params![id.0.to_string()],
            )
            .await?;
        let row = rows.next().await?.ok_or(PersistenceError::ClaimGroupNotFound)?;
        map_row(&row)
    }

    /// Cuenta cuántos reclamos del grupo tienen ambos consentimientos
    /// otorgados; usado por `skyclaim-claim-lifecycle` para decidir si el
    /// envío conjunto puede proceder.
    #[instrument(skip(self))]
    pub async fn count_consenting_members(&self, group_id: ClaimGroupId) -> Result<u32, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM claims
                 WHERE claim_group_id = ?1 AND terms_consent_at IS NOT NULL AND privacy_consent_at IS NOT NULL",
                params![group_id.0.to_string()],
            )
            .await?;
        let row = rows.next().await?.ok_or(PersistenceError::ClaimGroupNotFound)?;
        Ok(row.get::<i64>(0)? as u32)
    }
}

fn map_row(row: &Row) -> Result<ClaimGroup, PersistenceError> {
    let id_str: String = row.get(0)?;
    let primary_customer_id_str: String = row.get(1)?;
    Ok(ClaimGroup {
        id: ClaimGroupId::from_str(&id_str).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        primary_customer_id: CustomerId::from_str(&primary_customer_id_str)
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        flight_number: row.get(2)?,
        flight_date: chrono::NaiveDate::from_str(&row.get::<String>(3)?)
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        expected_member_count: row.get::<i64>(4)? as u32,
        created_at: chrono::DateTime::parse_from_rfc3339(&row.get::<String>(5)?)
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?
            .with_timezone(&chrono::Utc),
        updated_at: chrono::DateTime::parse_from_rfc3339(&row.get::<String>(6)?)
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?
            .with_timezone(&chrono::Utc),
    })
}
