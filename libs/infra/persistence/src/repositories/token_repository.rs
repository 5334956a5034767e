// [libs/infra/persistence/src/repositories/token_repository.rs]
use crate::errors::PersistenceError;
use crate::LedgerClient;
use chrono::{DateTime, Utc};
use libsql::{params, Row};
use skyclaim_claim_models::{
    CustomerId, MagicLinkToken, MagicLinkTokenId, PasswordResetToken, PasswordResetTokenId,
    RefreshToken, RefreshTokenId,
};
use std::str::FromStr;
use tracing::instrument;

pub struct TokenRepository {
    client: LedgerClient,
}

impl TokenRepository {
    pub fn new(client: LedgerClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, token))]
    pub async fn create_refresh_token(&self, token: &RefreshToken) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "INSERT INTO refresh_tokens (id, customer_id, token_digest, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                token.id.0.to_string(),
                token.customer_id.0.to_string(),
                token.token_digest.clone(),
                token.expires_at.to_rfc3339(),
                token.created_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_refresh_token_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<RefreshToken, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT id, customer_id, token_digest, replaced_by, revoked_at, expires_at, created_at
                 FROM refresh_tokens WHERE token_digest = ?1",
                params![token_digest],
            )
            .await?;
        let row = rows.next().await?.ok_or(PersistenceError::TokenNotUsable)?;
        map_refresh_row(&row)
    }

    /// Rota un refresh token atómicamente: marca el actual como reemplazado
    /// (`revoked_at` + `replaced_by`) sólo si todavía no había sido
    /// consumido, e inserta el sucesor. Una fila afectada de 0 significa que
    /// el token ya fue usado — posible reuso de un token robado — y se
    /// reporta como `TokenNotUsable` para que la capa de autenticación
    /// pueda decidir revocar toda la familia.
    #[instrument(skip(self, successor))]
    pub async fn rotate_refresh_token(
        &self,
        current_id: RefreshTokenId,
        successor: &RefreshToken,
    ) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        let affected = conn
            .execute(
                "UPDATE refresh_tokens SET revoked_at = ?2, replaced_by = ?3
                 WHERE id = ?1 AND revoked_at IS NULL",
                params![
                    current_id.0.to_string(),
                    Utc::now().to_rfc3339(),
                    successor.id.0.to_string(),
                ],
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::TokenNotUsable);
        }
        conn.execute(
            "INSERT INTO refresh_tokens (id, customer_id, token_digest, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                successor.id.0.to_string(),
                successor.customer_id.0.to_string(),
                successor.token_digest.clone(),
                successor.expires_at.to_rfc3339(),
                successor.created_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn revoke_refresh_token(&self, id: RefreshTokenId) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "UPDATE refresh_tokens SET revoked_at = ?2 WHERE id = ?1 AND revoked_at IS NULL",
            params![id.0.to_string(), Utc::now().to_rfc3339()],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn revoke_all_refresh_tokens_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "UPDATE refresh_tokens SET revoked_at = ?2 WHERE customer_id = ?1 AND revoked_at IS NULL",
            params![customer_id.0.to_string(), Utc::now().to_rfc3339()],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    pub async fn create_magic_link_token(&self, token: &MagicLinkToken) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "INSERT INTO magic_link_tokens (id, customer_id, token_digest, consumed_at, expires_at, created_at)
             VALUES (?1, ?2, ?3, NULL, ?4, ?5)",
            params![
                token.id.0.to_string(),
                token.customer_id.0.to_string(),
                token.token_digest.clone(),
                token.expires_at.to_rfc3339(),
                token.created_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    /// Consume un magic link de un solo uso. El `UPDATE` guardado contra
    /// `consumed_at IS NULL` es la única fuente de verdad sobre si el enlace
    /// ya fue usado — evita una condición de carrera entre verificar y
    /// marcar como consumido.
    #[instrument(skip(self))]
    pub async fn consume_magic_link_token(
        &self,
        token_digest: &str,
    ) -> Result<MagicLinkToken, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT id, customer_id, token_digest, consumed_at, expires_at, created_at
                 FROM magic_link_tokens WHERE token_digest = ?1",
                params![token_digest],
            )
            .await?;
        let row = rows.next().await?.ok_or(PersistenceError::TokenNotUsable)?;
        let token = map_magic_link_row(&row)?;

        let affected = conn
            .execute(
                "UPDATE magic_link_tokens SET consumed_at = ?2 WHERE id = ?1 AND consumed_at IS NULL",
                params![token.id.0.to_string(), Utc::now().to_rfc3339()],
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::TokenNotUsable);
        }
        Ok(token)
    }

    #[instrument(skip(self, token))]
    pub async fn create_password_reset_token(
        &self,
        token: &PasswordResetToken,
    ) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "INSERT INTO password_reset_tokens (id, customer_id, token_digest, consumed_at, expires_at, created_at)
             VALUES (?1, ?2, ?3, NULL, ?4, ?5)",
            params![
                token.id.0.to_string(),
                token.customer_id.0.to_string(),
                token.token_digest.clone(),
                token.expires_at.to_rfc3339(),
                token.created_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn consume_password_reset_token(
        &self,
        token_digest: &str,
    ) -> Result<PasswordResetToken, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT id, customer_id, token_digest, consumed_at, expires_at, created_at
                 FROM password_reset_tokens WHERE token_digest = ?1",
                params![token_digest],
            )
            .await?;
        let row = rows.next().await?.ok_or(PersistenceError::TokenNotUsable)?;
        let token = map_password_reset_row(&row)?;

        let affected = conn
            .execute(
                "UPDATE password_reset_tokens SET consumed_at = ?2 WHERE id = ?1 AND consumed_at IS NULL",
                params![token.id.0.to_string(), Utc::now().to_rfc3339()],
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::TokenNotUsable);
        }
        Ok(token)
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

fn map_refresh_row(row: &Row) -> Result<RefreshToken, PersistenceError> {
    Ok(RefreshToken {
        id: RefreshTokenId::from_str(&row.get::<String>(0)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        customer_id: CustomerId::from_str(&row.get::<String>(1)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        token_digest: row.get(2)?,
        replaced_by: row
            .get::<Option<String>>(3)?
            .map(|s| RefreshTokenId::from_str(&s))
            .transpose()
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        revoked_at: parse_opt_dt(row.get(4)?)?,
        expires_at: parse_dt(&row.get::<String>(5)?)?,
        created_at: parse_dt(&row.get::<String>(6)?)?,
    })
}

fn map_magic_link_row(row: &Row) -> Result<MagicLinkToken, PersistenceError> {
    Ok(MagicLinkToken {
        id: MagicLinkTokenId::from_str(&row.get::<String>(0)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        customer_id: CustomerId::from_str(&row.get::<String>(1)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        token_digest: row.get(2)?,
        consumed_at: parse_opt_dt(row.get(3)?)?,
        expires_at: parse_dt(&row.get::<String>(4)?)?,
        created_at: parse_dt(&row.get::<String>(5)?)?,
    })
}

fn map_password_reset_row(row: &Row) -> Result<PasswordResetToken, PersistenceError> {
    Ok(PasswordResetToken {
        id: PasswordResetTokenId::from_str(&row.get::<String>(0)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        customer_id: CustomerId::from_str(&row.get::<String>(1)?).map_err(|e| PersistenceError::Mapping(e.to_string()))?,
        token_digest: row.get(2)?,
        consumed_at: parse_opt_dt(row.get(3)?)?,
        expires_at: parse_dt(&row.get::<String>(4)?)?,
        created_at: parse_dt(&row.get::<String>(5)?)?,
    })
}
