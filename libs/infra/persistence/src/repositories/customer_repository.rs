// [libs/infra/persistence/src/repositories/customer_repository.rs]
use crate::errors::PersistenceError;
use crate::LedgerClient;
use chrono::{DateTime, Utc};
use libsql::{params, Row};
use skyclaim_claim_models::{Address, Customer, CustomerId, Role};
use std::str::FromStr;
use tracing::instrument;

pub struct CustomerRepository {
    client: LedgerClient,
}

impl CustomerRepository {
    pub fn new(client: LedgerClient) -> Self {
        Self { client }
    }

    /// Inserta un nuevo cliente. `email_blind_index` debe haber sido
    /// derivado con `skyclaim-crypto-vault::blind_index` sobre el correo
    /// normalizado antes de llegar aquí; el repositorio no normaliza ni
    /// cifra, sólo persiste.
    #[instrument(skip(self, customer, email_encrypted, password_hash))]
    pub async fn create(
        &self,
        customer: &Customer,
        email_blind_index: &str,
        email_encrypted: &str,
        password_hash: &str,
    ) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        let rows = conn
            .execute(
                "INSERT INTO customers (
                    id, email_blind_index, email_encrypted, password_hash, role,
                    email_verified, failed_login_count, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    customer.id.0.to_string(),
                    email_blind_index,
                    email_encrypted,
                    password_hash,
                    role_to_str(customer.role),
                    customer.email_verified as i64,
                    customer.failed_login_count as i64,
                    customer.created_at.to_rfc3339(),
                    customer.updated_at.to_rfc3339(),
                ],
            )
            .await;
        match rows {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE") => Err(PersistenceError::DuplicateEmail),
            Err(e) => Err(PersistenceError::Query(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn find_by_blind_index(
        &self,
        email_blind_index: &str,
    ) -> Result<Option<(Customer, String, String)>, PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT id, email_encrypted, password_hash, role, email_verified,
                        failed_login_count, locked_until, last_login_at, created_at, updated_at
                 FROM customers WHERE email_blind_index = ?1",
                params![email_blind_index],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_row(&row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: CustomerId) -> Result<(Customer, String, String), PersistenceError> {
        let conn = self.client.get_connection()?;
        let mut rows = conn
            .query(
                "SELECT id, email_encrypted, password_hash, role, email_verified,
                        failed_login_count, locked_until, last_login_at, created_at, updated_at
                 FROM customers WHERE id = ?1",
                params![id.0.to_string()],
            )
            .await?;
        let row = rows.next().await?.ok_or(PersistenceError::CustomerNotFound)?;
        map_row(&row)
    }

    #[instrument(skip(self))]
    pub async fn record_successful_login(&self, id: CustomerId, at: DateTime<Utc>) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "UPDATE customers SET failed_login_count = 0, locked_until = NULL, last_login_at = ?2, updated_at = ?2 WHERE id = ?1",
            params![id.0.to_string(), at.to_rfc3339()],
        )
        .await?;
        Ok(())
    }

    /// Incrementa el contador de fallos y, si supera el umbral, fija
    /// `locked_until`. El backoff exponencial se calcula en
    /// `skyclaim-auth-service`, no aquí.
    #[instrument(skip(self))]
    pub async fn record_failed_login(
        &self,
        id: CustomerId,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<u32, PersistenceError> {
        let conn = self.client.get_connection()?;
        conn.execute(
            "UPDATE customers SET failed_login_count = failed_login_count + 1, locked_until = ?2 WHERE id = ?1",
            params![id.0.to_string(), locked_until.map(|t| t.to_rfc3339())],
        )
        .await?;
        let mut rows = conn
            .query("SELECT failed_login_count FROM customers WHERE id = ?1", params![id.0.to_string()])
            .await?;
        let row = rows.next().await?.ok_or(PersistenceError::CustomerNotFound)?;
        Ok(row.get::<i64>(0)? as u32)
    }

    #[instrument(skip(self))]
    pub async fn mark_email_verified(&self, id: CustomerId) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        let affected = conn
            .execute(
                "UPDATE customers SET email_verified = 1, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![id.0.to_string()],
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::CustomerNotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, password_hash))]
    pub async fn update_password_hash(&self, id: CustomerId, password_hash: &str) -> Result<(), PersistenceError> {
        let conn = self.client.get_connection()?;
        let affected = conn
            .execute(
                "UPDATE customers SET password_hash = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![id.0.to_string(), password_hash],
            )
            .await?;
        if affected == 0 {
            return Err(PersistenceError::CustomerNotFound);
        }
        Ok(())
    }
}

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::Customer => "customer",
        Role::Admin => "admin",
        Role::Superadmin => "superadmin",
    }
}

fn role_from_str(s: &str) -> Role {
    match s {
        "admin" => Role::Admin,
        "superadmin" => Role::Superadmin,
        _ => Role::Customer,
    }
}

fn map_row(row: &Row) -> Result<(Customer, String, String), PersistenceError> {
    let id_str: String = row.get(0)?;
    let id = CustomerId::from_str(&id_str).map_err(|e| PersistenceError::Mapping(e.to_string()))?;
    let email_encrypted: String = row.get(1)?;
    let password_hash: String = row.get(2)?;
    let role_str: String = row.get(3)?;
    let email_verified: i64 = row.get(4)?;
    let failed_login_count: i64 = row.get(5)?;
    let locked_until: Option<String> = row.get(6)?;
    let last_login_at: Option<String> = row.get(7)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    let customer = Customer {
        id,
        email: String::new(),
        password_hash: password_hash.clone(),
        first_name: None,
        last_name: None,
        phone: None,
        address: Address::default(),
        role: role_from_str(&role_str),
        email_verified: email_verified != 0,
        failed_login_count: failed_login_count as u32,
        locked_until: locked_until.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()).map(|d| d.with_timezone(&Utc)),
        last_login_at: last_login_at.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()).map(|d| d.with_timezone(&Utc)),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?
            .with_timezone(&Utc),
        updated_at: DateTime::parse_from_rfc3339(&updated_at)
            .map_err(|e| PersistenceError::Mapping(e.to_string()))?
            .with_timezone(&Utc),
    };

    Ok((customer, email_encrypted, password_hash))
}
