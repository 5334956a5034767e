// [libs/domain/claim-models/src/customer.rs]
use crate::CustomerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nivel de autoridad de un principal autenticado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Admin,
    Superadmin,
}

/// Dirección postal explícita. Reemplaza el antiguo patrón de "propiedad
/// computada" sobre una fila de ORM: cada campo existe o no existe, nunca
/// se infiere por presencia de atributo en tiempo de ejecución.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Principal autenticante y dueño de reclamos.
///
/// `email`, `first_name`, `last_name`, `phone` y los campos de `address`
/// son almacenados cifrados por el repositorio (ver `skyclaim-crypto-vault`);
/// este tipo transporta el texto plano ya descifrado una vez fuera de la
/// capa de persistencia.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Address,
    pub role: Role,
    pub email_verified: bool,
    pub failed_login_count: u32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Normaliza un correo según la regla de unicidad del dominio:
    /// minúsculas y sin espacios periféricos. Usado tanto al registrar
    /// como al derivar el índice ciego de búsqueda por igualdad.
    pub fn normalize_email(raw_email: &str) -> String {
        raw_email.trim().to_lowercase()
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.map(|until| until > now).unwrap_or(false)
    }

    pub fn can_review_claims(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Superadmin)
    }
}
