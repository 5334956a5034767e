// [libs/domain/claim-models/src/token.rs]
use crate::{CustomerId, MagicLinkTokenId, PasswordResetTokenId, RefreshTokenId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token de refresco de sesión. Sólo el digesto SHA-256 del secreto se
/// persiste; el secreto en claro se entrega al cliente una única vez y
/// nunca se recupera.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: RefreshTokenId,
    pub customer_id: CustomerId,
    pub token_digest: String,
    /// Encadena rotaciones: el token que reemplazó a este, si alguno.
    pub replaced_by: Option<RefreshTokenId>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

/// Enlace mágico de un solo uso para inicio de sesión sin contraseña.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagicLinkToken {
    pub id: MagicLinkTokenId,
    pub customer_id: CustomerId,
    pub token_digest: String,
    pub consumed_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl MagicLinkToken {
    /// Sin período de gracia: un enlace consumido es inválido de
    /// inmediato, sin importar cuánto falte para su expiración
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.consumed_at.is_none() && self.expires_at > now
    }
}

/// Token de restablecimiento de contraseña, también de un solo uso.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetToken {
    pub id: PasswordResetTokenId,
    pub customer_id: CustomerId,
    pub token_digest: String,
    pub consumed_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.consumed_at.is_none() && self.expires_at > now
    }
}
