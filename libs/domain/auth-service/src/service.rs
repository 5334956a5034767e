// [libs/domain/auth-service/src/service.rs]
/*!
 * Orquesta registro, login, rotación de refresh tokens, magic link y
 * reinicio de contraseña, apoyándose en `skyclaim-persistence` para el
 * almacenamiento y en `skyclaim-crypto-vault` para cifrado de campo e
 * índice ciego. Esta capa nunca toca SQL directamente.
 */

use crate::errors::AuthError;
use crate::jwt::JwtCodec;
use crate::lockout::lockout_duration_for;
use crate::password::{hash_password, meets_strength_policy, verify_password};
use crate::rate_limit::RateLimiter;
use crate::tokens::{digest_of, generate_opaque_token};
use chrono::{Duration, Utc};
use skyclaim_claim_models::{
    Address, Customer, CustomerId, MagicLinkToken, MagicLinkTokenId, PasswordResetToken,
    PasswordResetTokenId, RefreshToken, RefreshTokenId, Role,
};
use skyclaim_crypto_vault::{blind_index, decrypt_field, encrypt_field, EncryptedField, EncryptionKey};
use skyclaim_persistence::{CustomerRepository, PersistenceError, TokenRepository};
use std::sync::Arc;
use tracing::{info, instrument, warn};

const MAGIC_LINK_TTL_HOURS: i64 = 48;
const PASSWORD_RESET_TTL_HOURS: i64 = 1;
const REFRESH_TOKEN_TTL_DAYS: i64 = 30;

pub struct IssuedSession {
    pub access_token: String,
    pub refresh_token_plaintext: String,
    pub customer: Customer,
}

pub struct AuthService {
    customers: CustomerRepository,
    tokens: TokenRepository,
    encryption_key: EncryptionKey,
    jwt: JwtCodec,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AuthService {
    pub fn new(
        customers: CustomerRepository,
        tokens: TokenRepository,
        encryption_key: EncryptionKey,
        jwt: JwtCodec,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            customers,
            tokens,
            encryption_key,
            jwt,
            rate_limiter,
        }
    }

    #[instrument(skip(self, plaintext_password))]
    pub async fn register(&self, email: &str, plaintext_password: &str) -> Result<Customer, AuthError> {
        if !meets_strength_policy(plaintext_password) {
            return Err(AuthError::WeakPassword);
        }
        let normalized_email = Customer::normalize_email(email);
        let blind = blind_index(&self.encryption_key, &normalized_email);
        let encrypted = encrypt_field(&self.encryption_key, &normalized_email)?;
        let password_hash = hash_password(plaintext_password)?;

        let customer = Customer {
            id: CustomerId::new(),
            email: normalized_email,
            password_hash: password_hash.clone(),
            first_name: None,
            last_name: None,
            phone: None,
            address: Address::default(),
            role: Role::Customer,
            email_verified: false,
            failed_login_count: 0,
            locked_until: None,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        match self
            .customers
            .create(&customer, &blind, &serialize_field(&encrypted), &password_hash)
            .await
        {
            Ok(()) => Ok(customer),
            Err(PersistenceError::DuplicateEmail) => Err(AuthError::DuplicateEmail),
            Err(other) => Err(other.into()),
        }
    }

    /// Login paso a paso: lookup, chequeo de bloqueo, verificación de
    /// contraseña siempre ejecutada (incluso cuando la cuenta no existe),
    /// actualización del contador de fallos con el enfriamiento
    /// exponencial, y emisión de tokens en éxito.
    #[instrument(skip(self, plaintext_password))]
    pub async fn login(
        &self,
        email: &str,
        plaintext_password: &str,
        client_ip: &str,
    ) -> Result<IssuedSession, AuthError> {
        let normalized_email = Customer::normalize_email(email);

        if !self
            .rate_limiter
            .check_and_increment(&format!("login:ip:{client_ip}"), 5, Duration::minutes(1))
            .await
        {
            return Err(AuthError::RateLimited);
        }
        if !self
            .rate_limiter
            .check_and_increment(&format!("login:email:{normalized_email}"), 20, Duration::hours(1))
            .await
        {
            return Err(AuthError::RateLimited);
        }

        let blind = blind_index(&self.encryption_key, &normalized_email);
        let found = self.customers.find_by_blind_index(&blind).await?;

        let now = Utc::now();
        match found {
            Some((customer, _email_encrypted, password_hash)) => {
                if customer.is_locked(now) {
                    return Err(AuthError::AccountLocked);
                }
                let matches = verify_password(plaintext_password, Some(&password_hash))?;
                if !matches {
                    self.register_failed_attempt(&customer).await?;
                    return Err(AuthError::InvalidCredentials);
                }
                self.customers.record_successful_login(customer.id, now).await?;
                self.issue_session(customer).await
            }
            None => {
                // Se ejecuta bcrypt igual que en la rama de éxito para no
                // filtrar existencia por tiempo de respuesta.
                let _ = verify_password(plaintext_password, None)?;
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    async fn register_failed_attempt(&self, customer: &Customer) -> Result<(), AuthError> {
        let new_count = customer.failed_login_count + 1;
        let cooldown = lockout_duration_for(new_count);
        let locked_until = if cooldown > Duration::zero() {
            Some(Utc::now() + cooldown)
        } else {
            None
        };
        self.customers.record_failed_login(customer.id, locked_until).await?;
        if locked_until.is_some() {
            warn!(customer_id = %customer.id, new_count, "account locked after repeated login failures");
        }
        Ok(())
    }

    async fn issue_session(&self, customer: Customer) -> Result<IssuedSession, AuthError> {
        let access_token = self.jwt.issue_access_token(customer.id, customer.role)?;
        let opaque = generate_opaque_token();
        let refresh = RefreshToken {
            id: RefreshTokenId::new(),
            customer_id: customer.id,
            token_digest: opaque.digest_hex,
            replaced_by: None,
            revoked_at: None,
            expires_at: Utc::now() + Duration::days(REFRESH_TOKEN_TTL_DAYS),
            created_at: Utc::now(),
        };
        self.tokens.create_refresh_token(&refresh).await?;
        Ok(IssuedSession {
            access_token,
            refresh_token_plaintext: opaque.plaintext_hex,
            customer,
        })
    }

    /// Rota un refresh token: revoca el actual sólo si aún no había sido
    /// consumido e inserta el sucesor, todo dentro de una única operación
    /// atómica en el repositorio.
    #[instrument(skip(self, refresh_token_plaintext))]
    pub async fn refresh(&self, refresh_token_plaintext: &str) -> Result<IssuedSession, AuthError> {
        let digest = digest_of(refresh_token_plaintext);
        let current = self
            .tokens
            .find_refresh_token_by_digest(&digest)
            .await
            .map_err(|_| AuthError::TokenInvalid)?;

        let now = Utc::now();
        if current.revoked_at.is_some() || current.expires_at <= now {
            return Err(AuthError::TokenInvalid);
        }

        let (customer, _email_encrypted, _password_hash) = self.customers.find_by_id(current.customer_id).await?;
        let access_token = self.jwt.issue_access_token(customer.id, customer.role)?;
        let opaque = generate_opaque_token();
        let successor = RefreshToken {
            id: RefreshTokenId::new(),
            customer_id: customer.id,
            token_digest: opaque.digest_hex,
            replaced_by: None,
            revoked_at: None,
            expires_at: now + Duration::days(REFRESH_TOKEN_TTL_DAYS),
            created_at: now,
        };

        match self.tokens.rotate_refresh_token(current.id, &successor).await {
            Ok(()) => Ok(IssuedSession {
                access_token,
                refresh_token_plaintext: opaque.plaintext_hex,
                customer,
            }),
            Err(PersistenceError::TokenNotUsable) => {
                // El token ya había sido consumido por otra petición: señal
                // de posible robo. Revocamos toda la familia del cliente.
                self.tokens.revoke_all_refresh_tokens_for_customer(customer.id).await?;
                Err(AuthError::TokenInvalid)
            }
            Err(other) => Err(other.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn logout(&self, refresh_token_plaintext: &str) -> Result<(), AuthError> {
        let digest = digest_of(refresh_token_plaintext);
        if let Ok(token) = self.tokens.find_refresh_token_by_digest(&digest).await {
            self.tokens.revoke_refresh_token(token.id).await?;
        }
        Ok(())
    }

    /// Siempre responde con éxito lógico (el llamador en `apps/api` siempre
    /// devuelve 202) para no permitir enumeración de cuentas por correo.
    #[instrument(skip(self))]
    pub async fn request_magic_link(&self, email: &str, client_ip: &str) -> Result<Option<String>, AuthError> {
        let normalized_email = Customer::normalize_email(email);

        if !self
            .rate_limiter
            .check_and_increment(&format!("magic_link:email:{normalized_email}"), 3, Duration::hours(1))
            .await
            || !self
                .rate_limiter
                .check_and_increment(&format!("magic_link:ip:{client_ip}"), 3, Duration::hours(1))
                .await
        {
            return Ok(None);
        }

        let blind = blind_index(&self.encryption_key, &normalized_email);
        let Some((customer, _, _)) = self.customers.find_by_blind_index(&blind).await? else {
            return Ok(None);
        };

        let opaque = generate_opaque_token();
        let token = MagicLinkToken {
            id: MagicLinkTokenId::new(),
            customer_id: customer.id,
            token_digest: opaque.digest_hex,
            consumed_at: None,
            expires_at: Utc::now() + Duration::hours(MAGIC_LINK_TTL_HOURS),
            created_at: Utc::now(),
        };
        self.tokens.create_magic_link_token(&token).await?;
        info!(customer_id = %customer.id, "magic link issued");
        Ok(Some(opaque.plaintext_hex))
    }

    #[instrument(skip(self))]
    pub async fn verify_magic_link(&self, token_plaintext: &str) -> Result<IssuedSession, AuthError> {
        let digest = digest_of(token_plaintext);
        let token = self
            .tokens
            .consume_magic_link_token(&digest)
            .await
            .map_err(|_| AuthError::TokenInvalid)?;
        if token.expires_at <= Utc::now() {
            return Err(AuthError::TokenInvalid);
        }
        let (customer, _, _) = self.customers.find_by_id(token.customer_id).await?;
        self.issue_session(customer).await
    }

    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<Option<String>, AuthError> {
        let normalized_email = Customer::normalize_email(email);

        if !self
            .rate_limiter
            .check_and_increment(&format!("pw_reset:email:{normalized_email}"), 3, Duration::hours(1))
            .await
        {
            return Ok(None);
        }

        let blind = blind_index(&self.encryption_key, &normalized_email);
        let Some((customer, _, _)) = self.customers.find_by_blind_index(&blind).await? else {
            return Ok(None);
        };

        let opaque = generate_opaque_token();
        let token = PasswordResetToken {
            id: PasswordResetTokenId::new(),
            customer_id: customer.id,
            token_digest: opaque.digest_hex,
            consumed_at: None,
            expires_at: Utc::now() + Duration::hours(PASSWORD_RESET_TTL_HOURS),
            created_at: Utc::now(),
        };
        self.tokens.create_password_reset_token(&token).await?;
        Ok(Some(opaque.plaintext_hex))
    }

    #[instrument(skip(self, token_plaintext, new_password))]
    pub async fn confirm_password_reset(
        &self,
        token_plaintext: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if !meets_strength_policy(new_password) {
            return Err(AuthError::WeakPassword);
        }
        let digest = digest_of(token_plaintext);
        let token = self
            .tokens
            .consume_password_reset_token(&digest)
            .await
            .map_err(|_| AuthError::TokenInvalid)?;
        if token.expires_at <= Utc::now() {
            return Err(AuthError::TokenInvalid);
        }
        let new_hash = hash_password(new_password)?;
        self.customers.update_password_hash(token.customer_id, &new_hash).await?;
        self.tokens.revoke_all_refresh_tokens_for_customer(token.customer_id).await?;
        Ok(())
    }

    /// Descifra el correo de un cliente recuperado de la capa de
    /// persistencia; la capa de persistencia nunca toca claves de cifrado.
    pub fn decrypt_email(&self, email_encrypted: &str) -> Result<String, AuthError> {
        let field: EncryptedField = deserialize_field(email_encrypted)?;
        Ok(decrypt_field(&self.encryption_key, &field)?)
    }
}

fn serialize_field(field: &EncryptedField) -> String {
    serde_json::to_string(field).expect("EncryptedField serialization is infallible")
}

fn deserialize_field(stored: &str) -> Result<EncryptedField, AuthError> {
    serde_json::from_str(stored).map_err(|e| AuthError::FieldEncoding(e.to_string()))
}
