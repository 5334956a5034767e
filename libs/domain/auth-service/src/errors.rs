// [libs/domain/auth-service/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("[AUTH_INVALID_CREDENTIALS] invalid email or password")]
    InvalidCredentials,

    #[error("[AUTH_ACCOUNT_LOCKED] account temporarily locked")]
    AccountLocked,

    #[error("[AUTH_WEAK_PASSWORD] password does not meet strength requirements")]
    WeakPassword,

    #[error("[AUTH_DUPLICATE_EMAIL] an account with this email already exists")]
    DuplicateEmail,

    #[error("[AUTH_TOKEN_INVALID] token is invalid, expired, or already used")]
    TokenInvalid,

    #[error("[AUTH_RATE_LIMITED] too many attempts, try again later")]
    RateLimited,

    #[error("[AUTH_NOT_FOUND] account not found")]
    NotFound,

    #[error("[AUTH_HASH_FAULT] password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("[AUTH_JWT_FAULT] token signing/verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("[AUTH_STORE_FAULT] {0}")]
    Persistence(#[from] skyclaim_persistence::PersistenceError),

    #[error("[AUTH_VAULT_FAULT] {0}")]
    Vault(#[from] skyclaim_crypto_vault::VaultError),

    #[error("[AUTH_RATE_STORE_FAULT] {0}")]
    RateLimiterBackend(String),

    #[error("[AUTH_FIELD_FAULT] stored encrypted field is malformed: {0}")]
    FieldEncoding(String),
}
