// [libs/infra/persistence/src/errors.rs]
use thiserror::Error;

/// Catálogo de fallos de la capa de persistencia. Los tags entre
/// corchetes son estables y se propagan hasta `apps/api::errors` como
/// código de máquina; el texto libre nunca alcanza el cliente.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("[L3_DB_NET_FAULT] connection failed: {0}")]
    Connection(String),

    #[error("[L3_DB_CONFIG_FAULT] {0}")]
    Configuration(String),

    #[error("[L3_DB_QUERY_FAULT] {0}")]
    Query(#[from] libsql::Error),

    #[error("[L3_DB_MAPPING_FAULT] {0}")]
    Mapping(String),

    #[error("[L3_CLAIM_FAULT] claim not found")]
    ClaimNotFound,

    #[error("[L3_CLAIM_FAULT] claim is owned by a different customer or does not exist")]
    OwnershipConflict,

    #[error("[L3_CLAIM_FAULT] claim is not in a state that permits this operation")]
    InvalidState,

    #[error("[L3_CLAIM_FAULT] optimistic concurrency conflict: claim was modified concurrently")]
    VersionConflict,

    #[error("[L3_CLAIM_FAULT] a non-draft claim already exists for this customer, flight and date")]
    DuplicateClaim,

    #[error("[L3_DB_FAULT] transaction failed to commit")]
    TransactionFailed,

    #[error("[L3_CUSTOMER_FAULT] customer not found")]
    CustomerNotFound,

    #[error("[L3_CUSTOMER_FAULT] email already registered")]
    DuplicateEmail,

    #[error("[L3_FILE_FAULT] file record not found")]
    FileNotFound,

    #[error("[L3_TOKEN_FAULT] token not found or already consumed")]
    TokenNotUsable,

    #[error("[L3_GROUP_FAULT] claim group not found")]
    ClaimGroupNotFound,

    #[error("[L3_OUTBOX_FAULT] side effect already dispatched under this idempotency key")]
    AlreadySent,
}
