// [libs/infra/persistence/src/lib.rs]
//! Capa de persistencia relacional sobre libSQL: un repositorio por
//! agregado, cada uno responsable de su propio mapeo fila-a-dominio y de
//! sus propias guardas de concurrencia. Ningún tipo de este crate conoce
//! cifrado ni reglas de negocio — eso vive en los crates de dominio.

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::LedgerClient;
pub use errors::PersistenceError;
pub use repositories::{
    ClaimFileRepository, ClaimGroupRepository, ClaimNoteRepository, ClaimRepository,
    CustomerRepository, DraftFieldUpdate, FileAccessLogRepository, OutboxRepository, TokenRepository,
};
