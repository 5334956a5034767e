// [libs/infra/persistence/src/repositories/mod.rs]
//! Cada repositorio cubre exactamente un agregado y expone sólo las
//! operaciones que el dominio necesita — nada de CRUD genérico.

pub mod claim_file_repository;
pub mod claim_group_repository;
pub mod claim_note_repository;
pub mod claim_repository;
pub mod customer_repository;
pub mod file_access_log_repository;
pub mod outbox_repository;
pub mod token_repository;

pub use claim_file_repository::ClaimFileRepository;
pub use claim_group_repository::ClaimGroupRepository;
pub use claim_note_repository::ClaimNoteRepository;
pub use claim_repository::{ClaimRepository, DraftFieldUpdate};
pub use customer_repository::CustomerRepository;
pub use file_access_log_repository::FileAccessLogRepository;
pub use outbox_repository::OutboxRepository;
pub use token_repository::TokenRepository;
