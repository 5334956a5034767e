// [libs/core/crypto-vault/src/lib.rs]
//! Cifrado de campo, índice ciego de búsqueda y cifrado autenticado en
//! streaming para archivos adjuntos.

pub mod blind_index;
pub mod errors;
pub mod field;
pub mod key;
pub mod stream;

pub use blind_index::blind_index;
pub use errors::VaultError;
pub use field::{decrypt_field, encrypt_field, EncryptedField};
pub use key::EncryptionKey;
pub use stream::{decrypt_oneshot, decrypt_stream, encrypt_oneshot, encrypt_stream, CHUNK_SIZE};
