// [libs/core/crypto-vault/src/errors.rs]
use thiserror::Error;

/// Catálogo de fallos del vault criptográfico. Los tags entre corchetes
/// son estables y se propagan (sin más detalle) hasta el límite de la API
/// como código de máquina; nunca se filtra el motivo interno exacto.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("[VAULT_KEY_LENGTH] encryption key must be exactly 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("[VAULT_ENCRYPT_FAULT] field encryption failed")]
    EncryptionFailed,

    #[error("[VAULT_DECRYPT_FAULT] field decryption failed: ciphertext or key invalid")]
    DecryptionFailed,

    #[error("[VAULT_ENCODING_FAULT] {0}")]
    Encoding(#[from] hex::FromHexError),

    #[error("[VAULT_STREAM_HEADER] invalid or unsupported stream header")]
    InvalidHeader,

    #[error("[VAULT_STREAM_CHUNK_FAULT] chunk {0} failed authentication")]
    ChunkAuthenticationFailed(u32),

    #[error("[VAULT_STREAM_TRUNCATED] stream ended before a final chunk was seen")]
    Truncated,

    #[error("[VAULT_IO_FAULT] {0}")]
    Io(#[from] std::io::Error),
}
