// [libs/core/crypto-vault/src/field.rs]
use crate::errors::VaultError;
use crate::key::EncryptionKey;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

const NONCE_LEN: usize = 12;

/// Campo cifrado en reposo, persistido como par nonce+texto cifrado
/// hex-codificado. Así viajan en la capa de persistencia el email, el
/// nombre, el teléfono, la dirección, la referencia de reserva y el
/// número de boleto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedField {
    pub nonce_hex: String,
    pub ciphertext_hex: String,
}

/// Cifra un campo de texto plano con AES-256-GCM y un nonce aleatorio de
/// 96 bits por llamada.
pub fn encrypt_field(key: &EncryptionKey, plaintext: &str) -> Result<EncryptedField, VaultError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| VaultError::EncryptionFailed)?;

    Ok(EncryptedField {
        nonce_hex: hex::encode(nonce_bytes),
        ciphertext_hex: hex::encode(ciphertext),
    })
}

/// Descifra un `EncryptedField` previamente producido por
/// [`encrypt_field`]. Falla cerrado: cualquier manipulación del nonce o
/// del texto cifrado produce `VaultError::DecryptionFailed`, nunca un
/// texto plano parcial.
pub fn decrypt_field(key: &EncryptionKey, field: &EncryptedField) -> Result<String, VaultError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let nonce_bytes = hex::decode(&field.nonce_hex)?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(VaultError::DecryptionFailed);
    }
    let ciphertext = hex::decode(&field.ciphertext_hex)?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let plaintext_bytes = cipher
        .decrypt(nonce, ciphertext.as_ref())
        .map_err(|_| VaultError::DecryptionFailed)?;

    String::from_utf8(plaintext_bytes).map_err(|_| VaultError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> EncryptionKey {
        EncryptionKey::from_bytes([7u8; 32])
    }

    #[test]
    fn round_trips_plaintext() {
        let key = test_key();
        let field = encrypt_field(&key, "jane.doe@example.com").unwrap();
        let recovered = decrypt_field(&key, &field).unwrap();
        assert_eq!(recovered, "jane.doe@example.com");
    }

    #[test]
    fn tampered_ciphertext_fails_closed() {
        let key = test_key();
        let mut field = encrypt_field(&key, "secret").unwrap();
        let mut bytes = hex::decode(&field.ciphertext_hex).unwrap();
        bytes[0] ^= 0xFF;
        field.ciphertext_hex = hex::encode(bytes);
        assert!(decrypt_field(&key, &field).is_err());
    }

    #[test]
    fn distinct_calls_use_distinct_nonces() {
        let key = test_key();
        let a = encrypt_field(&key, "same plaintext").unwrap();
        let b = encrypt_field(&key, "same plaintext").unwrap();
        assert_ne!(a.nonce_hex, b.nonce_hex);
    }
}
