// [libs/core/crypto-vault/src/blind_index.rs]
use crate::key::EncryptionKey;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Índice ciego determinista para búsquedas por igualdad sobre columnas
/// cifradas, p. ej. lookup por email sin descifrar toda la tabla.
/// HMAC-SHA256 de la entrada ya normalizada, codificado en hex.
///
/// La normalización (minúsculas, sin espacios periféricos) es
/// responsabilidad del llamador — ver `Customer::normalize_email` en
/// `skyclaim-claim-models` — para que el mismo valor lógico siempre
/// produzca el mismo índice.
pub fn blind_index(key: &EncryptionKey, normalized_plaintext: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(normalized_plaintext.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_same_index() {
        let key = EncryptionKey::from_bytes([3u8; 32]);
        assert_eq!(
            blind_index(&key, "jane@example.com"),
            blind_index(&key, "jane@example.com")
        );
    }

    #[test]
    fn different_input_different_index() {
        let key = EncryptionKey::from_bytes([3u8; 32]);
        assert_ne!(
            blind_index(&key, "jane@example.com"),
            blind_index(&key, "john@example.com")
        );
    }
}
