// [libs/domain/auth-service/src/tokens.rs]
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Genera un valor opaco aleatorio de 256 bits, codificado en hex para
/// transportarlo en URLs y cookies, y calcula su digesto SHA-256 por
/// separado — sólo el digesto se persiste.
pub struct OpaqueToken {
    pub plaintext_hex: String,
    pub digest_hex: String,
}

pub fn generate_opaque_token() -> OpaqueToken {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let plaintext_hex = hex::encode(bytes);
    OpaqueToken {
        digest_hex: digest_of(&plaintext_hex),
        plaintext_hex,
    }
}

pub fn digest_of(plaintext_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext_hex.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_unique_and_digest_is_deterministic() {
        let a = generate_opaque_token();
        let b = generate_opaque_token();
        assert_ne!(a.plaintext_hex, b.plaintext_hex);
        assert_eq!(a.digest_hex, digest_of(&a.plaintext_hex));
        assert_ne!(a.digest_hex, a.plaintext_hex);
    }
}
