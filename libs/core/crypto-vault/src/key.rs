// [libs/core/crypto-vault/src/key.rs]
use crate::errors::VaultError;
use zeroize::Zeroize;

/// Llave simétrica de 256 bits cargada desde `DB_ENCRYPTION_KEY` o
/// `FILE_ENCRYPTION_KEY`. Se pone a cero al soltarse; nunca implementa
/// `Debug`/`Display` para evitar que termine en un log.
pub struct EncryptionKey {
    bytes: [u8; 32],
}

impl EncryptionKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Decodifica una clave hexadecimal de 64 caracteres (64 nibbles = 32
    /// bytes), la forma en la que se transporta en variables de entorno.
    pub fn from_hex(hex_str: &str) -> Result<Self, VaultError> {
        let decoded = hex::decode(hex_str)?;
        if decoded.len() != 32 {
            return Err(VaultError::InvalidKeyLength(decoded.len()));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        Ok(Self { bytes })
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Expone la llave en claro para que el llamador la envuelva bajo
    /// otra llave (patrón de "llave de archivo envuelta"). Nunca debe
    /// persistirse ni salir del ámbito de una operación de
    /// envoltura/desenvoltura.
    pub fn expose_secret(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}
