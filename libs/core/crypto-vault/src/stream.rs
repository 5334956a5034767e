// [libs/core/crypto-vault/src/stream.rs]
//! Formato de cifrado autenticado en streaming para archivos adjuntos.
//! Un archivo cifrado no es la concatenación ingenua de sobres AEAD
//! independientes: cada fragmento
//! deriva su nonce del nonce de archivo y su contador de posición, y el
//! último fragmento lleva una marca en el AAD para que un truncamiento
//! produzca un fallo de autenticación en vez de un archivo corto
//! silencioso.

use crate::errors::VaultError;
use crate::key::EncryptionKey;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use std::io::{Read, Write};

const MAGIC: &[u8; 4] = b"SKCV";
const FORMAT_VERSION: u8 = 1;
const HEADER_LEN: usize = 24;
const FILE_NONCE_LEN: usize = 12;
pub const CHUNK_SIZE: usize = 4 * 1024 * 1024;

struct Header {
    file_nonce: [u8; FILE_NONCE_LEN],
}

fn write_header<W: Write>(writer: &mut W, file_nonce: &[u8; FILE_NONCE_LEN]) -> Result<(), VaultError> {
    let mut buf = [0u8; HEADER_LEN];
    buf[0..4].copy_from_slice(MAGIC);
    buf[4] = FORMAT_VERSION;
    // byte 5 reservado (flags), bytes 6..8 reservados
    buf[8..20].copy_from_slice(file_nonce);
    // bytes 20..24 reservados
    writer.write_all(&buf)?;
    Ok(())
}

fn read_header<R: Read>(reader: &mut R) -> Result<Header, VaultError> {
    let mut buf = [0u8; HEADER_LEN];
    reader.read_exact(&mut buf)?;
    if &buf[0..4] != MAGIC || buf[4] != FORMAT_VERSION {
        return Err(VaultError::InvalidHeader);
    }
    let mut file_nonce = [0u8; FILE_NONCE_LEN];
    file_nonce.copy_from_slice(&buf[8..20]);
    Ok(Header { file_nonce })
}

/// Deriva el nonce de un fragmento: el nonce de archivo con sus últimos
/// 8 bytes XOR-eados contra el contador de fragmento en big-endian.
fn chunk_nonce(file_nonce: &[u8; FILE_NONCE_LEN], chunk_index: u32) -> [u8; FILE_NONCE_LEN] {
    let mut nonce = *file_nonce;
    let counter_bytes = (chunk_index as u64).to_be_bytes();
    for (nonce_byte, counter_byte) in nonce[4..12].iter_mut().zip(counter_bytes.iter()) {
        *nonce_byte ^= counter_byte;
    }
    nonce
}

fn chunk_aad(chunk_index: u32, is_final: bool) -> [u8; 5] {
    let mut aad = [0u8; 5];
    aad[0..4].copy_from_slice(&chunk_index.to_be_bytes());
    aad[4] = is_final as u8;
    aad
}

/// Cifra todo el contenido de `reader` hacia `writer` en el formato de
/// streaming descrito arriba.
pub fn encrypt_stream<R: Read, W: Write>(
    key: &EncryptionKey,
    reader: &mut R,
    writer: &mut W,
) -> Result<(), VaultError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let mut file_nonce = [0u8; FILE_NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut file_nonce);
    write_header(writer, &file_nonce)?;

    // Lectura con un fragmento de anticipo: sólo al ver que el próximo
    // fragmento está vacío sabemos que el actual es el último, así que se
    // mantiene siempre un fragmento "en mano" hasta confirmar si hay más.
    let mut current = read_chunk(reader)?;
    let mut chunk_index: u32 = 0;

    loop {
        let next = read_chunk(reader)?;
        let is_final = next.is_empty();
        encrypt_one_chunk(&cipher, &file_nonce, chunk_index, is_final, &current, writer)?;
        if is_final {
            return Ok(());
        }
        current = next;
        chunk_index += 1;
    }
}

fn read_chunk<R: Read>(reader: &mut R) -> Result<Vec<u8>, VaultError> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let read_bytes = read_full_or_partial(reader, &mut buf)?;
    buf.truncate(read_bytes);
    Ok(buf)
}

fn encrypt_one_chunk<W: Write>(
    cipher: &Aes256Gcm,
    file_nonce: &[u8; FILE_NONCE_LEN],
    chunk_index: u32,
    is_final: bool,
    plaintext: &[u8],
    writer: &mut W,
) -> Result<(), VaultError> {
    let nonce_bytes = chunk_nonce(file_nonce, chunk_index);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let aad = chunk_aad(chunk_index, is_final);

    let ciphertext = cipher
        .encrypt(
            nonce,
            aes_gcm::aead::Payload { msg: plaintext, aad: &aad },
        )
        .map_err(|_| VaultError::ChunkAuthenticationFailed(chunk_index))?;

    writer.write_all(&(ciphertext.len() as u32).to_be_bytes())?;
    writer.write_all(&[is_final as u8])?;
    writer.write_all(&ciphertext)?;
    Ok(())
}

/// Descifra un flujo producido por [`encrypt_stream`]. Si el flujo
/// termina sin haber visto un fragmento marcado final, retorna
/// `VaultError::Truncated` en vez de entregar el prefijo descifrado
/// silenciosamente.
pub fn decrypt_stream<R: Read, W: Write>(
    key: &EncryptionKey,
    reader: &mut R,
    writer: &mut W,
) -> Result<(), VaultError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let header = read_header(reader)?;

    let mut chunk_index: u32 = 0;
    loop {
        let mut len_buf = [0u8; 4];
        match reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(VaultError::Truncated);
            }
            Err(e) => return Err(VaultError::Io(e)),
        }
        let ciphertext_len = u32::from_be_bytes(len_buf) as usize;

        let mut final_flag_buf = [0u8; 1];
        reader.read_exact(&mut final_flag_buf)?;
        let is_final = final_flag_buf[0] != 0;

        let mut ciphertext = vec![0u8; ciphertext_len];
        reader.read_exact(&mut ciphertext)?;

        let nonce_bytes = chunk_nonce(&header.file_nonce, chunk_index);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let aad = chunk_aad(chunk_index, is_final);

        let plaintext = cipher
            .decrypt(nonce, aes_gcm::aead::Payload { msg: &ciphertext, aad: &aad })
            .map_err(|_| VaultError::ChunkAuthenticationFailed(chunk_index))?;

        writer.write_all(&plaintext)?;

        if is_final {
            return Ok(());
        }
        chunk_index += 1;
    }
}

const ONESHOT_HEADER_LEN: usize = 5 + FILE_NONCE_LEN;

/// Cifra todo el contenido en una sola llamada AEAD, sin fragmentar.
/// Pensado para archivos por debajo del umbral de streaming, donde el
/// costo de mantener un fragmento de anticipo en memoria no compra nada:
/// aquí ya se tiene el payload completo de una vez.
pub fn encrypt_oneshot(key: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>, VaultError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let mut nonce_bytes = [0u8; FILE_NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| VaultError::ChunkAuthenticationFailed(0))?;

    let mut out = Vec::with_capacity(ONESHOT_HEADER_LEN + ciphertext.len());
    out.extend_from_slice(MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Descifra un payload producido por [`encrypt_oneshot`].
pub fn decrypt_oneshot(key: &EncryptionKey, data: &[u8]) -> Result<Vec<u8>, VaultError> {
    if data.len() < ONESHOT_HEADER_LEN {
        return Err(VaultError::Truncated);
    }
    if &data[0..4] != MAGIC || data[4] != FORMAT_VERSION {
        return Err(VaultError::InvalidHeader);
    }
    let mut nonce_bytes = [0u8; FILE_NONCE_LEN];
    nonce_bytes.copy_from_slice(&data[5..ONESHOT_HEADER_LEN]);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .decrypt(nonce, &data[ONESHOT_HEADER_LEN..])
        .map_err(|_| VaultError::ChunkAuthenticationFailed(0))
}

/// Lee hasta llenar `buf` o hasta agotar el lector; a diferencia de
/// `read_exact`, un EOF temprano no es un error — retorna cuántos bytes
/// se leyeron efectivamente.
fn read_full_or_partial<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, VaultError> {
    let mut total_read = 0;
    while total_read < buf.len() {
        let read_now = reader.read(&mut buf[total_read..])?;
        if read_now == 0 {
            break;
        }
        total_read += read_now;
    }
    Ok(total_read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn test_key() -> EncryptionKey {
        EncryptionKey::from_bytes([11u8; 32])
    }

    #[test]
    fn round_trips_small_payload() {
        let key = test_key();
        let plaintext = b"hello skyclaim".to_vec();
        let mut ciphertext = Vec::new();
        encrypt_stream(&key, &mut Cursor::new(plaintext.clone()), &mut ciphertext).unwrap();

        let mut recovered = Vec::new();
        decrypt_stream(&key, &mut Cursor::new(ciphertext), &mut recovered).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn round_trips_multi_chunk_payload() {
        let key = test_key();
        let plaintext = vec![0x42u8; CHUNK_SIZE * 2 + 137];
        let mut ciphertext = Vec::new();
        encrypt_stream(&key, &mut Cursor::new(plaintext.clone()), &mut ciphertext).unwrap();

        let mut recovered = Vec::new();
        decrypt_stream(&key, &mut Cursor::new(ciphertext), &mut recovered).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn round_trips_empty_payload() {
        let key = test_key();
        let mut ciphertext = Vec::new();
        encrypt_stream(&key, &mut Cursor::new(Vec::new()), &mut ciphertext).unwrap();

        let mut recovered = Vec::new();
        decrypt_stream(&key, &mut Cursor::new(ciphertext), &mut recovered).unwrap();
        assert!(recovered.is_empty());
    }

    /// Flipping one byte of the remote ciphertext must surface as an
    /// integrity failure, not a silently short file.
    #[test]
    fn tampered_chunk_fails_closed() {
        let key = test_key();
        let plaintext = vec![0x7u8; CHUNK_SIZE + 1000];
        let mut ciphertext = Vec::new();
        encrypt_stream(&key, &mut Cursor::new(plaintext), &mut ciphertext).unwrap();

        let flip_at = ciphertext.len() - 10;
        ciphertext[flip_at] ^= 0xFF;

        let mut recovered = Vec::new();
        let result = decrypt_stream(&key, &mut Cursor::new(ciphertext), &mut recovered);
        assert!(result.is_err());
    }

    #[test]
    fn truncated_stream_is_detected() {
        let key = test_key();
        let plaintext = vec![0x9u8; CHUNK_SIZE + 1000];
        let mut ciphertext = Vec::new();
        encrypt_stream(&key, &mut Cursor::new(plaintext), &mut ciphertext).unwrap();

        let truncated = &ciphertext[..ciphertext.len() - 50];
        let mut recovered = Vec::new();
        let result = decrypt_stream(&key, &mut Cursor::new(truncated.to_vec()), &mut recovered);
        assert!(result.is_err());
    }

    #[test]
    fn oneshot_round_trips_small_payload() {
        let key = test_key();
        let plaintext = b"a small attachment".to_vec();
        let ciphertext = encrypt_oneshot(&key, &plaintext).unwrap();
        let recovered = decrypt_oneshot(&key, &ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn oneshot_tampered_ciphertext_fails_closed() {
        let key = test_key();
        let plaintext = vec![0x3u8; 512];
        let mut ciphertext = encrypt_oneshot(&key, &plaintext).unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xFF;
        assert!(decrypt_oneshot(&key, &ciphertext).is_err());
    }

    #[test]
    fn oneshot_rejects_truncated_header() {
        let key = test_key();
        let result = decrypt_oneshot(&key, &[0u8; 3]);
        assert!(result.is_err());
    }
}
