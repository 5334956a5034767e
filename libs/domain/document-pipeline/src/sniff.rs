// [libs/domain/document-pipeline/src/sniff.rs]
/*!
 * Detección de tipo de contenido por número mágico sobre los primeros
 * bytes del archivo. No existe un crate del ecosistema lo bastante
 * acotado a las cuatro familias que este pipeline admite, así que la
 * tabla se escribe a mano. Nunca se confía en la extensión del nombre
 * de archivo declarado: sólo los bytes.
 */

const PDF_MAGIC: &[u8] = b"%PDF-";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Tipos de contenido que el pipeline sabe reconocer. Cualquier otro
/// patrón de bytes se reporta como `Unknown`, nunca inferido del nombre
/// de archivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffedContentType {
    Pdf,
    Jpeg,
    Png,
    Unknown,
}

impl SniffedContentType {
    pub fn as_mime(&self) -> &'static str {
        match self {
            SniffedContentType::Pdf => "application/pdf",
            SniffedContentType::Jpeg => "image/jpeg",
            SniffedContentType::Png => "image/png",
            SniffedContentType::Unknown => "application/octet-stream",
        }
    }
}

/// Inspecciona el prefijo del archivo y devuelve el tipo detectado.
/// Sólo necesita los primeros 8 bytes; el llamador puede pasar un
/// prefijo más corto cuando el archivo entero es menor.
pub fn sniff_content_type(prefix: &[u8]) -> SniffedContentType {
    if prefix.starts_with(PDF_MAGIC) {
        SniffedContentType::Pdf
    } else if prefix.starts_with(JPEG_MAGIC) {
        SniffedContentType::Jpeg
    } else if prefix.starts_with(PNG_MAGIC) {
        SniffedContentType::Png
    } else {
        SniffedContentType::Unknown
    }
}

/// Compara el MIME declarado por el cliente contra el sniff real,
/// tolerando la forma abreviada `image/jpg` que algunos clientes envían.
pub fn declared_matches_sniffed(declared_mime_type: &str, sniffed: SniffedContentType) -> bool {
    let declared = declared_mime_type.to_ascii_lowercase();
    match sniffed {
        SniffedContentType::Pdf => declared == "application/pdf",
        SniffedContentType::Jpeg => declared == "image/jpeg" || declared == "image/jpg",
        SniffedContentType::Png => declared == "image/png",
        SniffedContentType::Unknown => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_known_magic_numbers() {
        assert_eq!(sniff_content_type(b"%PDF-1.7\n..."), SniffedContentType::Pdf);
        assert_eq!(sniff_content_type(&[0xFF, 0xD8, 0xFF, 0xE0]), SniffedContentType::Jpeg);
        assert_eq!(
            sniff_content_type(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00]),
            SniffedContentType::Png
        );
    }

    #[test]
    fn unknown_prefix_is_never_guessed_from_extension() {
        assert_eq!(sniff_content_type(b"this is just text"), SniffedContentType::Unknown);
    }

    #[test]
    fn declared_mismatch_is_detected() {
        assert!(!declared_matches_sniffed("application/pdf", SniffedContentType::Jpeg));
        assert!(declared_matches_sniffed("image/jpg", SniffedContentType::Jpeg));
    }
}
