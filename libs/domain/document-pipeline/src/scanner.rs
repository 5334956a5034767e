// [libs/domain/document-pipeline/src/scanner.rs]
//! Escaneo de contenido malicioso. El PDF structural check (JS
//! embebido, archivos adjuntos, límite de páginas) vive aquí también
//! porque comparte la misma etapa del pipeline.

use crate::errors::DocumentError;
use std::time::Duration;

const MAX_PDF_PAGES: usize = 50;

/// Resultado de inspeccionar la estructura de un PDF sin un parser
/// completo: basta con buscar los marcadores que delatan JavaScript
/// embebido, adjuntos embebidos, o contar objetos `/Page`.
pub fn check_pdf_structure(bytes: &[u8]) -> Result<(), DocumentError> {
    if contains(bytes, b"/JavaScript") || contains(bytes, b"/JS ") || contains(bytes, b"/JS(") {
        return Err(DocumentError::UnsafePdf);
    }
    if contains(bytes, b"/EmbeddedFile") {
        return Err(DocumentError::UnsafePdf);
    }
    let page_count = count_occurrences(bytes, b"/Type/Page") + count_occurrences(bytes, b"/Type /Page");
    if page_count > MAX_PDF_PAGES {
        return Err(DocumentError::UnsafePdf);
    }
    Ok(())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() || haystack.len() < needle.len() {
        return 0;
    }
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

/// Resultado de un escaneo antivirus/malware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanVerdict {
    Clean,
    Threat,
}

#[async_trait::async_trait]
pub trait MalwareScanner: Send + Sync {
    async fn scan(&self, content: &[u8]) -> Result<ScanVerdict, DocumentError>;
}

/// Escáner de relleno para entornos de desarrollo: siempre reporta
/// limpio, pero registra una advertencia — nunca debe usarse en
/// producción.
pub struct NullScanner;

#[async_trait::async_trait]
impl MalwareScanner for NullScanner {
    async fn scan(&self, _content: &[u8]) -> Result<ScanVerdict, DocumentError> {
        tracing::warn!("malware scanner disabled — fail-open in effect, do not use in production");
        Ok(ScanVerdict::Clean)
    }
}

/// Escáner remoto vía HTTP. Falla en cerrado: cualquier error de
/// transporte o timeout se traduce en `ScannerUnavailable`, nunca en
/// `Clean`.
pub struct RemoteScanner {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteScanner {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client builder with static config cannot fail");
        Self { client, endpoint: endpoint.into() }
    }
}

#[async_trait::async_trait]
impl MalwareScanner for RemoteScanner {
    async fn scan(&self, content: &[u8]) -> Result<ScanVerdict, DocumentError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/octet-stream")
            .body(content.to_vec())
            .send()
            .await
            .map_err(|_| DocumentError::ScannerUnavailable)?;

        if !response.status().is_success() {
            return Err(DocumentError::ScannerUnavailable);
        }

        let body: ScanResponseBody = response.json().await.map_err(|_| DocumentError::ScannerUnavailable)?;
        if body.threat_detected {
            Ok(ScanVerdict::Threat)
        } else {
            Ok(ScanVerdict::Clean)
        }
    }
}

#[derive(serde::Deserialize)]
struct ScanResponseBody {
    threat_detected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_pdf_with_embedded_javascript() {
        let bytes = b"%PDF-1.7\n1 0 obj << /JavaScript 2 0 R >> endobj";
        assert!(matches!(check_pdf_structure(bytes), Err(DocumentError::UnsafePdf)));
    }

    #[test]
    fn rejects_pdf_with_too_many_pages() {
        let mut bytes = b"%PDF-1.7\n".to_vec();
        for _ in 0..(MAX_PDF_PAGES + 1) {
            bytes.extend_from_slice(b"/Type/Page ");
        }
        assert!(matches!(check_pdf_structure(&bytes), Err(DocumentError::UnsafePdf)));
    }

    #[test]
    fn accepts_plain_pdf() {
        let bytes = b"%PDF-1.7\n1 0 obj << /Type/Page >> endobj";
        assert!(check_pdf_structure(bytes).is_ok());
    }

    #[tokio::test]
    async fn null_scanner_always_reports_clean() {
        let scanner = NullScanner;
        assert_eq!(scanner.scan(b"anything").await.unwrap(), ScanVerdict::Clean);
    }
}
