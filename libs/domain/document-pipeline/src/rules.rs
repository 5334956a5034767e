// [libs/domain/document-pipeline/src/rules.rs]
//! Tabla de reglas de validación por tipo de documento: cada tipo tiene
//! un tamaño máximo, content-types admitidos, extensiones requeridas y
//! las banderas de si exige escaneo y de si exige cifrado.

use skyclaim_claim_models::DocumentType;

/// Una entrada de la tabla de reglas. `display_extensions` nunca se usa
/// para decidir el tipo de contenido — sólo para mostrarlo en la UI.
#[derive(Debug, Clone, Copy)]
pub struct DocumentRule {
    pub max_bytes: u64,
    pub allowed_content_types: &'static [&'static str],
    pub display_extensions: &'static [&'static str],
    pub requires_scan: bool,
    pub requires_encryption: bool,
}

const MB: u64 = 1024 * 1024;

const BOARDING_PASS: DocumentRule = DocumentRule {
    max_bytes: 10 * MB,
    allowed_content_types: &["application/pdf", "image/jpeg", "image/png"],
    display_extensions: &["pdf", "jpg", "jpeg", "png"],
    requires_scan: true,
    requires_encryption: true,
};

const ID_DOCUMENT: DocumentRule = DocumentRule {
    max_bytes: 5 * MB,
    allowed_content_types: &["application/pdf", "image/jpeg", "image/png"],
    display_extensions: &["pdf", "jpg", "jpeg", "png"],
    requires_scan: true,
    requires_encryption: true,
};

const RECEIPT: DocumentRule = DocumentRule {
    max_bytes: 5 * MB,
    allowed_content_types: &["application/pdf", "image/jpeg", "image/png"],
    display_extensions: &["pdf", "jpg", "jpeg", "png"],
    requires_scan: true,
    requires_encryption: true,
};

const BANK_STATEMENT: DocumentRule = DocumentRule {
    max_bytes: 5 * MB,
    allowed_content_types: &["application/pdf"],
    display_extensions: &["pdf"],
    requires_scan: true,
    requires_encryption: true,
};

const FLIGHT_TICKET: DocumentRule = DocumentRule {
    max_bytes: 10 * MB,
    allowed_content_types: &["application/pdf", "image/jpeg", "image/png"],
    display_extensions: &["pdf", "jpg", "jpeg", "png"],
    requires_scan: true,
    requires_encryption: true,
};

const DELAY_CERTIFICATE: DocumentRule = DocumentRule {
    max_bytes: 5 * MB,
    allowed_content_types: &["application/pdf", "image/jpeg", "image/png"],
    display_extensions: &["pdf", "jpg", "jpeg", "png"],
    requires_scan: true,
    requires_encryption: true,
};

const CANCELLATION_NOTICE: DocumentRule = DocumentRule {
    max_bytes: 5 * MB,
    allowed_content_types: &["application/pdf", "image/jpeg", "image/png"],
    display_extensions: &["pdf", "jpg", "jpeg", "png"],
    requires_scan: true,
    requires_encryption: true,
};

const OTHER: DocumentRule = DocumentRule {
    max_bytes: 5 * MB,
    allowed_content_types: &["application/pdf", "image/jpeg", "image/png"],
    display_extensions: &["pdf", "jpg", "jpeg", "png"],
    requires_scan: true,
    requires_encryption: true,
};

pub fn rule_for(document_type: DocumentType) -> &'static DocumentRule {
    match document_type {
        DocumentType::BoardingPass => &BOARDING_PASS,
        DocumentType::IdDocument => &ID_DOCUMENT,
        DocumentType::Receipt => &RECEIPT,
        DocumentType::BankStatement => &BANK_STATEMENT,
        DocumentType::FlightTicket => &FLIGHT_TICKET,
        DocumentType::DelayCertificate => &DELAY_CERTIFICATE,
        DocumentType::CancellationNotice => &CANCELLATION_NOTICE,
        DocumentType::Other => &OTHER,
    }
}

impl DocumentRule {
    pub fn allows_content_type(&self, content_type: &str) -> bool {
        self.allowed_content_types.contains(&content_type)
    }

    pub fn allows_size(&self, size_bytes: u64) -> bool {
        size_bytes <= self.max_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boarding_pass_allows_pdf_and_images_up_to_10mb() {
        let rule = rule_for(DocumentType::BoardingPass);
        assert!(rule.allows_content_type("application/pdf"));
        assert!(rule.allows_content_type("image/png"));
        assert!(rule.allows_size(10 * MB));
        assert!(!rule.allows_size(10 * MB + 1));
    }

    #[test]
    fn bank_statement_is_pdf_only() {
        let rule = rule_for(DocumentType::BankStatement);
        assert!(rule.allows_content_type("application/pdf"));
        assert!(!rule.allows_content_type("image/png"));
    }
}
