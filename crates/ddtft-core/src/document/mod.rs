//! Document classification, family-specific extractors, and the
//! orchestrating parser.

pub mod context;
pub mod ddt;
pub mod generic;
pub mod invoice;
pub mod parser;
pub mod rules;

pub use context::ExtractionContext;
pub use ddt::DdtExtractor;
pub use generic::GenericExtractor;
pub use invoice::InvoiceExtractor;
pub use parser::{DocumentParser, RawDocument};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Document family, decided before any field extraction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFamily {
    /// Delivery note (documento di trasporto).
    DeliveryNote,
    /// Invoice (fattura), including the empty-template variant.
    Invoice,
    /// Neither family recognized; routed to the generic extractor.
    Unknown,
}

/// Classify a document from its filename, then from its content.
///
/// Filename tokens win when present (`DDV`/`DDT` for delivery notes,
/// `FTV`/`FT`/`FATT` for invoices); otherwise the header phrases in the
/// text decide. Documents matching neither are `Unknown`.
pub fn classify_document(file_name: &str, text: &str) -> DocumentFamily {
    let upper_name = file_name.to_uppercase();
    if upper_name.contains("DDV") || upper_name.contains("DDT") {
        return DocumentFamily::DeliveryNote;
    }
    if upper_name.contains("FTV") || upper_name.contains("FT") || upper_name.contains("FATT") {
        return DocumentFamily::Invoice;
    }

    let upper_text = text.to_uppercase();
    if upper_text.contains("DOCUMENTO DI TRASPORTO")
        || upper_text.contains("D.D.T.")
        || upper_text.contains("DDT")
    {
        return DocumentFamily::DeliveryNote;
    }
    if upper_text.contains("FATTURA") || upper_text.contains("INVOICE") {
        return DocumentFamily::Invoice;
    }

    DocumentFamily::Unknown
}

/// Trait for family-specific document extractors.
pub trait DocumentExtractor {
    /// The family this extractor handles.
    fn family(&self) -> DocumentFamily;

    /// Run every field cascade and assemble the raw field map.
    ///
    /// An unresolved field is not an error; errors signal that the whole
    /// extractor gave up, which the parser answers with the generic
    /// pipeline.
    fn extract(&mut self) -> Result<RawDocument>;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_classify_delivery_note_from_file_name() {
        assert_eq!(
            classify_document("DDV_703723_2025_4251.PDF", ""),
            DocumentFamily::DeliveryNote
        );
        assert_eq!(
            classify_document("ddt_4521.pdf", ""),
            DocumentFamily::DeliveryNote
        );
    }

    #[test]
    fn test_classify_invoice_from_file_name() {
        assert_eq!(
            classify_document("FTV_701029_2025_20001_4915_21052025.PDF", ""),
            DocumentFamily::Invoice
        );
        assert_eq!(classify_document("FT_4915.pdf", ""), DocumentFamily::Invoice);
        assert_eq!(
            classify_document("FATT_2025_101.pdf", ""),
            DocumentFamily::Invoice
        );
    }

    #[test]
    fn test_file_name_wins_over_content() {
        // A delivery-note filename beats an invoice phrase in the body.
        assert_eq!(
            classify_document("DDV_703723.PDF", "FATTURA N° 99"),
            DocumentFamily::DeliveryNote
        );
    }

    #[test]
    fn test_classify_from_content() {
        assert_eq!(
            classify_document("scan001.pdf", "DOCUMENTO DI TRASPORTO N. 4521"),
            DocumentFamily::DeliveryNote
        );
        assert_eq!(
            classify_document("scan002.pdf", "FATTURA N° 4915 del 21/05/2025"),
            DocumentFamily::Invoice
        );
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(
            classify_document("scan003.pdf", "nothing recognizable here"),
            DocumentFamily::Unknown
        );
        assert_eq!(classify_document("", ""), DocumentFamily::Unknown);
    }
}
