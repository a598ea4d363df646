//! Extraction orchestrator.
//!
//! Classifies the document family, delegates to the matching extractor,
//! answers extractor failure with the generic pipeline, and normalizes
//! the raw field map into the canonical [`DocumentRecord`].

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::{
    DocumentRecord, DocumentTotals, DocumentType, EngineConfig, LineItem, LookupTables,
};

use super::ddt::DdtExtractor;
use super::generic::GenericExtractor;
use super::invoice::InvoiceExtractor;
use super::{classify_document, DocumentExtractor, DocumentFamily};

/// Raw field map produced by a family extractor, before normalization.
///
/// Unresolved fields hold their defaults; absence is data here, not an
/// error.
#[derive(Debug, Clone, Default)]
pub struct RawDocument {
    pub document_number: String,
    pub date: String,
    pub client_code: String,
    pub client_name: String,
    pub vat_number: String,
    pub fiscal_code: String,
    pub order_reference: String,
    pub order_date: String,
    pub delivery_address: String,
    pub delivery_date: String,
    /// Printed "Totale documento" amount, when the sheet carries one.
    pub printed_total: Option<Decimal>,
    pub items: Vec<LineItem>,
    pub totals: DocumentTotals,
}

/// Extraction orchestrator.
///
/// Never returns an error: classification, extraction, and normalization
/// failures all degrade to emptier records.
#[derive(Debug, Clone)]
pub struct DocumentParser {
    tables: Arc<LookupTables>,
    fallback_to_generic: bool,
    apply_short_names: bool,
}

impl DocumentParser {
    /// Parser with the built-in lookup tables and default toggles.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(LookupTables::default()),
            fallback_to_generic: true,
            apply_short_names: true,
        }
    }

    /// Parser configured from an [`EngineConfig`].
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            tables: Arc::new(config.lookup),
            fallback_to_generic: config.fallback_to_generic,
            apply_short_names: config.apply_short_names,
        }
    }

    /// Parser with caller-provided lookup tables.
    pub fn with_tables(tables: LookupTables) -> Self {
        Self {
            tables: Arc::new(tables),
            fallback_to_generic: true,
            apply_short_names: true,
        }
    }

    /// Toggle the generic fallback for failing family extractors.
    pub fn with_fallback_to_generic(mut self, enabled: bool) -> Self {
        self.fallback_to_generic = enabled;
        self
    }

    /// Toggle the short display-name post-pass.
    pub fn with_short_names(mut self, enabled: bool) -> Self {
        self.apply_short_names = enabled;
        self
    }

    /// Extract one document into the canonical record.
    pub fn extract(&self, text: &str, file_name: &str) -> DocumentRecord {
        let family = classify_document(file_name, text);
        debug!(?family, file = %file_name, "classified document");

        let raw = match family {
            DocumentFamily::DeliveryNote => self.run_family(
                DdtExtractor::new(text, file_name, Arc::clone(&self.tables)),
                text,
                file_name,
            ),
            DocumentFamily::Invoice => self.run_family(
                InvoiceExtractor::new(text, file_name, Arc::clone(&self.tables)),
                text,
                file_name,
            ),
            DocumentFamily::Unknown => {
                GenericExtractor::new(text, file_name, Arc::clone(&self.tables)).run()
            }
        };

        self.normalize(family, raw, file_name)
    }

    /// A family extractor that gives up is answered with the generic
    /// pipeline, or with an empty field map when the fallback is off.
    fn run_family(
        &self,
        mut extractor: impl DocumentExtractor,
        text: &str,
        file_name: &str,
    ) -> RawDocument {
        match extractor.extract() {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%error, file = %file_name, "family extractor failed");
                if self.fallback_to_generic {
                    GenericExtractor::new(text, file_name, Arc::clone(&self.tables)).run()
                } else {
                    RawDocument::default()
                }
            }
        }
    }

    fn normalize(
        &self,
        family: DocumentFamily,
        raw: RawDocument,
        file_name: &str,
    ) -> DocumentRecord {
        let document_type = match family {
            DocumentFamily::DeliveryNote => DocumentType::DeliveryNote,
            DocumentFamily::Invoice | DocumentFamily::Unknown => DocumentType::Invoice,
        };
        let mut record = DocumentRecord::new(document_type);

        record.document_number = raw.document_number;
        record.date = raw.date;
        record.client_code = raw.client_code;
        record.client_name = raw.client_name;
        record.vat_number = raw.vat_number;
        // Documents rarely print a separate fiscal code; the VAT number
        // stands in when they do not.
        record.fiscal_code = if raw.fiscal_code.is_empty() {
            record.vat_number.clone()
        } else {
            raw.fiscal_code
        };
        record.order_reference = raw.order_reference;
        record.order_date = raw.order_date;
        record.delivery_address = raw.delivery_address;
        record.delivery_date = raw.delivery_date;
        record.items = raw.items;
        record.subtotal = raw.totals.subtotal;
        record.vat4 = raw.totals.vat4;
        record.vat10 = raw.totals.vat10;
        record.vat = raw.totals.vat;
        // The printed total wins over the computed breakdown.
        record.total = raw.printed_total.unwrap_or(raw.totals.total);
        record.source_file_name = file_name.to_string();

        if self.apply_short_names && !record.client_name.is_empty() {
            if let Some(short) = self.tables.short_client_name(&record.client_name) {
                record.client_name = short.to_string();
            }
        }

        record
    }
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ddt_text() -> &'static str {
        "ALFIERI SPECIALITA' ALIMENTARI S.P.A.\n\
         C.SO G. MARCONI 10/E 12050 MAGLIANO ALFIERI CN\n\
         P.IVA 03247720042\n\
         \n\
         Spett.le\n\
         DONAC S.R.L.\n\
         VIA SALUZZO, 65\n\
         12038 SAVIGLIANO CN\n\
         P.IVA 04064060041 Operatore 1\n\
         \n\
         4521 19/05/25 1 20322 DONAC S.R.L.\n\
         060041 AGNOLOTTI CARNE PZ 10 4,50 45,00 10\n\
         Totale documento € 49,50\n"
    }

    #[test]
    fn test_tuple_line_record() {
        let text = "4521 19/05/25 1 20322 MARIO ROSSI SRL\n\
                    060041 AGNOLOTTI CARNE PZ 10 4,50 45,00 10\n";
        let record = DocumentParser::new().extract(text, "DDT 2025.pdf");
        assert_eq!(record.document_type, DocumentType::DeliveryNote);
        assert_eq!(record.document_number, "4521");
        assert_eq!(record.date, "19/05/2025");
        assert_eq!(record.client_code, "20322");
        assert_eq!(record.client_name, "MARIO ROSSI SRL");
        assert_eq!(record.subtotal, Decimal::new(4500, 2));
        assert_eq!(record.vat10, Decimal::new(450, 2));
        assert_eq!(record.total, Decimal::new(4950, 2));
    }

    #[test]
    fn test_duplicate_columns_yield_single_address() {
        let text = "ALFIERI SPECIALITA' ALIMENTARI S.P.A.\n\
                    BOTTEGA DELLA CARNE  BOTTEGA DELLA CARNE\n\
                    DI AVIDANO SILVANA\n\
                    VIA ROMA, 1\n\
                    12051 ALBA CN\n\
                    Pagamento: RD\n\
                    D.D.T. 4253 21/05/25\n";
        let record = DocumentParser::new().extract(text, "scan.pdf");
        assert_eq!(record.delivery_address, "VIA ROMA, 1 12051 ALBA CN");
        assert_eq!(record.client_name, "Bottega Della Carne");
    }

    #[test]
    fn test_template_invoice_resolves_mapped_address() {
        let record =
            DocumentParser::new().extract("FATTURA", "FTV_701029_2025_20001_4915_21052025.PDF");
        assert_eq!(record.document_type, DocumentType::Invoice);
        assert_eq!(record.document_number, "20001");
        assert_eq!(record.client_name, "");
        assert_eq!(record.delivery_address, "VIA CAVOUR, 61 14100 ASTI AT");
    }

    #[test]
    fn test_reduced_vat_rate_feeds_vat4() {
        let text = "4521 19/05/25 1 20322 MARIO ROSSI SRL\n\
                    060023 TAJARIN UOVO KG 5 9,00 45,00 04\n";
        let record = DocumentParser::new().extract(text, "DDT 2025.pdf");
        assert_eq!(record.vat4, Decimal::new(180, 2));
        assert_eq!(record.vat10, Decimal::ZERO);
        assert_eq!(record.total, Decimal::new(4680, 2));
    }

    #[test]
    fn test_unknown_family_uses_generic_pipeline() {
        let record = DocumentParser::new().extract("nothing recognizable", "scan003.pdf");
        assert_eq!(record.document_type, DocumentType::Invoice);
        assert_eq!(record.document_number, "");
        assert!(record.items.is_empty());
    }

    #[test]
    fn test_family_failure_falls_back_to_generic() {
        // Nothing a delivery-note cascade recognizes, but the generic
        // labeled-client scan still lands.
        let text = "Cliente: PANETTERIA PISTONE RENZO";
        let with_fallback = DocumentParser::new().extract(text, "DDT_x.pdf");
        assert_eq!(with_fallback.document_type, DocumentType::DeliveryNote);
        assert_eq!(with_fallback.client_name, "Panetteria Pistone");

        let without = DocumentParser::new()
            .with_fallback_to_generic(false)
            .extract(text, "DDT_x.pdf");
        assert_eq!(without.client_name, "");
    }

    #[test]
    fn test_short_name_post_pass_toggle() {
        let mapped = DocumentParser::new().extract(ddt_text(), "doc.txt");
        assert_eq!(mapped.client_name, "Donac");

        let verbatim = DocumentParser::new()
            .with_short_names(false)
            .extract(ddt_text(), "doc.txt");
        assert_eq!(verbatim.client_name, "DONAC S.R.L.");
    }

    #[test]
    fn test_fiscal_code_defaults_to_vat_number() {
        let record = DocumentParser::new().extract(ddt_text(), "doc.txt");
        assert_eq!(record.vat_number, "04064060041");
        assert_eq!(record.fiscal_code, "04064060041");
    }

    #[test]
    fn test_printed_total_wins() {
        let record = DocumentParser::new().extract(ddt_text(), "doc.txt");
        // Computed breakdown says 49.50 too, but the printed figure is
        // what lands in the record even when they disagree by rounding.
        assert_eq!(record.total, Decimal::new(4950, 2));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let parser = DocumentParser::new();
        let first = parser.extract(ddt_text(), "doc.txt");
        let second = parser.extract(ddt_text(), "doc.txt");
        assert_ne!(first.id, second.id);
        assert_eq!(first.document_number, second.document_number);
        assert_eq!(first.client_name, second.client_name);
        assert_eq!(first.delivery_address, second.delivery_address);
        assert_eq!(first.total, second.total);
        assert_eq!(first.items, second.items);
    }

    #[test]
    fn test_never_panics_on_empty_input() {
        let record = DocumentParser::new().extract("", "");
        assert_eq!(record.document_type, DocumentType::Invoice);
        assert_eq!(record.total, Decimal::ZERO);
        assert!(record.items.is_empty());
    }
}
