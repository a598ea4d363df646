//! Invoice (fattura) field extractor.
//!
//! Invoices come in two shapes: populated documents with a printed
//! consignee block, and pre-printed "empty templates" whose client and
//! address boxes are blank. Empty templates are recognized up front and
//! answered from the cross-reference tables only.

use std::sync::Arc;

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::LookupTables;

use super::context::ExtractionContext;
use super::parser::RawDocument;
use super::rules::address::clamp_boundary;
use super::rules::patterns::*;
use super::rules::{
    calculate_totals, extract_date, extract_delivery_date, extract_document_total, extract_items,
    extract_order_date, extract_spett_client, extract_suffixed_company, normalize_client_name,
    AddressResolver,
};
use super::{DocumentExtractor, DocumentFamily, Result};

/// Extractor for fatture.
pub struct InvoiceExtractor {
    text: String,
    file_name: String,
    context: ExtractionContext,
    tables: Arc<LookupTables>,
}

impl InvoiceExtractor {
    pub fn new(
        text: impl Into<String>,
        file_name: impl Into<String>,
        tables: Arc<LookupTables>,
    ) -> Self {
        Self {
            text: text.into(),
            file_name: file_name.into(),
            context: ExtractionContext::new(),
            tables,
        }
    }

    /// An invoice is an empty template when the filename carries the
    /// `FTV` pre-print marker, or when the consignee label and the
    /// delivery label are both present with no street token between
    /// them. Anything printed in that gap means a real client block.
    fn is_empty_template(&self) -> bool {
        if self.file_name.to_uppercase().contains("FTV") {
            return true;
        }
        let Some(spett) = SPETT_LABEL.find(&self.text) else {
            return false;
        };
        let Some(luogo) = LUOGO_CONSEGNA_LABEL.find(&self.text) else {
            return false;
        };
        if luogo.start() < spett.end() {
            return false;
        }
        !STREET_TOKEN_ANYWHERE.is_match(&self.text[spett.end()..luogo.start()])
    }

    fn document_number(&mut self) -> String {
        if let Some(value) = self.context.get("document_number") {
            return value.to_string();
        }
        let value = self.find_document_number().unwrap_or_default();
        self.context.store("document_number", value)
    }

    fn find_document_number(&self) -> Option<String> {
        if let Some(caps) = FILE_INVOICE_NUMBER.captures(&self.file_name) {
            let number = caps[1].to_string();
            debug!(%number, "document number from file name");
            return Some(number);
        }
        for pattern in INVOICE_NUMBER_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(&self.text) {
                return Some(caps[1].to_string());
            }
        }
        None
    }

    fn date(&mut self) -> String {
        if let Some(value) = self.context.get("date") {
            return value.to_string();
        }
        let value = extract_date(&self.text).unwrap_or_default();
        self.context.store("date", value)
    }

    fn client_code(&mut self) -> String {
        if let Some(value) = self.context.get("client_code") {
            return value.to_string();
        }
        let value = CLIENT_CODE_LABELED
            .captures(&self.text)
            .map(|caps| caps[1].to_string())
            .unwrap_or_default();
        self.context.store("client_code", value)
    }

    /// Empty templates get no name at all: a blank block must stay
    /// blank instead of picking up whatever text sits nearby.
    fn client_name(&mut self) -> String {
        if let Some(value) = self.context.get("client_name") {
            return value.to_string();
        }
        let value = if self.is_empty_template() {
            String::new()
        } else {
            let raw = self
                .section_client()
                .or_else(|| extract_spett_client(&self.text))
                .or_else(|| self.suffixed_client());
            normalize_client_name(raw.as_deref().unwrap_or(""))
        };
        self.context.store("client_name", value)
    }

    /// Name lines from the consignee section, bounded at the invoice
    /// header. The name closes at a legal suffix or an address line.
    fn section_client(&self) -> Option<String> {
        let caps = INVOICE_CLIENT_SECTION.captures(&self.text)?;
        let mut parts: Vec<String> = Vec::new();
        for line in caps.get(1)?.as_str().lines() {
            let line = line.trim();
            if line.is_empty() {
                if parts.is_empty() {
                    continue;
                }
                break;
            }
            if CLIENT_STOP_LINE.is_match(line) {
                break;
            }
            parts.push(line.to_string());
            if LEGAL_SUFFIX_LINE_END.is_match(line) {
                break;
            }
        }
        let name = parts.join(" ");
        (!name.is_empty()).then_some(name)
    }

    fn suffixed_client(&self) -> Option<String> {
        extract_suffixed_company(&self.text, &self.tables.issuer.name_keywords)
    }

    fn vat_number(&mut self) -> String {
        if let Some(value) = self.context.get("vat_number") {
            return value.to_string();
        }
        let value = self.find_vat_number().unwrap_or_default();
        self.context.store("vat_number", value)
    }

    /// Labeled scan on a window after the client block, then the whole
    /// text. The issuer's own number is never a valid capture.
    fn find_vat_number(&mut self) -> Option<String> {
        let client = self.client_name();
        let start = if client.is_empty() {
            0
        } else {
            self.text
                .find(&client)
                .map(|at| at + client.len())
                .unwrap_or(0)
        };
        let end = clamp_boundary(&self.text, start.saturating_add(500));
        let window = &self.text[start..end];

        VAT_LABELED
            .captures_iter(window)
            .chain(GENERIC_VAT.captures_iter(&self.text))
            .map(|caps| caps[1].to_string())
            .find(|candidate| candidate != &self.tables.issuer.vat_number)
    }

    fn order_reference(&mut self) -> String {
        if let Some(value) = self.context.get("order_reference") {
            return value.to_string();
        }
        let value = self.find_order_reference().unwrap_or_default();
        self.context.store("order_reference", value)
    }

    /// Labeled order references first; the ODV voucher code doubles as
    /// the order reference on template invoices.
    fn find_order_reference(&self) -> Option<String> {
        for pattern in ORDER_REFERENCE_PATTERNS.iter() {
            for caps in pattern.captures_iter(&self.text) {
                let value = caps[1].trim().to_string();
                if ORDER_REFERENCE_STOPWORDS
                    .iter()
                    .any(|word| value.eq_ignore_ascii_case(word))
                {
                    continue;
                }
                return Some(value);
            }
        }
        ODV_NUMBER
            .captures(&self.text)
            .map(|caps| caps[1].to_string())
    }

    fn order_date(&mut self) -> String {
        if let Some(value) = self.context.get("order_date") {
            return value.to_string();
        }
        let value = extract_order_date(&self.text).unwrap_or_default();
        self.context.store("order_date", value)
    }

    fn delivery_date(&mut self) -> String {
        if let Some(value) = self.context.get("delivery_date") {
            return value.to_string();
        }
        let value = extract_delivery_date(&self.text).unwrap_or_default();
        self.context.store("delivery_date", value)
    }

    fn delivery_address(&mut self) -> String {
        if let Some(value) = self.context.get("delivery_address") {
            return value.to_string();
        }
        let value = self.find_delivery_address();
        self.context.store("delivery_address", value)
    }

    fn find_delivery_address(&mut self) -> String {
        if self.is_empty_template() {
            return self.lookup_address().unwrap_or_default();
        }
        let client = self.client_name();
        AddressResolver::new(&self.tables).resolve(&self.text, &self.file_name, &client)
    }

    /// Empty templates carry no printed address, so only the
    /// cross-reference tables may answer: the filename's internal code
    /// first, then the ODV voucher. A miss stays blank rather than
    /// falling back to anything scanned from the sheet.
    fn lookup_address(&self) -> Option<String> {
        if let Some(caps) = FILE_INTERNAL_CODE.captures(&self.file_name) {
            let code = caps[1].to_string();
            if let Some(address) = self.tables.internal_code_delivery.get(&code) {
                debug!(%code, "delivery address from internal-code table");
                return Some(address.clone());
            }
        }
        if let Some(caps) = ODV_NUMBER.captures(&self.text) {
            let code = caps[1].to_string();
            if let Some(address) = self.tables.odv_delivery.get(&code) {
                debug!(%code, "delivery address from ODV table");
                return Some(address.clone());
            }
        }
        None
    }
}

impl DocumentExtractor for InvoiceExtractor {
    fn family(&self) -> DocumentFamily {
        DocumentFamily::Invoice
    }

    fn extract(&mut self) -> Result<RawDocument> {
        if self.text.trim().is_empty() {
            return Err(ExtractionError::EmptyText);
        }
        debug!(file = %self.file_name, "extracting invoice fields");

        let items = extract_items(&self.text);
        let totals = calculate_totals(&items);
        let raw = RawDocument {
            document_number: self.document_number(),
            date: self.date(),
            client_code: self.client_code(),
            client_name: self.client_name(),
            vat_number: self.vat_number(),
            fiscal_code: String::new(),
            order_reference: self.order_reference(),
            order_date: self.order_date(),
            delivery_address: self.delivery_address(),
            delivery_date: self.delivery_date(),
            printed_total: extract_document_total(&self.text),
            items,
            totals,
        };

        if raw.document_number.is_empty()
            && raw.date.is_empty()
            && raw.client_name.is_empty()
            && raw.delivery_address.is_empty()
            && raw.items.is_empty()
        {
            return Err(ExtractionError::NoData);
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use super::*;

    fn tables() -> Arc<LookupTables> {
        Arc::new(LookupTables::default())
    }

    fn invoice_fixture() -> &'static str {
        "ALFIERI SPECIALITA' ALIMENTARI S.P.A.\n\
         C.SO G. MARCONI 10/E 12050 MAGLIANO ALFIERI CN\n\
         P.IVA 03247720042\n\
         \n\
         Spett.le\n\
         MAROTTA S.R.L.\n\
         VIA CHIVASSO, 7\n\
         15020 MURISENGO AL\n\
         P.IVA 08238420010\n\
         Codice cliente: 20391\n\
         Tipo documento FATTURA\n\
         FATTURA N° 4915 del 21/05/2025\n\
         Luogo di consegna: VIA CHIVASSO, 7 15020 MURISENGO AL\n\
         060041 AGNOLOTTI CARNE PZ 10 4,50 45,00 10\n\
         Totale documento € 49,50\n"
    }

    #[test]
    fn test_document_number_from_file_name() {
        let mut extractor =
            InvoiceExtractor::new("x", "FTV_701029_2025_20001_4915_21052025.PDF", tables());
        assert_eq!(extractor.document_number(), "20001");
    }

    #[test]
    fn test_document_number_from_body() {
        let mut extractor = InvoiceExtractor::new("FATTURA N° 4915", "scan.pdf", tables());
        assert_eq!(extractor.document_number(), "4915");
    }

    #[test]
    fn test_client_code_from_label() {
        let mut extractor =
            InvoiceExtractor::new("Codice cliente: 20391", "FT_4915.txt", tables());
        assert_eq!(extractor.client_code(), "20391");
    }

    #[test]
    fn test_template_file_name_maps_internal_code() {
        let mut extractor = InvoiceExtractor::new(
            "FATTURA N° 20001",
            "FTV_701029_2025_20001_4915_21052025.PDF",
            tables(),
        );
        assert_eq!(extractor.client_name(), "");
        assert_eq!(extractor.delivery_address(), "VIA CAVOUR, 61 14100 ASTI AT");
    }

    #[test]
    fn test_template_markers_map_odv_voucher() {
        let text = "FATTURA N° 4915\n\
                    Spett.le\n\
                    \n\
                    Luogo di consegna\n\
                    \n\
                    ODV Nr. 507A865AS02786 del 20/05/2025\n";
        let mut extractor = InvoiceExtractor::new(text, "FT_4915.txt", tables());
        assert_eq!(extractor.client_name(), "");
        assert_eq!(
            extractor.delivery_address(),
            "VIA CHIVASSO, 7 15020 MURISENGO AL"
        );
        assert_eq!(extractor.order_reference(), "507A865AS02786");
    }

    #[test]
    fn test_internal_code_beats_odv_voucher() {
        let mut extractor = InvoiceExtractor::new(
            "ODV Nr. 507A085AS00704",
            "FTV_701134_2025_20002_4916_22052025.PDF",
            tables(),
        );
        assert_eq!(extractor.delivery_address(), "VIA FONTANA, 4 14100 ASTI AT");
    }

    #[test]
    fn test_template_without_lookup_hit_stays_blank() {
        let mut extractor =
            InvoiceExtractor::new("FATTURA", "FTV_999999_2025_1_1_1.PDF", tables());
        assert_eq!(extractor.delivery_address(), "");
    }

    #[test]
    fn test_populated_invoice_fields() {
        let mut extractor = InvoiceExtractor::new(invoice_fixture(), "FT_4915.txt", tables());
        assert_eq!(extractor.client_name(), "MAROTTA S.R.L.");
        assert_eq!(extractor.client_code(), "20391");
        assert_eq!(extractor.vat_number(), "08238420010");
        assert_eq!(extractor.date(), "21/05/2025");
        assert_eq!(
            extractor.delivery_address(),
            "VIA CHIVASSO, 7 15020 MURISENGO AL"
        );
    }

    #[test]
    fn test_street_between_markers_keeps_client() {
        let text = "Spett.le\n\
                    ROSSI SRL\n\
                    VIA ROMA, 1 10121 TORINO TO\n\
                    Luogo di consegna: VIA ROMA, 1 10121 TORINO TO\n";
        let mut extractor = InvoiceExtractor::new(text, "FT_1.txt", tables());
        assert_eq!(extractor.client_name(), "ROSSI SRL");
    }

    #[test]
    fn test_extract_assembles_raw_document() {
        let mut extractor = InvoiceExtractor::new(invoice_fixture(), "FT_4915.txt", tables());
        let raw = extractor.extract().unwrap();
        assert_eq!(raw.document_number, "4915");
        assert_eq!(raw.client_name, "MAROTTA S.R.L.");
        assert_eq!(raw.items.len(), 1);
        assert_eq!(raw.totals.subtotal, Decimal::new(4500, 2));
        assert_eq!(raw.printed_total, Some(Decimal::new(4950, 2)));
    }

    #[test]
    fn test_empty_text_is_an_error() {
        let mut extractor = InvoiceExtractor::new("  \n ", "FT_1.txt", tables());
        assert!(matches!(extractor.extract(), Err(ExtractionError::EmptyText)));
    }

    #[test]
    fn test_no_usable_fields_is_an_error() {
        let mut extractor = InvoiceExtractor::new("lorem ipsum dolor", "scan.pdf", tables());
        assert!(matches!(extractor.extract(), Err(ExtractionError::NoData)));
    }
}
