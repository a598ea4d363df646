//! Best-effort extractor for unclassified documents.
//!
//! The reduced pipeline runs only the cascades that survive arbitrary
//! layouts: document number, date, client name, VAT number, line items,
//! and a whole-text address scan. Order and delivery fields stay blank.

use std::sync::Arc;

use tracing::debug;

use crate::models::LookupTables;

use super::context::ExtractionContext;
use super::parser::RawDocument;
use super::rules::patterns::*;
use super::rules::{
    calculate_totals, extract_date, extract_items, extract_spett_client, extract_suffixed_company,
    is_valid_delivery_address, normalize_client_name,
};
use super::{DocumentExtractor, DocumentFamily, Result};

/// Fallback extractor for documents no family matcher claimed.
pub struct GenericExtractor {
    text: String,
    file_name: String,
    context: ExtractionContext,
    tables: Arc<LookupTables>,
}

impl GenericExtractor {
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

    /// Run the reduced pipeline. Unlike the family extractors this never
    /// fails; fields that resolve to nothing stay empty.
    pub fn run(&mut self) -> RawDocument {
        debug!(file = %self.file_name, "extracting with generic fallback");

        let items = extract_items(&self.text);
        let totals = calculate_totals(&items);
        RawDocument {
            document_number: self.document_number(),
            date: self.date(),
            client_code: String::new(),
            client_name: self.client_name(),
            vat_number: self.vat_number(),
            fiscal_code: String::new(),
            order_reference: String::new(),
            order_date: String::new(),
            delivery_address: self.delivery_address(),
            delivery_date: String::new(),
            printed_total: None,
            items,
            totals,
        }
    }

    fn document_number(&mut self) -> String {
        if let Some(value) = self.context.get("document_number") {
            return value.to_string();
        }
        let value = INVOICE_NUMBER_PATTERNS
            .iter()
            .chain(DELIVERY_NUMBER_PATTERNS.iter())
            .find_map(|pattern| pattern.captures(&self.text))
            .map(|caps| caps[1].to_string())
            .unwrap_or_default();
        self.context.store("document_number", value)
    }

    fn date(&mut self) -> String {
        if let Some(value) = self.context.get("date") {
            return value.to_string();
        }
        let value = extract_date(&self.text).unwrap_or_default();
        self.context.store("date", value)
    }

    fn client_name(&mut self) -> String {
        if let Some(value) = self.context.get("client_name") {
            return value.to_string();
        }
        let raw = self
            .labeled_client()
            .or_else(|| extract_spett_client(&self.text))
            .or_else(|| extract_suffixed_company(&self.text, &self.tables.issuer.name_keywords));
        let value = normalize_client_name(raw.as_deref().unwrap_or(""));
        self.context.store("client_name", value)
    }

    /// "Cliente:"/"Destinatario:" labels. A "Luogo di consegna" column
    /// header caught behind the label is not a name.
    fn labeled_client(&self) -> Option<String> {
        for pattern in CLIENT_SIMPLE_PATTERNS.iter() {
            for caps in pattern.captures_iter(&self.text) {
                let value = caps[1].trim();
                if value.is_empty() || value.to_uppercase().starts_with("LUOGO") {
                    continue;
                }
                return Some(value.to_string());
            }
        }
        None
    }

    fn vat_number(&mut self) -> String {
        if let Some(value) = self.context.get("vat_number") {
            return value.to_string();
        }
        let value = GENERIC_VAT
            .captures_iter(&self.text)
            .map(|caps| caps[1].to_string())
            .find(|candidate| candidate != &self.tables.issuer.vat_number)
            .unwrap_or_default();
        self.context.store("vat_number", value)
    }

    fn delivery_address(&mut self) -> String {
        if let Some(value) = self.context.get("delivery_address") {
            return value.to_string();
        }
        let value = self.find_delivery_address().unwrap_or_default();
        self.context.store("delivery_address", value)
    }

    fn find_delivery_address(&self) -> Option<String> {
        let candidates = GENERIC_GEOGRAPHIC
            .captures_iter(&self.text)
            .map(|caps| caps[1].to_string())
            .chain(
                GENERIC_ADDRESS
                    .find_iter(&self.text)
                    .map(|hit| hit.as_str().to_string()),
            );
        for candidate in candidates {
            let candidate = candidate.split_whitespace().collect::<Vec<_>>().join(" ");
            if is_valid_delivery_address(&candidate)
                && !self.tables.is_issuer_address(&candidate)
                && !self.tables.is_carrier_address(&candidate)
            {
                debug!(address = %candidate, "delivery address from generic scan");
                return Some(candidate);
            }
        }
        None
    }
}

impl DocumentExtractor for GenericExtractor {
    fn family(&self) -> DocumentFamily {
        DocumentFamily::Unknown
    }

    fn extract(&mut self) -> Result<RawDocument> {
        Ok(self.run())
    }
}
