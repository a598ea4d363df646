//! Delivery-note (DDT) field extractor.
//!
//! Cascades follow the printed layout of the issuer's transport documents:
//! filename tokens first, then the header tuple row, labeled sections, and
//! free-text scans as a last resort.

use std::sync::Arc;

use regex::Regex;
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
    split_delivery_section, AddressResolver, DateExtractor, FieldExtractor,
};
use super::{DocumentExtractor, DocumentFamily, Result};

/// Extractor for documenti di trasporto.
pub struct DdtExtractor {
    text: String,
    file_name: String,
    lines: Vec<String>,
    context: ExtractionContext,
    tables: Arc<LookupTables>,
}

impl DdtExtractor {
    pub fn new(
        text: impl Into<String>,
        file_name: impl Into<String>,
        tables: Arc<LookupTables>,
    ) -> Self {
        let text = text.into();
        let lines = text.lines().map(str::to_string).collect();
        Self {
            text,
            file_name: file_name.into(),
            lines,
            context: ExtractionContext::new(),
            tables,
        }
    }

    fn document_number(&mut self) -> String {
        if let Some(value) = self.context.get("document_number") {
            return value.to_string();
        }
        let value = self.find_document_number().unwrap_or_default();
        self.context.store("document_number", value)
    }

    /// Filename tokens win over body scans: a `DDV_<nnnnnn>` name embeds
    /// the six-digit number directly.
    fn find_document_number(&self) -> Option<String> {
        for pattern in FILE_DELIVERY_NUMBER_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(&self.file_name) {
                let number = caps[1].to_string();
                debug!(%number, "document number from file name");
                return Some(number);
            }
        }
        for pattern in DELIVERY_NUMBER_PATTERNS.iter() {
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
        let value = self.find_client_code().unwrap_or_default();
        self.context.store("client_code", value)
    }

    /// The code sits after the number/date/page triple on the header row;
    /// anchoring on the resolved document number beats the loose tuple.
    fn find_client_code(&mut self) -> Option<String> {
        let number = self.document_number();
        if !number.is_empty() {
            let anchored = format!(
                r"{}\s+\d{{2}}/\d{{2}}/\d{{2}}\s+\d+\s+(\d{{4,5}})",
                regex::escape(&number)
            );
            if let Ok(pattern) = Regex::new(&anchored) {
                if let Some(caps) = pattern.captures(&self.text) {
                    return Some(caps[1].to_string());
                }
            }
        }
        HEADER_TUPLE
            .captures(&self.text)
            .map(|caps| caps[3].to_string())
    }

    fn client_name(&mut self) -> String {
        if let Some(value) = self.context.get("client_name") {
            return value.to_string();
        }
        let raw = extract_spett_client(&self.text)
            .or_else(|| self.tuple_client())
            .or_else(|| self.section_client())
            .or_else(|| self.code_adjacent_client())
            .or_else(|| self.suffixed_client());
        let value = normalize_client_name(raw.as_deref().unwrap_or(""));
        self.context.store("client_name", value)
    }

    /// Name from the header tuple row: the text after the
    /// `<number> <date> <page> <code>` run.
    ///
    /// Suffix-terminated captures come first; the loose capture stitches
    /// names split across rows (a leading "DI ..." tail belongs to the
    /// previous line, a trailing conjunction pulls in the next).
    fn tuple_client(&self) -> Option<String> {
        if let Some(caps) = HEADER_TUPLE_COMPANY.captures(&self.text) {
            return Some(caps[4].trim().to_string());
        }
        if let Some(caps) = CLIENT_LEGAL_FORM.captures(&self.text) {
            return Some(caps[4].trim().to_string());
        }

        for (i, line) in self.lines.iter().enumerate() {
            let Some(caps) = HEADER_TUPLE.captures(line) else {
                continue;
            };
            let mut name = caps[4].trim().to_string();
            if let Some(gap) = MULTI_GAP.find(&name) {
                name.truncate(gap.start());
                name = name.trim_end().to_string();
            }
            if name.is_empty() {
                continue;
            }

            if NAME_LEADING_CONTINUATION.is_match(&name) {
                if let Some(prev) = i.checked_sub(1).and_then(|p| self.lines.get(p)) {
                    let prev = prev.trim();
                    if !prev.is_empty() && !CLIENT_STOP_LINE.is_match(prev) {
                        name = format!("{prev} {name}");
                    }
                }
            } else if NAME_TRAILING_CONTINUATION.is_match(&name)
                || name.ends_with('&')
                || name.ends_with(',')
            {
                if let Some(next) = self.lines.get(i + 1) {
                    let mut next = next.trim().to_string();
                    if let Some(gap) = MULTI_GAP.find(&next) {
                        next.truncate(gap.start());
                    }
                    let next = next.trim();
                    if !next.is_empty() && !CLIENT_STOP_LINE.is_match(next) {
                        name = format!("{name} {next}");
                    }
                }
            }
            return Some(name);
        }
        None
    }

    fn section_client(&self) -> Option<String> {
        let result = split_delivery_section(&self.text)?;
        (!result.client.is_empty()).then_some(result.client)
    }

    fn code_adjacent_client(&self) -> Option<String> {
        CLIENT_CODE_NAME
            .captures(&self.text)
            .map(|caps| caps[2].trim().to_string())
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

    /// The counterparty VAT sits near the client block, so labeled scans
    /// run on a window after the resolved name. The issuer's own number
    /// is never a valid capture, whichever pattern produced it.
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
            .chain(VAT_BEFORE_KEYWORD.captures_iter(window))
            .chain(VAT_STANDALONE.captures_iter(window))
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
        None
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
        let value = self.find_delivery_date().unwrap_or_default();
        self.context.store("delivery_date", value)
    }

    /// Labeled patterns first; otherwise the header tuple row sometimes
    /// carries a second date column next to the document date.
    fn find_delivery_date(&mut self) -> Option<String> {
        if let Some(date) = extract_delivery_date(&self.text) {
            return Some(date);
        }
        let document_date = self.date();
        let line = self.lines.iter().find(|line| HEADER_TUPLE.is_match(line))?;
        DateExtractor::new()
            .extract_all(line)
            .into_iter()
            .map(|hit| hit.value)
            .find(|date| *date != document_date)
    }

    fn delivery_address(&mut self) -> String {
        if let Some(value) = self.context.get("delivery_address") {
            return value.to_string();
        }
        let value = self.find_delivery_address();
        self.context.store("delivery_address", value)
    }

    /// The two-column header section is the family-specific strategy; the
    /// shared resolver pipeline covers everything it misses. Section
    /// candidates still go through the resolver's cleanup so known-client
    /// overrides apply to them as well.
    fn find_delivery_address(&mut self) -> String {
        let client = self.client_name();
        let resolver = AddressResolver::new(&self.tables);
        if let Some(result) = split_delivery_section(&self.text) {
            if let Some(address) = resolver.clean_and_validate(&result.delivery_address, &client) {
                debug!(address = %address, "delivery address from header section");
                return address;
            }
        }
        resolver.resolve(&self.text, &self.file_name, &client)
    }
}

impl DocumentExtractor for DdtExtractor {
    fn family(&self) -> DocumentFamily {
        DocumentFamily::DeliveryNote
    }

    fn extract(&mut self) -> Result<RawDocument> {
        if self.text.trim().is_empty() {
            return Err(ExtractionError::EmptyText);
        }
        debug!(file = %self.file_name, "extracting delivery note fields");

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
            && raw.items.is_empty()
        {
            return Err(ExtractionError::NoData);
        }
        Ok(raw)
    }
}
