//! Canonical document models for Italian trade documents (DDT and invoices).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The canonical extraction output for one trade document.
///
/// Every field the extractor fails to resolve keeps its default (`""` for
/// strings, `0` for amounts); absence is never an error state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Opaque unique identifier, generated at record creation.
    pub id: Uuid,

    /// Document family.
    pub document_type: DocumentType,

    /// Document number as printed (e.g. "4521").
    pub document_number: String,

    /// Document date, dd/mm/yyyy after year normalization.
    pub date: String,

    /// Numeric client code from the document header.
    pub client_code: String,

    /// Counterparty display name, normalized.
    pub client_name: String,

    /// Counterparty VAT number (11 digits).
    pub vat_number: String,

    /// Counterparty fiscal code; defaults to the VAT number.
    pub fiscal_code: String,

    /// Referenced order number, when the document cites one.
    pub order_reference: String,

    /// Date of the referenced order, dd/mm/yyyy.
    pub order_date: String,

    /// Validated delivery address as a single line.
    pub delivery_address: String,

    /// Delivery date, when stated separately from the document date.
    pub delivery_date: String,

    /// Line items in document order.
    pub items: Vec<LineItem>,

    /// Sum of line totals, VAT excluded.
    pub subtotal: Decimal,

    /// VAT collected at the 4% rate.
    pub vat4: Decimal,

    /// VAT collected at the 10% rate.
    pub vat10: Decimal,

    /// Total VAT across all rates.
    pub vat: Decimal,

    /// Document total. Printed value when found, otherwise subtotal + vat.
    pub total: Decimal,

    /// Name of the source file the text came from.
    pub source_file_name: String,

    /// When this record was created.
    pub imported_at: DateTime<Utc>,
}

/// Trade document family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Delivery note (documento di trasporto).
    DeliveryNote,
    /// Invoice (fattura), including the empty-template variant.
    Invoice,
}

impl Default for DocumentType {
    fn default() -> Self {
        Self::DeliveryNote
    }
}

/// A single product line on the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product code (6 digits, letter-prefixed variants, or PIRR codes).
    pub code: String,

    /// Product description between code and unit of measure.
    pub description: String,

    /// Quantity. Lines with zero quantity are never emitted.
    pub quantity: u32,

    /// Unit of measure (PZ, KG, CF, LT, MT, CT).
    pub unit: String,

    /// Unit price, VAT excluded.
    pub price: Decimal,

    /// Line total, VAT excluded.
    pub total: Decimal,

    /// Applicable VAT rate.
    pub vat_rate: VatRate,
}

/// Italian VAT rates appearing on these documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VatRate {
    /// Reduced rate: 4%
    #[serde(rename = "4")]
    Reduced4,

    /// Standard reduced rate: 10%
    #[serde(rename = "10")]
    Standard10,

    /// Full rate: 22%
    #[serde(rename = "22")]
    Full22,
}

impl Default for VatRate {
    fn default() -> Self {
        Self::Standard10
    }
}

impl VatRate {
    /// Get the rate as a decimal multiplier (e.g. 0.04 for 4%).
    pub fn as_decimal(&self) -> Decimal {
        match self {
            VatRate::Reduced4 => Decimal::new(4, 2),
            VatRate::Standard10 => Decimal::new(10, 2),
            VatRate::Full22 => Decimal::new(22, 2),
        }
    }

    /// Parse the two-digit VAT code printed on the line (e.g. "04", "10").
    ///
    /// Unrecognized codes map to `None`; callers default to 10%.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "04" | "4" => Some(VatRate::Reduced4),
            "10" => Some(VatRate::Standard10),
            "22" => Some(VatRate::Full22),
            _ => None,
        }
    }

    /// Format for display.
    pub fn display(&self) -> String {
        match self {
            VatRate::Reduced4 => "4%".to_string(),
            VatRate::Standard10 => "10%".to_string(),
            VatRate::Full22 => "22%".to_string(),
        }
    }
}

/// Aggregated monetary totals for an item list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of line totals, VAT excluded.
    pub subtotal: Decimal,

    /// VAT collected at 4%.
    pub vat4: Decimal,

    /// VAT collected at 10%.
    pub vat10: Decimal,

    /// Total VAT across all rates.
    pub vat: Decimal,

    /// subtotal + vat.
    pub total: Decimal,
}

impl DocumentRecord {
    /// Create an empty record of the given family with fresh provenance.
    pub fn new(document_type: DocumentType) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_type,
            document_number: String::new(),
            date: String::new(),
            client_code: String::new(),
            client_name: String::new(),
            vat_number: String::new(),
            fiscal_code: String::new(),
            order_reference: String::new(),
            order_date: String::new(),
            delivery_address: String::new(),
            delivery_date: String::new(),
            items: Vec::new(),
            subtotal: Decimal::ZERO,
            vat4: Decimal::ZERO,
            vat10: Decimal::ZERO,
            vat: Decimal::ZERO,
            total: Decimal::ZERO,
            source_file_name: String::new(),
            imported_at: Utc::now(),
        }
    }

    /// Validate the record and return any soft issues found.
    ///
    /// Issues are informational for display; an issue-laden record is still
    /// a valid extraction result.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.document_number.is_empty() {
            issues.push("Missing document number".to_string());
        }

        if self.date.is_empty() {
            issues.push("Missing document date".to_string());
        }

        if self.client_name.is_empty() {
            issues.push("Missing client name".to_string());
        }

        if self.delivery_address.is_empty() {
            issues.push("Missing delivery address".to_string());
        }

        if self.items.is_empty() {
            issues.push("No line items".to_string());
        }

        // A printed total may legitimately differ from the computed
        // breakdown; surface the gap without treating it as a defect.
        let computed = self.subtotal + self.vat;
        if (computed - self.total).abs() > Decimal::new(1, 2) {
            issues.push(format!(
                "Document total ({}) differs from computed subtotal + VAT ({})",
                self.total, computed
            ));
        }

        issues
    }
}

impl Default for DocumentRecord {
    fn default() -> Self {
        Self::new(DocumentType::DeliveryNote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vat_rate_from_code() {
        assert_eq!(VatRate::from_code("04"), Some(VatRate::Reduced4));
        assert_eq!(VatRate::from_code("4"), Some(VatRate::Reduced4));
        assert_eq!(VatRate::from_code("10"), Some(VatRate::Standard10));
        assert_eq!(VatRate::from_code("22"), Some(VatRate::Full22));
        assert_eq!(VatRate::from_code("77"), None);
        assert_eq!(VatRate::from_code("abc"), None);
    }

    #[test]
    fn test_vat_rate_decimal() {
        assert_eq!(VatRate::Reduced4.as_decimal(), Decimal::new(4, 2));
        assert_eq!(VatRate::Standard10.as_decimal(), Decimal::new(10, 2));
        assert_eq!(VatRate::Full22.as_decimal(), Decimal::new(22, 2));
    }

    #[test]
    fn test_new_record_is_empty() {
        let record = DocumentRecord::new(DocumentType::Invoice);
        assert_eq!(record.document_type, DocumentType::Invoice);
        assert!(record.document_number.is_empty());
        assert!(record.items.is_empty());
        assert_eq!(record.total, Decimal::ZERO);
    }

    #[test]
    fn test_validate_reports_total_mismatch() {
        let mut record = DocumentRecord::new(DocumentType::DeliveryNote);
        record.subtotal = Decimal::new(10000, 2);
        record.vat = Decimal::new(1000, 2);
        record.total = Decimal::new(12000, 2);
        let issues = record.validate();
        assert!(issues.iter().any(|i| i.contains("differs from computed")));
    }

    #[test]
    fn test_validate_accepts_consistent_totals() {
        let mut record = DocumentRecord::new(DocumentType::DeliveryNote);
        record.subtotal = Decimal::new(10000, 2);
        record.vat = Decimal::new(1000, 2);
        record.total = Decimal::new(11000, 2);
        let issues = record.validate();
        assert!(!issues.iter().any(|i| i.contains("differs from computed")));
    }
}
