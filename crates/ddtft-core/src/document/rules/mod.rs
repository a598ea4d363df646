//! Rule-based field extractors for Italian trade documents.

pub mod patterns;
pub mod amounts;
pub mod dates;
pub mod names;
pub mod address;
pub mod items;

pub use amounts::{parse_italian_amount, format_italian_amount};
pub use dates::{extract_date, extract_delivery_date, extract_order_date, normalize_date, DateExtractor};
pub use names::{extract_spett_client, extract_suffixed_company, normalize_client_name};
pub use address::{is_valid_delivery_address, split_delivery_section, AddressResolver, AddressResult};
pub use items::{extract_items, calculate_totals, extract_document_total};
pub use patterns::*;


/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A single pattern hit within the source text.
///
/// Cascades are ordered, so the first hit wins outright; there is no
/// scoring between candidates.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
