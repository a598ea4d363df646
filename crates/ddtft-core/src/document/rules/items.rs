//! Line-item scan and totals reconciliation.
//!
//! The token stream of a trade document interleaves product lines with lot
//! numbers, expiry dates, and layout noise. The scan anchors on product
//! codes, walks forward to a unit-of-measure token, and reads quantity,
//! price, line total, and VAT code from the fixed positions after it.
//! Candidates that fail the shape checks are dropped silently.

use rust_decimal::Decimal;

use crate::models::document::{DocumentTotals, LineItem, VatRate};

use super::amounts::parse_italian_amount;
use super::patterns::{DOCUMENT_TOTAL_PATTERNS, PRODUCT_CODE};

const UNIT_VOCABULARY: [&str; 6] = ["PZ", "KG", "CF", "LT", "MT", "CT"];

/// Extract all product lines from the document text.
pub fn extract_items(text: &str) -> Vec<LineItem> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut items = Vec::new();

    for (i, word) in words.iter().enumerate() {
        let previous = if i > 0 { words[i - 1] } else { "" };
        if !is_product_code(word, previous) {
            continue;
        }

        // Unit of measure within a bounded window after the code.
        let window_end = (i + 20).min(words.len());
        let Some(unit_index) =
            (i + 1..window_end).find(|&j| UNIT_VOCABULARY.contains(&words[j]))
        else {
            continue;
        };
        let unit = words[unit_index];
        let description = words[i + 1..unit_index].join(" ");

        if unit_index + 1 >= words.len() {
            continue;
        }
        let quantity = leading_int(words[unit_index + 1]);

        let mut price = Decimal::ZERO;
        let mut total = Decimal::ZERO;
        if let Some(value) = words.get(unit_index + 2).and_then(|w| parse_italian_amount(w)) {
            if value > Decimal::ZERO {
                price = value;
            }
        }
        if let Some(value) = words.get(unit_index + 3).and_then(|w| parse_italian_amount(w)) {
            if value > Decimal::ZERO {
                total = value;
            }
        }

        // The VAT code prints after the line amount.
        let vat_rate = (unit_index + 3..(unit_index + 6).min(words.len()))
            .find_map(|j| VatRate::from_code(words[j]))
            .unwrap_or_default();

        if quantity > 0 && description.len() > 2 {
            items.push(LineItem {
                code: (*word).to_string(),
                description: description.trim().to_string(),
                quantity,
                unit: unit.to_string(),
                price,
                total,
                vat_rate,
            });
        }
    }

    items
}

/// A code-shaped token is a product code unless the preceding token labels
/// it as a lot number or expiry date.
fn is_product_code(token: &str, previous: &str) -> bool {
    let previous_upper = previous.to_uppercase();
    if previous_upper.contains("LOTTO")
        || previous_upper == "LOT."
        || previous_upper == "SCAD."
        || previous_upper == "SCADENZA"
    {
        return false;
    }
    PRODUCT_CODE.is_match(token)
}

/// Quantity tokens may carry trailing noise; read the leading digit run.
fn leading_int(token: &str) -> u32 {
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Aggregate line totals into the document's monetary breakdown.
///
/// Line totals are VAT-exclusive. VAT is computed per line from its
/// classified rate; 4% and 10% get dedicated columns, the 22% share only
/// contributes to the combined `vat`.
pub fn calculate_totals(items: &[LineItem]) -> DocumentTotals {
    let mut totals = DocumentTotals::default();

    for item in items {
        totals.subtotal += item.total;
        let line_vat = item.total * item.vat_rate.as_decimal();
        match item.vat_rate {
            VatRate::Reduced4 => totals.vat4 += line_vat,
            VatRate::Standard10 => totals.vat10 += line_vat,
            VatRate::Full22 => {}
        }
        totals.vat += line_vat;
    }

    totals.subtotal = totals.subtotal.round_dp(2);
    totals.vat4 = totals.vat4.round_dp(2);
    totals.vat10 = totals.vat10.round_dp(2);
    totals.vat = totals.vat.round_dp(2);
    totals.total = totals.subtotal + totals.vat;

    totals
}

/// Printed document total, walking the label cascade.
pub fn extract_document_total(text: &str) -> Option<Decimal> {
    DOCUMENT_TOTAL_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|caps| parse_italian_amount(&caps[1]))
}
