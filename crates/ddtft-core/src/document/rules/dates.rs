//! Date extraction for Italian trade documents.
//!
//! Dates stay in the canonical `DD/MM/YYYY` string form the documents print
//! them in. Parsing into calendar types happens downstream if a consumer
//! needs it; the extraction layer only normalizes separators and expands
//! two-digit years.

use super::patterns::{
    DATE_PATTERNS, DELIVERY_DATE_PATTERNS, ORDER_DATE_TAIL, ORDER_LINE_DATE,
    ORDER_REFERENCE_PATTERNS,
};
use super::{ExtractionMatch, FieldExtractor};

/// Normalize a raw date string to `DD/MM/YYYY`.
///
/// Dashes become slashes and a two-digit year gains the `20` century. The
/// input comes back unchanged (separators aside) when it does not split
/// into three parts.
pub fn normalize_date(raw: &str) -> String {
    let slashed = raw.trim().replace('-', "/");
    let parts: Vec<&str> = slashed.split('/').collect();
    if parts.len() != 3 {
        return slashed;
    }
    let year = if parts[2].len() == 2 {
        format!("20{}", parts[2])
    } else {
        parts[2].to_string()
    };
    format!("{}/{}/{}", parts[0], parts[1], year)
}

/// Extract the document date: first hit across the date cascade, normalized.
pub fn extract_date(text: &str) -> Option<String> {
    for pattern in DATE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            return Some(normalize_date(&caps[1]));
        }
    }
    None
}

/// Extract an explicitly labeled delivery date, if the document carries one.
pub fn extract_delivery_date(text: &str) -> Option<String> {
    for pattern in DELIVERY_DATE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            return Some(normalize_date(&caps[1]));
        }
    }
    None
}

/// Extract the order date from an "Ordine n. X del DD/MM/YY" reference.
///
/// When no reference carries its date inline, a bare "del DD/MM/YY" tail
/// on the order-reference line still counts.
pub fn extract_order_date(text: &str) -> Option<String> {
    if let Some(caps) = ORDER_DATE_TAIL.captures(text) {
        return Some(normalize_date(&caps[1]));
    }
    let line = text
        .lines()
        .find(|line| ORDER_REFERENCE_PATTERNS.iter().any(|p| p.is_match(line)))?;
    ORDER_LINE_DATE
        .captures(line)
        .map(|caps| normalize_date(&caps[1]))
}

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for pattern in DATE_PATTERNS.iter() {
            for caps in pattern.captures_iter(text) {
                let normalized = normalize_date(&caps[1]);
                if results.iter().any(|r| r.value == normalized) {
                    continue;
                }
                let full_match = caps.get(0).unwrap();
                results.push(
                    ExtractionMatch::new(normalized, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("21/05/25"), "21/05/2025");
        assert_eq!(normalize_date("21/05/2025"), "21/05/2025");
        assert_eq!(normalize_date("3-4-2025"), "3/4/2025");
        assert_eq!(normalize_date("maggio 2025"), "maggio 2025");
    }

    #[test]
    fn test_extract_date_from_header_tuple() {
        // Number and date run together in the header band.
        let result = extract_date("4753 21/05/25 1 20322 DONAC S.R.L.");
        assert_eq!(result, Some("21/05/2025".to_string()));
    }

    #[test]
    fn test_extract_date_labeled() {
        assert_eq!(
            extract_date("Numero 014658 Del 21/05/2025"),
            Some("21/05/2025".to_string())
        );
        assert_eq!(
            extract_date("Data 03/06/2025 Pag. 1"),
            Some("03/06/2025".to_string())
        );
    }

    #[test]
    fn test_extract_date_bare_fallback() {
        assert_eq!(extract_date("consegna 4/6/25 ore 10"), Some("4/6/2025".to_string()));
        assert_eq!(extract_date("nessuna data qui"), None);
    }

    #[test]
    fn test_extract_delivery_date() {
        assert_eq!(
            extract_delivery_date("Data consegna: 05/06/2025"),
            Some("05/06/2025".to_string())
        );
        assert_eq!(
            extract_delivery_date("Consegna del 06/06/25"),
            Some("06/06/2025".to_string())
        );
        assert_eq!(extract_delivery_date("DDT 4753 21/05/25"), None);
    }

    #[test]
    fn test_extract_order_date() {
        assert_eq!(
            extract_order_date("Rif. Vs. Ordine n. 507A865AS02780 del 20/05/25"),
            Some("20/05/2025".to_string())
        );
        assert_eq!(extract_order_date("Rif. Vs. Ordine n. 507A865AS02780"), None);
    }

    #[test]
    fn test_order_date_from_reference_line_tail() {
        // The colon after N° keeps the inline pattern from matching, but
        // the date still sits on the reference line.
        let text = "RIFERIMENTO VOSTRO ORDINE N° : 507A865AS02756 del 20/05/2025\naltro";
        assert_eq!(extract_order_date(text), Some("20/05/2025".to_string()));
    }

    #[test]
    fn test_extract_all_dedups_repeats() {
        let extractor = DateExtractor::new();
        let text = "4753 21/05/25 1 20322\nDel 21/05/25\nData consegna 22/05/25";
        let results = extractor.extract_all(text);
        let values: Vec<&str> = results.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["21/05/2025", "22/05/2025"]);
    }
}
