//! Amount parsing for Italian trade documents.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse an Italian-formatted amount (e.g., "1.234,56" or "€ 234,56").
///
/// The currency sign and any spacing are dropped before parsing. When both
/// separators appear, whichever comes last is taken as the decimal mark.
pub fn parse_italian_amount(s: &str) -> Option<Decimal> {
    // Keep digits and separators only; drops €, spaces and non-breaking spaces.
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned.replace(',', ".")
    } else if cleaned.contains(',') && cleaned.contains('.') {
        let comma_pos = cleaned.rfind(',');
        let dot_pos = cleaned.rfind('.');
        match (comma_pos, dot_pos) {
            (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
            (Some(_), Some(_)) => cleaned.replace(',', ""),
            _ => cleaned,
        }
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).ok()
}

/// Format an amount in Italian style (1.234,56).
pub fn format_italian_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let parts: Vec<&str> = s.split('.').collect();

    if parts.len() != 2 {
        return s;
    }

    let (sign, integer_part) = match parts[0].strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", parts[0]),
    };
    let decimal_part = parts[1];

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("{}{},{}", sign, formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_italian_amount() {
        assert_eq!(
            parse_italian_amount("1.234,56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(
            parse_italian_amount("1234,56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(
            parse_italian_amount("1234.56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(
            parse_italian_amount("12.345.678,90"),
            Some(Decimal::from_str("12345678.90").unwrap())
        );
    }

    #[test]
    fn test_parse_tolerates_currency_sign() {
        assert_eq!(
            parse_italian_amount("€ 1.234,56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(
            parse_italian_amount("234,56 €"),
            Some(Decimal::from_str("234.56").unwrap())
        );
    }

    #[test]
    fn test_parse_dot_last_strips_commas() {
        // Anglo layout sneaks into some scanned documents.
        assert_eq!(
            parse_italian_amount("1,234.56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_italian_amount(""), None);
        assert_eq!(parse_italian_amount("n/d"), None);
        assert_eq!(parse_italian_amount("€"), None);
        assert_eq!(parse_italian_amount(",."), None);
    }

    #[test]
    fn test_format_italian_amount() {
        let amount = Decimal::from_str("1234.56").unwrap();
        assert_eq!(format_italian_amount(amount), "1.234,56");

        let amount = Decimal::from_str("12345678.90").unwrap();
        assert_eq!(format_italian_amount(amount), "12.345.678,90");

        let amount = Decimal::from_str("7.5").unwrap();
        assert_eq!(format_italian_amount(amount), "7,50");
    }
}
