//! Delivery address resolution.
//!
//! Trade documents carry the delivery address in wildly different places:
//! a two-column client/delivery header, an explicit "luogo di consegna"
//! marker, a destination section, or nowhere labeled at all. The resolver
//! walks those sources in a fixed order and accepts the first candidate
//! that survives validation. Issuer and carrier addresses are never valid
//! candidates, whatever stage produced them.

use tracing::debug;

use crate::models::config::LookupTables;

use super::names::legal_suffix_end;
use super::patterns::{
    ADDRESS_LINE_START, ATTACHED_STREET_PREFIX, CAP_ANYWHERE, CAP_CITY_LINE, CAP_CITY_PAIR,
    CAP_CITY_PAIR_LOOSE, CITY_PROVINCE_LINE, CLIENT_NEARBY_ADDRESS, DELIVERY_HOUSE_NUMBER,
    DELIVERY_MARKER_PATTERNS, DELIVERY_SECTION, DESTINATION_SECTION, DIGITS_ONLY,
    DOUBLE_ADDRESS_SPLIT, FISCAL_HEADER_LINE, FREE_ADDRESS_PATTERNS, GEOGRAPHIC_PATTERNS,
    INTERNAL_ID_SUFFIX, MULTI_GAP, NEXT_LINE_ADDRESS, ONLY_DIGITS_LINE, ONLY_PROVINCE_LINE,
    OWNER_NAME_TAIL, RIGHT_COLUMN_ADDRESS_HINT, RIGHT_COLUMN_NAME, SECOND_CAP_SPLIT,
    SECTION_FALLBACK_PATTERNS, SPACED_DASH, STREET_LINE_START, STREET_TOKEN,
    STREET_TOKEN_ANYWHERE, TUPLE_LINE_START, TWO_COLUMN_LINE, TWO_COLUMN_SECTION,
};

/// Client and address fields pulled from a delivery-note header section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressResult {
    /// Client legal name, assembled from the left column.
    pub client: String,
    /// Billing address from the left column.
    pub client_address: String,
    /// Delivery address from the right column.
    pub delivery_address: String,
}

/// Structural validity check for a delivery address candidate.
///
/// A usable address carries a street-type token plus either a house
/// number or a 5-digit postal code. Bare numbers and bare province
/// codes are rejected outright.
pub fn is_valid_delivery_address(address: &str) -> bool {
    if ONLY_DIGITS_LINE.is_match(address) || ONLY_PROVINCE_LINE.is_match(address) {
        return false;
    }
    STREET_TOKEN.is_match(address)
        && (DELIVERY_HOUSE_NUMBER.is_match(address) || CAP_ANYWHERE.is_match(address))
}

/// Split the delivery-note header section into client and address columns.
///
/// The section prints billing data on the left and delivery data on the
/// right, with the PDF text layer sometimes collapsing both columns onto
/// single lines. Lines are classified as name, street, or postal-code
/// rows and split per row; identical halves (a layout artifact) collapse
/// to a single occurrence.
pub fn split_delivery_section(text: &str) -> Option<AddressResult> {
    let caps = DELIVERY_SECTION.captures(text)?;
    let section = &caps[1];

    let lines: Vec<&str> = section
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut client_name_parts: Vec<String> = Vec::new();
    let mut client_address_parts: Vec<String> = Vec::new();
    let mut delivery_address_parts: Vec<String> = Vec::new();
    let mut found_client_name = false;

    for (i, line) in lines.iter().enumerate() {
        // Header tuple and page-number rows carry no client data.
        if TUPLE_LINE_START.is_match(line) || DIGITS_ONLY.is_match(line) {
            continue;
        }

        let is_address = ADDRESS_LINE_START.is_match(line);
        let is_cap = CAP_CITY_LINE.is_match(line);
        let (left, right) = split_columns(line, is_address, is_cap);

        if is_address || is_cap {
            found_client_name = true;
            client_address_parts.push(left);
            delivery_address_parts.push(right);
        } else if !found_client_name {
            if let Some(end) = legal_suffix_end(&left) {
                // The legal form closes the name; drop anything after it.
                client_name_parts.push(left[..end].trim().to_string());
                found_client_name = true;
            } else {
                let next_is_address = lines
                    .get(i + 1)
                    .is_some_and(|next| NEXT_LINE_ADDRESS.is_match(next));
                client_name_parts.push(left);
                if i + 1 >= lines.len() || next_is_address {
                    found_client_name = true;
                }
            }
        }
    }

    // Layout artifact: both columns often repeat the same row once each.
    let mut unique_client: Vec<String> = Vec::new();
    for (i, part) in client_address_parts.iter().enumerate() {
        if delivery_address_parts.get(i) == Some(part) {
            if !unique_client.contains(part) {
                unique_client.push(part.clone());
            }
        } else {
            unique_client.push(part.clone());
        }
    }
    let unique_delivery: Vec<String> = if client_address_parts == delivery_address_parts {
        unique_client.clone()
    } else {
        delivery_address_parts
    };

    let client_address = tidy_address(&unique_client.join(" "));
    let mut delivery_address = tidy_address(&unique_delivery.join(" "));
    if delivery_address.is_empty() {
        delivery_address = client_address.clone();
    }

    let client = tidy_name(&mut client_name_parts);

    if client.is_empty() && delivery_address.is_empty() {
        return None;
    }

    Some(AddressResult {
        client,
        client_address,
        delivery_address,
    })
}

/// Split a section line into its left and right column halves.
fn split_columns(line: &str, is_address: bool, is_cap: bool) -> (String, String) {
    // Exact duplication ("CILIBERTO TERESA CILIBERTO TERESA").
    if let Some(half) = split_duplicate_halves(line) {
        return (half.to_string(), half.to_string());
    }

    if is_cap {
        if let Some(caps) = CAP_CITY_PAIR
            .captures(line)
            .or_else(|| CAP_CITY_PAIR_LOOSE.captures(line))
        {
            return (caps[1].trim().to_string(), caps[2].trim().to_string());
        }
        if let Some(caps) = SECOND_CAP_SPLIT.captures(line) {
            return (caps[1].trim().to_string(), caps[2].trim().to_string());
        }
        return (line.to_string(), line.to_string());
    }

    // Two street addresses on one line split at the second street token.
    if is_address {
        if let Some(caps) = DOUBLE_ADDRESS_SPLIT.captures(line) {
            if STREET_TOKEN_ANYWHERE.is_match(&caps[1]) {
                return (
                    caps[1].trim().to_string(),
                    format!("{} {}", &caps[2], &caps[3]),
                );
            }
        }
    }

    if let Some(caps) = TWO_COLUMN_LINE.captures(line) {
        if caps[2].len() > 10 {
            return (caps[1].trim().to_string(), caps[2].trim().to_string());
        }
    }

    (line.to_string(), line.to_string())
}

/// Find the split point of a line formed by two identical halves.
fn split_duplicate_halves(line: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(offset) = line[search_from..].find(char::is_whitespace) {
        let start = search_from + offset;
        let run = line[start..]
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(line.len() - start);
        let end = start + run;
        let (left, right) = (&line[..start], &line[end..]);
        if !left.is_empty() && left == right {
            return Some(left);
        }
        search_from = end;
    }
    None
}

fn tidy_address(address: &str) -> String {
    let without_dashes = SPACED_DASH.replace_all(address, " ");
    collapse_ws(&without_dashes)
}

fn tidy_name(parts: &mut Vec<String>) -> String {
    // A trailing "DI NOME COGNOME" row belongs to the owner, not the name.
    if parts.len() > 1 && parts.last().is_some_and(|part| OWNER_NAME_TAIL.is_match(part)) {
        parts.pop();
    }
    let joined = parts.join(" ");
    let cleaned = INTERNAL_ID_SUFFIX.replace(&joined, "");
    collapse_ws(&cleaned)
}

/// Multi-stage delivery address resolver.
pub struct AddressResolver<'a> {
    tables: &'a LookupTables,
}

impl<'a> AddressResolver<'a> {
    pub fn new(tables: &'a LookupTables) -> Self {
        Self { tables }
    }

    /// Resolve the delivery address, or return the empty string.
    ///
    /// Stages run in order and the first validated candidate wins:
    /// two-column header, fixed-address table, delivery markers,
    /// destination section, geographic scan, client address fallback.
    pub fn resolve(&self, text: &str, file_name: &str, client_name: &str) -> String {
        debug!(file = file_name, client = client_name, "resolving delivery address");

        if let Some(address) = self
            .two_column_section(text)
            .and_then(|a| self.clean_and_validate(&a, client_name))
        {
            debug!(stage = "two-column", %address, "delivery address resolved");
            return address;
        }

        if let Some(address) = self
            .tables
            .fixed_address_for(client_name, text)
            .and_then(|a| self.clean_and_validate(a, client_name))
        {
            debug!(stage = "fixed-table", %address, "delivery address resolved");
            return address;
        }

        if let Some(address) = self
            .by_markers(text)
            .and_then(|a| self.clean_and_validate(&a, client_name))
        {
            debug!(stage = "markers", %address, "delivery address resolved");
            return address;
        }

        if let Some(address) = self
            .destination_section(text)
            .and_then(|a| self.clean_and_validate(&a, client_name))
        {
            debug!(stage = "destination-section", %address, "delivery address resolved");
            return address;
        }

        if let Some(address) = self
            .by_geographic(text, client_name)
            .and_then(|a| self.clean_and_validate(&a, client_name))
        {
            debug!(stage = "geographic", %address, "delivery address resolved");
            return address;
        }

        if let Some(address) = self
            .client_address_fallback(text, client_name)
            .and_then(|a| self.clean_and_validate(&a, client_name))
        {
            debug!(stage = "client-fallback", %address, "delivery address resolved");
            return address;
        }

        debug!("no delivery address resolved");
        String::new()
    }

    /// Stage 1: the labeled "Cliente / Luogo di consegna" column pair.
    fn two_column_section(&self, text: &str) -> Option<String> {
        let caps = TWO_COLUMN_SECTION.captures(text)?;
        let section = &caps[1];

        let mut left_column: Vec<String> = Vec::new();
        let mut right_column: Vec<String> = Vec::new();

        for line in section.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let parts: Vec<&str> = MULTI_GAP.split(line).collect();
            if parts.len() >= 2 {
                let left = parts[0].trim();
                let right = parts[parts.len() - 1].trim();
                if !left.is_empty() {
                    left_column.push(left.to_string());
                }
                if !right.is_empty() && right != left {
                    right_column.push(right.to_string());
                }
            } else {
                // No column gap: the line continues the previous right cell.
                let trimmed = line.trim();
                if !FISCAL_HEADER_LINE.is_match(trimmed) {
                    if let Some(last) = right_column.last_mut() {
                        last.push(' ');
                        last.push_str(trimmed);
                    }
                }
            }
        }

        let mut address_parts: Vec<String> = Vec::new();
        for (index, part) in right_column.iter().enumerate() {
            // The first right cell repeating the client name is not address data.
            if index == 0 && left_column.first() == Some(part) {
                continue;
            }
            if RIGHT_COLUMN_NAME.is_match(part) {
                continue;
            }
            if RIGHT_COLUMN_ADDRESS_HINT.is_match(part) {
                address_parts.push(part.clone());
            }
        }

        let full_address = collapse_ws(&address_parts.join(" "));
        if !full_address.is_empty() {
            return Some(full_address);
        }

        let fallback: Vec<&str> = right_column.iter().skip(1).map(String::as_str).collect();
        let fallback = collapse_ws(&fallback.join(" "));
        (!fallback.is_empty()).then_some(fallback)
    }

    /// Stage 3: explicit delivery markers, in vocabulary order.
    fn by_markers(&self, text: &str) -> Option<String> {
        for pattern in DELIVERY_MARKER_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(text) {
                if let Some(address) = self.first_address_in(caps[1].trim()) {
                    return Some(address);
                }
            }
        }
        None
    }

    /// Stage 4: destination section bounded by carrier/product markers.
    fn destination_section(&self, text: &str) -> Option<String> {
        if let Some(caps) = DESTINATION_SECTION.captures(text) {
            let section = &caps[1];
            if let Some(address) = self.all_addresses_in(section).into_iter().next() {
                return Some(address);
            }
            if let Some(address) = self.first_address_in(section) {
                return Some(address);
            }
        }

        for pattern in SECTION_FALLBACK_PATTERNS.iter() {
            for caps in pattern.captures_iter(text) {
                if let Some(address) = self.first_address_in(&caps[1]) {
                    return Some(address);
                }
            }
        }

        None
    }

    /// Stage 5: geographic patterns, first in a window after the client
    /// name, then over the whole text.
    fn by_geographic(&self, text: &str, client_name: &str) -> Option<String> {
        if !client_name.is_empty() {
            if let Some(index) = text.find(client_name) {
                let start = index + client_name.len();
                let mut end = clamp_boundary(text, start + 2000);
                if let Some(offset) = text[index..].find("Vettore") {
                    end = end.min(index + offset);
                }
                if start < end {
                    if let Some(address) = self.first_address_in(&text[start..end]) {
                        return Some(address);
                    }
                }
            }
        }

        self.first_address_in(text)
    }

    /// Stage 6: reuse the address printed right under the client name.
    fn client_address_fallback(&self, text: &str, client_name: &str) -> Option<String> {
        if client_name.is_empty() {
            return None;
        }
        let index = text.find(client_name)?;
        let end = clamp_boundary(text, index + 500);
        let caps = CLIENT_NEARBY_ADDRESS.captures(&text[index..end])?;
        Some(format!(
            "{} {} {} {}",
            caps[1].trim(),
            &caps[2],
            caps[3].trim(),
            &caps[4]
        ))
    }

    /// First validated address the geographic cascade finds in `text`.
    fn first_address_in(&self, text: &str) -> Option<String> {
        if text.is_empty() {
            return None;
        }
        let clean = collapse_ws(&text.to_uppercase());

        for (index, pattern) in GEOGRAPHIC_PATTERNS.iter().enumerate() {
            for caps in pattern.captures_iter(&clean) {
                let Some(address) = format_candidate(&caps, index) else {
                    continue;
                };
                if self.accepts(&address) {
                    return Some(address);
                }
            }
        }
        None
    }

    /// All validated addresses in a text block, line-accumulated first,
    /// then pattern-matched over the collapsed text.
    fn all_addresses_in(&self, text: &str) -> Vec<String> {
        let mut addresses: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut last_was_street = false;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let upper = line.to_uppercase();

            if STREET_LINE_START.is_match(&upper) {
                if !current.is_empty() {
                    let candidate = collapse_ws(&current);
                    if self.accepts(&candidate) {
                        addresses.push(candidate);
                    }
                }
                current = upper;
                last_was_street = true;
            } else if last_was_street && CAP_ANYWHERE.is_match(&upper) {
                current.push(' ');
                current.push_str(&upper);
                let candidate = collapse_ws(&current);
                if self.accepts(&candidate) {
                    addresses.push(candidate);
                    current.clear();
                    last_was_street = false;
                }
            } else if !current.is_empty() && CITY_PROVINCE_LINE.is_match(&upper) {
                current.push(' ');
                current.push_str(&upper);
                let candidate = collapse_ws(&current);
                if self.accepts(&candidate) {
                    addresses.push(candidate);
                }
                current.clear();
                last_was_street = false;
            } else {
                last_was_street = false;
            }
        }

        if !current.is_empty() {
            let candidate = collapse_ws(&current);
            if self.accepts(&candidate) {
                addresses.push(candidate);
            }
        }

        let clean = collapse_ws(&text.to_uppercase());
        for pattern in FREE_ADDRESS_PATTERNS.iter() {
            for caps in pattern.captures_iter(&clean) {
                let mut address = caps[1].trim().to_string();
                if let Some(number) = caps.get(2) {
                    address.push_str(", ");
                    address.push_str(number.as_str());
                }
                address.push(' ');
                address.push_str(&caps[3]);
                address.push(' ');
                address.push_str(caps[4].trim());
                address.push(' ');
                address.push_str(&caps[5]);
                let address = collapse_ws(&address);
                if self.accepts(&address) && !addresses.contains(&address) {
                    addresses.push(address);
                }
            }
        }

        addresses
    }

    fn accepts(&self, address: &str) -> bool {
        address.len() >= 15
            && is_valid_delivery_address(address)
            && !self.tables.is_carrier_address(address)
            && !self.tables.is_issuer_address(address)
    }

    /// Final cleanup, validation, and known-client override for a candidate.
    ///
    /// Every candidate passes through here, whichever stage produced it;
    /// family extractors with their own strategies route through it too.
    pub(crate) fn clean_and_validate(&self, address: &str, client_name: &str) -> Option<String> {
        let mut address = collapse_ws(address);
        if let Some(stripped) = address.strip_suffix(',') {
            address = stripped.trim_end().to_string();
        }
        if !self.accepts(&address) {
            return None;
        }

        // A gated fixed-address entry whose token shows up inside the
        // candidate means the candidate is a stale site for that client.
        let client_upper = client_name.to_uppercase();
        let address_upper = address.to_uppercase();
        for entry in &self.tables.fixed_client_addresses {
            let Some(token) = entry.requires_text.as_deref() else {
                continue;
            };
            let keywords_match = entry
                .keywords
                .iter()
                .all(|keyword| client_upper.contains(keyword.as_str()));
            if keywords_match && address_upper.contains(token) {
                return Some(entry.address.clone());
            }
        }

        Some(address)
    }
}

/// Assemble a display address from a geographic pattern match.
fn format_candidate(caps: &regex::Captures<'_>, pattern_index: usize) -> Option<String> {
    let address = match pattern_index {
        0 | 1 => {
            let street = caps[1].trim_end_matches(',').trim().to_string();
            let number = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let cap = &caps[3];
            let city = caps[4].trim();
            let province = &caps[5];
            if number.is_empty() {
                format!("{street} {cap} {city} {province}")
            } else {
                format!("{street}, {number} {cap} {city} {province}")
            }
        }
        2 => {
            let street = format_street_name(&caps[1]);
            let number = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let cap = &caps[3];
            let city = caps[4].trim();
            let province = &caps[5];
            if number.is_empty() {
                format!("{street} {cap} {city} {province}")
            } else {
                format!("{street}, {number} {cap} {city} {province}")
            }
        }
        3 => {
            let street = format_street_name(&caps[1]);
            format!("{} {} {} {}", street, &caps[2], caps[3].trim(), &caps[4])
        }
        4 => {
            let street = separate_street_prefix(&caps[1]);
            let number = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let cap = &caps[3];
            let city = caps[4].trim();
            let province = &caps[5];
            if number.is_empty() {
                format!("{street} {cap} {city} {province}")
            } else {
                format!("{street}, {number} {cap} {city} {province}")
            }
        }
        5 => format!(
            "{}, {} {} {} {}",
            caps[1].trim(),
            &caps[2],
            &caps[3],
            caps[4].trim(),
            &caps[5]
        ),
        6 => format!("{} {} {}", &caps[1], caps[2].trim(), &caps[3]),
        _ => return None,
    };

    Some(collapse_ws(&address).replace(",,", ",").replace(", ,", ","))
}

fn format_street_name(street: &str) -> String {
    collapse_ws(street).trim_end_matches('.').trim_end().to_string()
}

/// "PIAZZADANTE" becomes "PIAZZA DANTE".
fn separate_street_prefix(street: &str) -> String {
    ATTACHED_STREET_PREFIX.replace(street, "$1 $2").into_owned()
}

pub(crate) fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn clamp_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver_tables() -> LookupTables {
        LookupTables::default()
    }

    #[test]
    fn test_is_valid_delivery_address() {
        assert!(is_valid_delivery_address("VIA CAVOUR, 61 14100 ASTI AT"));
        assert!(is_valid_delivery_address("CORSO SUSA, 305/307 10098 RIVOLI TO"));
        assert!(!is_valid_delivery_address("VIA ROMA"));
        assert!(!is_valid_delivery_address("14100 ASTI AT"));
        assert!(!is_valid_delivery_address("TO"));
        assert!(!is_valid_delivery_address("12345"));
        assert!(!is_valid_delivery_address(""));
    }

    #[test]
    fn test_split_section_two_addresses() {
        let text = "ALFIERI SPECIALITA' ALIMENTARI S.P.A.\n\
                    DONAC S.R.L. DONAC S.R.L.\n\
                    VIA MARGARITA, 8 LOC. TETTO GARETTO VIA SALUZZO, 65\n\
                    12100 - CUNEO CN 12038 SAVIGLIANO CN\n\
                    Pagamento: BB 30GG";
        let result = split_delivery_section(text).unwrap();
        assert_eq!(result.client, "DONAC S.R.L.");
        assert_eq!(result.client_address, "VIA MARGARITA, 8 LOC. TETTO GARETTO 12100 CUNEO CN");
        assert_eq!(result.delivery_address, "VIA SALUZZO, 65 12038 SAVIGLIANO CN");
    }

    #[test]
    fn test_split_section_collapses_duplicate_columns() {
        let text = "ALFIERI SPECIALITA' ALIMENTARI S.P.A.\n\
                    BOTTEGA DELLA CARNE  BOTTEGA DELLA CARNE\n\
                    DI AVIDANO SILVANA\n\
                    VIA ROMA, 1\n\
                    12050 ALBA CN\n\
                    Pagamento: RD";
        let result = split_delivery_section(text).unwrap();
        assert_eq!(result.client, "BOTTEGA DELLA CARNE");
        assert_eq!(result.client_address, "VIA ROMA, 1 12050 ALBA CN");
        assert_eq!(result.delivery_address, "VIA ROMA, 1 12050 ALBA CN");
    }

    #[test]
    fn test_split_section_strips_internal_id() {
        let text = "ALFIERI SPECIALITA' ALIMENTARI S.P.A.\n\
                    ARUDI MIRELLA (CODICE ID. 20412)\n\
                    VIA FONTANA, 4\n\
                    14100 ASTI AT\n\
                    Pagamento: BB";
        let result = split_delivery_section(text).unwrap();
        assert_eq!(result.client, "ARUDI MIRELLA");
    }

    #[test]
    fn test_split_section_absent() {
        assert!(split_delivery_section("FATTURA N. 4251 del 21/05/2025").is_none());
        // Empty template: only the header tuple, no client rows.
        let text = "ALFIERI SPECIALITA' ALIMENTARI S.P.A.\n4253 21/05/25 1 20322\nPagamento: BB";
        assert!(split_delivery_section(text).is_none());
    }

    #[test]
    fn test_resolve_two_column_stage() {
        let tables = resolver_tables();
        let resolver = AddressResolver::new(&tables);
        let text = "Cliente Luogo di consegna\n\
                    IL GUSTO FRUTTA E VERDURA   IL GUSTO FRUTTA E VERDURA\n\
                    VIA GARIBALDI, 10   VIA FONTANA, 4\n\
                    12100 CUNEO CN   14100 ASTI AT\n\
                    Partita IVA";
        let address = resolver.resolve(text, "doc.pdf", "IL GUSTO FRUTTA E VERDURA");
        assert_eq!(address, "VIA FONTANA, 4 14100 ASTI AT");
    }

    #[test]
    fn test_resolve_fixed_table_stage() {
        let tables = resolver_tables();
        let resolver = AddressResolver::new(&tables);
        let address = resolver.resolve("DDT 1234 del 21/05/25", "doc.pdf", "MAROTTA SRL");
        assert_eq!(address, "CORSO SUSA, 305/307 10098 RIVOLI TO");
    }

    #[test]
    fn test_resolve_gated_fixed_entry() {
        let tables = resolver_tables();
        let resolver = AddressResolver::new(&tables);
        // The gating token sits in the body, so the fixed entry applies.
        let text = "DDT 1234\nBOREALE SRL\nconsegna presso VIA PEROSA";
        let address = resolver.resolve(text, "doc.pdf", "BOREALE SRL");
        assert_eq!(address, "VIA CESANA, 78 10139 TORINO TO");
    }

    #[test]
    fn test_resolve_remaps_stale_site_candidate() {
        let tables = resolver_tables();
        let resolver = AddressResolver::new(&tables);
        let text = "Cliente Luogo di consegna\n\
                    BOREALE SRL   BOREALE SRL\n\
                    VIA CESARE PAVESE, 4   VIA PEROSA, 32\n\
                    10010 CHIVASSO TO   10152 TORINO TO\n\
                    Partita IVA";
        let address = resolver.resolve(text, "doc.pdf", "BOREALE SRL");
        assert_eq!(address, "VIA CESANA, 78 10139 TORINO TO");
    }

    #[test]
    fn test_resolve_marker_stage() {
        let tables = resolver_tables();
        let resolver = AddressResolver::new(&tables);
        let text = "DESTINAZIONE MERCE:\nVIA CAVOUR, 61\n14100 ASTI AT\nVETTORE: BRT";
        let address = resolver.resolve(text, "doc.pdf", "");
        assert_eq!(address, "VIA CAVOUR, 61 14100 ASTI AT");
    }

    #[test]
    fn test_resolve_destination_section_stage() {
        let tables = resolver_tables();
        let resolver = AddressResolver::new(&tables);
        let text = "DESTINATARIO: ROSSI MARIO\nVIA ROMA, 15\n10121 TORINO TO\nVETTORE BRT";
        let address = resolver.resolve(text, "doc.pdf", "");
        assert_eq!(address, "VIA ROMA, 15 10121 TORINO TO");
    }

    #[test]
    fn test_resolve_geographic_stage() {
        let tables = resolver_tables();
        let resolver = AddressResolver::new(&tables);
        let text = "Spett.le ROSSI MARIO\nVIA BIANDRATE, 28 28100 - NOVARA NO";
        let address = resolver.resolve(text, "doc.pdf", "");
        assert_eq!(address, "VIA BIANDRATE, 28 28100 NOVARA NO");
    }

    #[test]
    fn test_resolve_rejects_issuer_address() {
        let tables = resolver_tables();
        let resolver = AddressResolver::new(&tables);
        let text = "VIA MARCONI, 10 12050 MAGLIANO ALFIERI CN";
        assert_eq!(resolver.resolve(text, "doc.pdf", ""), "");
    }

    #[test]
    fn test_resolve_rejects_carrier_address() {
        let tables = resolver_tables();
        let resolver = AddressResolver::new(&tables);
        let text = "VIA SUPEJA GALLINO 20/28 10060 NONE TO";
        assert_eq!(resolver.resolve(text, "doc.pdf", ""), "");
    }

    #[test]
    fn test_resolve_client_fallback_stage() {
        let tables = resolver_tables();
        let resolver = AddressResolver::new(&tables);
        // Digits in the street name defeat the geographic patterns, so
        // only the near-client scan can recover this one.
        let text = "ARUDI MIRELLA\nVIA 4 NOVEMBRE\n12100 CUNEO CN";
        let address = resolver.resolve(text, "doc.pdf", "ARUDI MIRELLA");
        assert_eq!(address, "VIA 4 NOVEMBRE 12100 CUNEO CN");
    }

    #[test]
    fn test_resolve_empty_when_nothing_found() {
        let tables = resolver_tables();
        let resolver = AddressResolver::new(&tables);
        assert_eq!(resolver.resolve("nessun indirizzo qui", "doc.pdf", ""), "");
        assert_eq!(resolver.resolve("", "doc.pdf", ""), "");
    }

    #[test]
    fn test_attached_prefix_separated() {
        let tables = resolver_tables();
        let resolver = AddressResolver::new(&tables);
        let text = "consegna PIAZZADANTE 5 28100 NOVARA NO";
        let address = resolver.resolve(text, "doc.pdf", "");
        assert_eq!(address, "PIAZZA DANTE, 5 28100 NOVARA NO");
    }
}
