//! Client name extraction and normalization.
//!
//! Extracted names arrive with PDF-layer noise: doubled words from
//! overlapping text runs, address fragments glued to the legal name,
//! stray control characters. Normalization strips all of that down to
//! the bare company name ending at its legal-form suffix. The extraction
//! half of the module finds the raw name in the first place, walking the
//! "Spett.le" consignee block line by line or falling back to any
//! legal-form company mention.

use super::patterns::{
    CLIENT_STOP_LINE, COMPANY_WITH_SUFFIX, CONTROL_CHARS, DIGITS_ONLY, LEGAL_SUFFIX,
    LEGAL_SUFFIX_LINE_END, LUOGO_CONSEGNA_LABEL, LUOGO_LABEL_PREFIX, MULTI_GAP,
    NAME_TRAILING_CONTINUATION, SPETT_LABEL, SPETT_TWO_COLUMN, STREET_PREFIX_IN_NAME,
};

/// Normalize an extracted client name.
///
/// Returns the empty string when nothing usable remains, so callers can
/// treat the result as a plain field value without an `Option` dance.
pub fn normalize_client_name(raw: &str) -> String {
    let stripped = CONTROL_CHARS.replace_all(raw, "");
    let mut name = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return String::new();
    }

    name = collapse_duplicated_half(&name);
    name = collapse_repeated_prefix(&name);

    // Cut anything trailing the legal form ("BOREALE S.R.L. VIA PEROSA...").
    if let Some(end) = legal_suffix_end(&name) {
        name.truncate(end);
    }

    // Names without a legal form can still drag an address fragment along.
    if let Some(m) = STREET_PREFIX_IN_NAME.find(&name) {
        name.truncate(m.start());
        name = name.trim_end().to_string();
    }

    let name = name.trim().to_string();
    if name.len() <= 3 || DIGITS_ONLY.is_match(&name) {
        return String::new();
    }
    name
}

/// Byte offset just past a legal-form suffix, if the text contains one.
///
/// Dotted sigle keep their closing dot when the word-boundary match
/// stopped short of it ("S.R.L." matches as "S.R.L").
pub(crate) fn legal_suffix_end(text: &str) -> Option<usize> {
    let m = LEGAL_SUFFIX.find(text)?;
    let mut end = m.end();
    let matched = m.as_str();
    if (matched.contains('.') || matched.eq_ignore_ascii_case("SAS")) && text[end..].starts_with('.')
    {
        end += 1;
    }
    Some(end)
}

/// Extract the client name from a "Spett.le" consignee block.
///
/// Walks the lines after the label, joining continuation rows until an
/// address, VAT, or postal-code line closes the name. A two-column
/// header ("Spett.le   Luogo di consegna") switches to a left-column
/// scan so the delivery column never bleeds into the name.
pub fn extract_spett_client(text: &str) -> Option<String> {
    if let Some(name) = two_column_spett_client(text) {
        return Some(name);
    }

    let spett = SPETT_LABEL.find(text)?;

    // "Luogo di consegna" bounds the scan only when it opens its own
    // section further down; on the same header line it is a column
    // label, not a boundary.
    let mut end = text.len();
    if let Some(luogo) = LUOGO_CONSEGNA_LABEL.find(text) {
        if luogo.start() >= spett.end() && luogo.start() - spett.start() >= 50 {
            end = luogo.start();
        }
    }

    let section = &text[spett.end()..end];
    let lines: Vec<&str> = section.lines().collect();
    let mut parts: Vec<String> = Vec::new();

    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            if parts.is_empty() {
                continue;
            }
            break;
        }
        if CLIENT_STOP_LINE.is_match(line) {
            break;
        }

        let mut cell = strip_luogo_prefix(line);
        if let Some(tab) = cell.find('\t') {
            cell.truncate(tab);
        }
        let cell = cell.trim().to_string();
        if cell.is_empty() || cell.eq_ignore_ascii_case("luogo") {
            continue;
        }

        let continues = cell.ends_with('&')
            || NAME_TRAILING_CONTINUATION.is_match(&cell)
            || (!LEGAL_SUFFIX_LINE_END.is_match(&cell)
                && lines
                    .get(i + 1)
                    .map(|next| next.trim())
                    .is_some_and(|next| !next.is_empty() && !CLIENT_STOP_LINE.is_match(next)));
        parts.push(cell);
        if !continues {
            break;
        }
    }

    let name = parts.join(" ").split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() || name.eq_ignore_ascii_case("luogo") {
        return None;
    }
    let upper = name.to_uppercase();
    if upper.starts_with("LUOGO DI CONSEGNA")
        || upper.contains("ATTENZIONE")
        || upper.contains("CONTROLLARE LA MERCE")
    {
        return None;
    }
    Some(name)
}

/// Left-column scan under a two-column "Spett.le / Luogo di consegna" header.
fn two_column_spett_client(text: &str) -> Option<String> {
    let header = SPETT_TWO_COLUMN.find(text)?;
    let after = &text[header.end()..];
    let mut parts: Vec<String> = Vec::new();

    for line in after.lines().skip(1).take(5) {
        let mut left = line;
        if let Some(tab) = left.find('\t') {
            left = &left[..tab];
        }
        let left = MULTI_GAP.splitn(left, 2).next().unwrap_or("").trim();
        if left.is_empty() {
            if parts.is_empty() {
                continue;
            }
            break;
        }
        if CLIENT_STOP_LINE.is_match(left) {
            break;
        }
        if left.to_uppercase().starts_with("LUOGO") {
            continue;
        }

        let closes = LEGAL_SUFFIX_LINE_END.is_match(left)
            && !left.ends_with('&')
            && !NAME_TRAILING_CONTINUATION.is_match(left);
        parts.push(left.to_string());
        if closes {
            break;
        }
    }

    let name = parts.join(" ");
    (!name.is_empty()).then_some(name)
}

/// Strip a leaked "Luogo di consegna:" label off a consignee line.
///
/// A bare "Luogo " prefix is dropped only when what follows looks like
/// the start of a name (uppercase or digit), so "Luogo di consegna" as
/// a plain label line survives for the section parser.
fn strip_luogo_prefix(line: &str) -> String {
    if let Some(m) = LUOGO_LABEL_PREFIX.find(line) {
        return line[m.end()..].trim().to_string();
    }
    if let Some(prefix) = line.get(..6) {
        if prefix.eq_ignore_ascii_case("luogo ") {
            let tail = line[6..].trim_start();
            if tail.chars().next().is_some_and(|c| c.is_uppercase() || c.is_ascii_digit()) {
                return tail.to_string();
            }
        }
    }
    line.to_string()
}

/// Last-resort client lookup: the first company name carrying a legal
/// form anywhere in the text, skipping names that contain an excluded
/// keyword (the issuer's own letterhead).
pub fn extract_suffixed_company(text: &str, exclude: &[String]) -> Option<String> {
    COMPANY_WITH_SUFFIX
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .find(|company| {
            let upper = company.to_uppercase();
            !exclude.iter().any(|keyword| upper.contains(&keyword.to_uppercase()))
        })
}

/// Collapse "DONAC S.R.L. DONAC S.R.L." to a single copy.
fn collapse_duplicated_half(name: &str) -> String {
    let words: Vec<&str> = name.split(' ').collect();
    if words.len() >= 2 && words.len() % 2 == 0 {
        let half = words.len() / 2;
        let first = words[..half].join(" ");
        let second = words[half..].join(" ");
        if first == second && first.len() > 3 {
            return first;
        }
    }
    name.to_string()
}

/// Drop a repeated leading segment ("MAROTTA MAROTTA SRL" keeps one copy).
fn collapse_repeated_prefix(name: &str) -> String {
    let words: Vec<&str> = name.split(' ').collect();
    for i in 1..=words.len() / 2 {
        let prefix = words[..i].join(" ");
        let next = words[i..(2 * i).min(words.len())].join(" ");
        if prefix == next && prefix.len() > 3 {
            return words[i..].join(" ");
        }
    }
    name.to_string()
}
