//! Compiled regex cascades for Italian trade document extraction.
//!
//! Cascades are ordered vectors: callers walk them front to back and stop
//! at the first hit. Labeled patterns come before bare positional ones so
//! a loose match can never shadow an explicit label.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Filename patterns
    pub static ref FILE_DELIVERY_NUMBER_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)DDV[_\s]+(\d{6})").unwrap(),
        Regex::new(r"(?i)DDT[_\s]+(\d{6})").unwrap(),
        Regex::new(r"(?i)[_\s](\d{6})(?:\.pdf)?$").unwrap(),
        Regex::new(r"(?i)(\d{6})[_\s]+DDV").unwrap(),
        Regex::new(r"(?i)(\d{6})[_\s]+DDT").unwrap(),
    ];

    pub static ref FILE_INVOICE_NUMBER: Regex = Regex::new(
        r"FTV_\d+_\d+_(\d+)_"
    ).unwrap();

    pub static ref FILE_INTERNAL_CODE: Regex = Regex::new(
        r"FTV_(\d+)_"
    ).unwrap();

    // Document number cascades
    pub static ref DELIVERY_NUMBER_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)D\.D\.T\.\s+(\d{4,6})\s+\d{2}/\d{2}/\d{2}").unwrap(),
        Regex::new(r"(?i)DDT\s+(\d{4,6})\s+\d{2}/\d{2}/\d{2}").unwrap(),
        Regex::new(r"(?i)DOCUMENTO\s+DI\s+TRASPORTO\s*N[°.]?\s*(\d+)").unwrap(),
        Regex::new(r"(?i)Numero\s+(\d{6})\s+Del\s+\d{2}/\d{2}/\d{4}").unwrap(),
        Regex::new(r"(?i)Numero\s+(\d{6})").unwrap(),
        Regex::new(r"(\d{4,6})\s+\d{2}/\d{2}/\d{2,4}(?:\s+\d+)?").unwrap(),
    ];

    pub static ref INVOICE_NUMBER_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)FATTURA\s*N[°.]?\s*(\d+)").unwrap(),
        Regex::new(r"(?i)FT\s+(\d+)").unwrap(),
        Regex::new(r"(?i)INVOICE\s*N[°.]?\s*(\d+)").unwrap(),
    ];

    // Date cascades
    pub static ref DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"\d{4,6}\s+(\d{2}/\d{2}/\d{2,4})").unwrap(),
        Regex::new(r"(?i)Del\s+(\d{2}/\d{2}/\d{2,4})").unwrap(),
        Regex::new(r"(?i)Data\s+(\d{2}/\d{2}/\d{2,4})").unwrap(),
        Regex::new(r"(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})").unwrap(),
    ];

    pub static ref DELIVERY_DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)Data\s+consegna[:\s]+(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})").unwrap(),
        Regex::new(r"(?i)Consegna\s+del[:\s]+(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})").unwrap(),
    ];

    pub static ref ORDER_DATE_TAIL: Regex = Regex::new(
        r"(?i)Ordine\s*[Nn][°.]?\s*[A-Z0-9\-/]+\s+del\s+(\d{1,2}/\d{1,2}/\d{2,4})"
    ).unwrap();

    pub static ref ORDER_LINE_DATE: Regex = Regex::new(
        r"(?i)\bdel\s+(\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4})"
    ).unwrap();

    // Header tuple: "<doc number> <date> <page> <client code> <client name>"
    pub static ref HEADER_TUPLE: Regex = Regex::new(
        r"(\d{4,5})\s+(\d{2}/\d{2}/\d{2})\s+\d+\s+(\d{4,5})\s+(.+)"
    ).unwrap();

    pub static ref HEADER_TUPLE_COMPANY: Regex = Regex::new(
        r"(?i)(\d{4,5})\s+(\d{2}/\d{2}/\d{2})\s+\d+\s+(\d{4,5})\s+([A-Z\s]+(?:SRL|SPA|S\.R\.L\.|S\.P\.A\.))"
    ).unwrap();

    // Client name fallbacks
    pub static ref CLIENT_LEGAL_FORM: Regex = Regex::new(
        r"(?i)(\d{4,5})\s+(\d{2}/\d{2}/\d{2})\s+\d+\s+(\d{4,5})\s+([A-Z][A-Z\s.&']+?(?:S\.R\.L\.|SRL|S\.P\.A\.|SPA|S\.N\.C\.|SNC|S\.A\.S\.|SAS))"
    ).unwrap();

    pub static ref CLIENT_CODE_NAME: Regex = Regex::new(
        r"\b(\d{5})\s{2,}([A-Z][A-Z\s]+(?:SNC\s+DI\s+[A-Z\s]+(?:E\s+C\.|&\s*C\.)?|S\.R\.L\.|SRL|S\.P\.A\.|SPA|S\.N\.C\.|SNC|S\.A\.S\.|SAS))"
    ).unwrap();

    pub static ref CLIENT_SIMPLE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)DESTINATARIO[:\s]+([^\n]+)").unwrap(),
        Regex::new(r"(?i)CLIENTE[:\s]+([^\n]+)").unwrap(),
        Regex::new(r"(?i)RAGIONE\s+SOCIALE[:\s]+([^\n]+)").unwrap(),
    ];

    // Intra-line whitespace only: a name must not bleed across lines.
    pub static ref COMPANY_WITH_SUFFIX: Regex = Regex::new(
        r"([A-Z][A-Z \t.&']+?[ \t]+(?:S\.R\.L\.|S\.P\.A\.|S\.N\.C\.|S\.A\.S\.|SRL|SPA|SNC|SAS))(?:\s|,|$)"
    ).unwrap();

    pub static ref CLIENT_CODE_LABELED: Regex = Regex::new(
        r"(?i)(?:Codice\s+cliente|Cod\.\s*Cli\.)[:\s]*(\d{4,6})"
    ).unwrap();

    // Multi-line name continuation checks
    pub static ref NAME_LEADING_CONTINUATION: Regex = Regex::new(
        r"(?i)^(?:DI|DEL|DELLA|DELLE|DEI|DEGLI)\s+"
    ).unwrap();

    pub static ref NAME_TRAILING_CONTINUATION: Regex = Regex::new(
        r"(?i)\b(?:DI|E|DEL|DELLA|DELLE|DEI|DEGLI)$"
    ).unwrap();

    pub static ref DIGITS_ONLY: Regex = Regex::new(
        r"^\d+$"
    ).unwrap();

    // Name normalization
    pub static ref CONTROL_CHARS: Regex = Regex::new(
        r"[\x00-\x1F\x{7F}-\x{9F}]"
    ).unwrap();

    pub static ref LEGAL_SUFFIX: Regex = Regex::new(
        r"(?i)\b(S\.?R\.?L\.?|S\.?P\.?A\.?|S\.?N\.?C\.?|S\.?A\.?S\.?|S\.?S\.?(?:\.|\b)|S\.?C\.?|COOP|SARL|LTD|GMBH)\b"
    ).unwrap();

    pub static ref STREET_PREFIX_IN_NAME: Regex = Regex::new(
        r"(?i)\b(?:P\.ZA|P\.ZZA|PIAZZA|VIA|V\.LE|VIALE|CORSO|C\.SO)\b"
    ).unwrap();

    pub static ref INTERNAL_ID_SUFFIX: Regex = Regex::new(
        r"(?i)\s*\(CODICE ID\.\s*\d+\).*$"
    ).unwrap();

    pub static ref OWNER_NAME_TAIL: Regex = Regex::new(
        r"(?i)^DI\s+[A-Z][A-Z\s]+$"
    ).unwrap();

    // VAT / fiscal code
    pub static ref VAT_LABELED: Regex = Regex::new(
        r"(?i)(?:P\.IVA|Partita IVA|C\.F\.|Codice Fiscale|D\.F\.)\s*(\d{11})"
    ).unwrap();

    pub static ref VAT_BEFORE_KEYWORD: Regex = Regex::new(
        r"(\d{11})\s+(?:Operatore|RIFERIMENTO|Pagamento)"
    ).unwrap();

    pub static ref VAT_STANDALONE: Regex = Regex::new(
        r"\b(\d{11})\b"
    ).unwrap();

    pub static ref GENERIC_VAT: Regex = Regex::new(
        r"(?i)P(?:ARTITA)?\.?\s*IVA[:\s]*(\d{11})"
    ).unwrap();

    // Order reference cascade
    pub static ref ORDER_REFERENCE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)RIFERIMENTO\s+VOSTRO\s+ORDINE\s+N[°.]\s*:\s*([A-Z0-9\-/]+)").unwrap(),
        Regex::new(r"(?i)Rif\.\s*Ordine\s*n[°.]\s*:\s*([A-Z0-9\-/]+)").unwrap(),
        Regex::new(r"(?i)Ordine\s+cliente\s*:\s*([A-Z0-9\-/]+)").unwrap(),
        Regex::new(r"(?i)Rif\.\s*Ns\.\s*Ordine\s*N\.\s*(\d+)\s*del").unwrap(),
        Regex::new(r"(?i)Rif\.\s*Ns\.\s*Ordine\s*[Nn][°.]?\s*(\d+)").unwrap(),
        Regex::new(r"(?i)Rif\.\s*Vs\.\s*Ordine\s*n\.\s*([A-Z0-9]+)\s*del").unwrap(),
        Regex::new(r"(?i)Rif\.\s*V[so]\.\s*Ordine\s*[Nn][°.]?\s*([A-Z0-9\-/]+)").unwrap(),
    ];

    // Labeled-section scan ("Spett.le ..." block)
    pub static ref SPETT_LABEL: Regex = Regex::new(
        r"(?i)Spett(?:\.le|abile)\s*"
    ).unwrap();

    pub static ref SPETT_TWO_COLUMN: Regex = Regex::new(
        r"(?i)Spett(?:\.le|abile)\s*(?:\t+|\s{4,})Luogo\s+di\s+consegna"
    ).unwrap();

    pub static ref LUOGO_CONSEGNA_LABEL: Regex = Regex::new(
        r"(?i)Luogo\s+di\s+consegna"
    ).unwrap();

    pub static ref LUOGO_LABEL_PREFIX: Regex = Regex::new(
        r"(?i)^Luogo(?:\s+di\s+consegna)?\s*:\s*"
    ).unwrap();

    pub static ref CLIENT_STOP_LINE: Regex = Regex::new(
        r"(?i)^(?:VIA|V\.LE|VIALE|CORSO|C\.SO|PIAZZA|P\.ZZA|LARGO|LOCALITA'?|LOC\.|P\.?\s*IVA|PARTITA\s+IVA|C\.?F\.?\s|\d{5}\s|TEL\.?|FAX)"
    ).unwrap();

    pub static ref LEGAL_SUFFIX_LINE_END: Regex = Regex::new(
        r"(?i)(?:S\.R\.L\.|SRL|S\.P\.A\.|SPA|SNC|SAS)\s*$"
    ).unwrap();

    // Two-column delivery-note section
    pub static ref DELIVERY_SECTION: Regex = Regex::new(
        r"(?i)ALFIERI SPECIALITA['\s]*ALIMENTARI S\.P\.A\.\s*\n([\s\S]*?)(?:Pagamento:|$)"
    ).unwrap();

    pub static ref TWO_COLUMN_SECTION: Regex = Regex::new(
        r"(?i)Cliente\s+Luogo di consegna\s*\n([\s\S]*?)(?:Partita IVA|RIFERIMENTO|$)"
    ).unwrap();

    pub static ref TWO_COLUMN_LINE: Regex = Regex::new(
        r"^(.+?)\s{2,}(.+)$"
    ).unwrap();

    pub static ref MULTI_GAP: Regex = Regex::new(
        r"\s{3,}"
    ).unwrap();

    pub static ref SPACED_DASH: Regex = Regex::new(
        r"\s*-\s*"
    ).unwrap();

    pub static ref TUPLE_LINE_START: Regex = Regex::new(
        r"^\d{4,6}\s+\d{2}/\d{2}/\d{2}"
    ).unwrap();

    pub static ref ADDRESS_LINE_START: Regex = Regex::new(
        r"(?i)^(?:VIA|V\.LE|VIALE|CORSO|C\.SO|PIAZZA|P\.ZZA|P\.ZA|STRADA|LOC\.|LOCALITA|VICOLO|LARGO)"
    ).unwrap();

    pub static ref CAP_CITY_LINE: Regex = Regex::new(
        r"(?i)^\d{5}\s*-?\s*[A-Z]"
    ).unwrap();

    pub static ref CAP_CITY_PAIR: Regex = Regex::new(
        r"(?i)^(\d{5}\s*-?\s*[A-Z'\s]+?)\s+(\d{5}\s*-?\s*[A-Z'\s]+?)$"
    ).unwrap();

    pub static ref CAP_CITY_PAIR_LOOSE: Regex = Regex::new(
        r"(?i)^(\d{5}\s*-?\s*[A-Z\s]+?)\s+(\d{5}\s*-?\s*[A-Z\s]+)$"
    ).unwrap();

    pub static ref SECOND_CAP_SPLIT: Regex = Regex::new(
        r"(?i)^(.*?\d{5}\s*-?\s*[A-Z\s]+?)\s+(\d{5}.*)$"
    ).unwrap();

    pub static ref DOUBLE_ADDRESS_SPLIT: Regex = Regex::new(
        r"(?i)^(.*?)\s+(VIA|V\.LE|VIALE|CORSO|C\.SO|PIAZZA|P\.ZA|STRADA)\s+(.+)$"
    ).unwrap();

    pub static ref STREET_TOKEN_ANYWHERE: Regex = Regex::new(
        r"(?i)(?:VIA|V\.LE|VIALE|CORSO|C\.SO|PIAZZA|P\.ZA|STRADA)"
    ).unwrap();

    pub static ref NEXT_LINE_ADDRESS: Regex = Regex::new(
        r"(?i)^(?:VIA|V\.LE|VIALE|CORSO|C\.SO|PIAZZA|P\.ZZA|P\.ZA|STRADA|\d{5})"
    ).unwrap();

    pub static ref RIGHT_COLUMN_NAME: Regex = Regex::new(
        r"(?i)^DI\s+[A-Z]|^S\.R\.L\.|S\.A\.S\.|S\.P\.A\."
    ).unwrap();

    pub static ref RIGHT_COLUMN_ADDRESS_HINT: Regex = Regex::new(
        r"(?i)VIA|V\.LE|CORSO|PIAZZA|STRADA|\d{5}|^\d+"
    ).unwrap();

    pub static ref FISCAL_HEADER_LINE: Regex = Regex::new(
        r"(?i)^Codice Fiscale$"
    ).unwrap();

    // Explicit delivery markers, in priority order
    pub static ref DELIVERY_MARKER_PATTERNS: Vec<Regex> = [
        "LUOGO DI CONSEGNA",
        "INDIRIZZO DI CONSEGNA",
        "DESTINAZIONE MERCE",
        "CONSEGNARE A",
        "DELIVERY ADDRESS",
        "SHIP TO",
        "DESTINATARIO MERCE",
        "CONSEGNA PRESSO",
        "RECAPITO CONSEGNA",
        "PUNTO DI CONSEGNA",
    ]
    .iter()
    .map(|marker| {
        let label = marker.replace(' ', r"\s+");
        Regex::new(&format!(
            r"(?i){label}[:\s]*([\s\S]*?)(?:\n\s*(?:TRASPORTATORE|VETTORE|CAUSALE|NOTE|FIRMA|Partita IVA)|$)"
        ))
        .unwrap()
    })
    .collect();

    pub static ref DESTINATION_SECTION: Regex = Regex::new(
        r"(?i)(?:DESTINATARIO|LUOGO DI CONSEGNA)[:\s]*([\s\S]*?)(?:VETTORE|TRASPORTATORE|PRODOTTI|Rif\.|PF\d+|ARTICOLI)"
    ).unwrap();

    pub static ref SECTION_FALLBACK_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)LIBERA\s+SRL[:\s\n]*([\s\S]*?)(?:VETTORE|Pagamento|Operatore|TRASPORT)").unwrap(),
        Regex::new(r"(?i)DESTINATARIO[:\s]*([\s\S]*?)(?:\n\s*(?:MITTENTE|TRASPORTATORE|VETTORE|CAUSALE|LUOGO)|$)").unwrap(),
        Regex::new(r"(?i)DEST\.[:\s]*([\s\S]*?)(?:\n\s*(?:MITT\.|TRASPORTATORE|VETTORE|CAUSALE)|$)").unwrap(),
        Regex::new(r"(?i)CLIENTE[:\s]*([\s\S]*?)(?:\n\s*(?:FORNITORE|VENDITORE|VETTORE|CAUSALE)|$)").unwrap(),
        Regex::new(r"(?i)Cliente\s+Luogo di consegna\s*\n([\s\S]*?)(?:\n\s*(?:Pagamento|RIFERIMENTO|VETTORE)|$)").unwrap(),
    ];

    // Geographic patterns over uppercased text, most specific first
    pub static ref GEOGRAPHIC_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(VIA\s+[A-Z\s,]+?)\s*,?\s*(\d+)\s+(\d{5})\s*-?\s*([A-Z\s]+?)\s+([A-Z]{2})\b").unwrap(),
        Regex::new(r"((?:VIA|CORSO|VIALE|PIAZZA)\s+[A-Z\s,]+?)\s*,?\s*(\d+)?\s*(\d{5})\s*-\s*([A-Z\s]+?)\s+([A-Z]{2})\b").unwrap(),
        Regex::new(r"((?:VIA|CORSO|V\.?LE|VIALE|PIAZZA|P\.ZZA|STRADA|LOC\.|LOCALITA'?|FRAZ\.|FRAZIONE|BORGO)\s+[A-Z\s.,'\-]+?)(?:[\s,]+(\d+(?:/\d+)?(?:\s*[A-Z])?))?\s*[\s,]*(\d{5})\s+([A-Z][A-Z\s\-]+?)\s+([A-Z]{2})\b").unwrap(),
        Regex::new(r"((?:VIA|CORSO|V\.?LE|VIALE|PIAZZA|P\.ZZA|STRADA|LOC\.|LOCALITA'?)\s+[A-Z\s.,'\-]+?)\s+(\d{5})\s+([A-Z][A-Z\s\-]+?)\s+([A-Z]{2})\b").unwrap(),
        Regex::new(r"((?:VIA|CORSO|VIALE|PIAZZA|STRADA)[A-Z]+)\s*(\d+(?:/\d+)?)?[\s,]*(\d{5})\s+([A-Z\s\-]+?)\s+([A-Z]{2})\b").unwrap(),
        Regex::new(r"([A-Z][A-Z\s.,'\-]+?)\s+(\d+(?:/\d+)?)\s+(\d{5})\s+([A-Z][A-Z\s\-]+?)\s+([A-Z]{2})\b").unwrap(),
        Regex::new(r"(\d{5})\s+([A-Z][A-Z\s\-]+?)\s+([A-Z]{2})\b").unwrap(),
    ];

    pub static ref FREE_ADDRESS_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"((?:VIA|CORSO|V\.?LE|VIALE|PIAZZA)\s+[A-Z\s,]+?)\s*,?\s*(\d+)?\s*(\d{5})\s*-?\s*([A-Z\s]+?)\s+([A-Z]{2})\b").unwrap(),
        Regex::new(r"((?:VIA|CORSO|VIALE|PIAZZA|STRADA)\s+[A-Z\s.,'\-]+?)\s*,?\s*(\d+(?:/\d+)?)\s*(\d{5})\s+([A-Z\s\-]+?)\s+([A-Z]{2})\b").unwrap(),
    ];

    pub static ref CLIENT_NEARBY_ADDRESS: Regex = Regex::new(
        r"(?i)((?:VIA|CORSO|V\.LE|VIALE|PIAZZA)\s+[^\n]+)\s*\n\s*(\d{5})\s*[-\s]*([A-Z\s]+)\s+([A-Z]{2})"
    ).unwrap();

    pub static ref STREET_LINE_START: Regex = Regex::new(
        r"(?i)^(?:VIA|CORSO|V\.?LE|VIALE|PIAZZA|STRADA|LOC\.|BORGO)\s+"
    ).unwrap();

    pub static ref CITY_PROVINCE_LINE: Regex = Regex::new(
        r"^[A-Z\s\-]+\s+[A-Z]{2}$"
    ).unwrap();

    pub static ref ATTACHED_STREET_PREFIX: Regex = Regex::new(
        r"(?i)^(VIA|CORSO|VIALE|PIAZZA|STRADA)([A-Z]+)"
    ).unwrap();

    // Address validation
    pub static ref CAP_ANYWHERE: Regex = Regex::new(
        r"\d{5}"
    ).unwrap();

    pub static ref STREET_TOKEN: Regex = Regex::new(
        r"(?i)(?:VIA|CORSO|VIALE|PIAZZA|STRADA|V\.LE|LOC\.|BORGO)"
    ).unwrap();

    pub static ref ONLY_DIGITS_LINE: Regex = Regex::new(
        r"^\d+\s*$"
    ).unwrap();

    pub static ref ONLY_PROVINCE_LINE: Regex = Regex::new(
        r"^[A-Z]{2}\s*$"
    ).unwrap();

    // Invoice-specific sections
    pub static ref INVOICE_CLIENT_SECTION: Regex = Regex::new(
        r"(?i)Spett\.le\s*\n([\s\S]*?)(?:FT\s+\d+|Tipo documento)"
    ).unwrap();

    pub static ref DELIVERY_HOUSE_NUMBER: Regex = Regex::new(
        r"(?i)\d+[A-Z]?\s*(?:/|$|\s|\d{5})"
    ).unwrap();

    pub static ref ODV_NUMBER: Regex = Regex::new(
        r"ODV\s+Nr\.\s*([A-Z0-9]+)"
    ).unwrap();

    // Generic fallback
    pub static ref GENERIC_ADDRESS: Regex = Regex::new(
        r"(?i)(?:VIA|CORSO|P\.ZA|PIAZZA)\s+[^,\n]+"
    ).unwrap();

    pub static ref GENERIC_GEOGRAPHIC: Regex = Regex::new(
        r"(?i)((?:VIA|P\.?ZA|PIAZZA|CORSO|C\.SO|VIALE|V\.LE)\s+[A-Z\s,'.]+\d+[\s\S]*?\d{5}\s+[A-Z\s']+\s+[A-Z]{2})"
    ).unwrap();

    // Totals
    pub static ref DOCUMENT_TOTAL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)Totale\s+documento\s+€\s*([\d.,]+)").unwrap(),
        Regex::new(r"(?i)TOTALE\s+DOCUMENTO\s*:?\s*€?\s*([\d.,]+)").unwrap(),
        Regex::new(r"(?i)Totale\s+€\s*([\d.,]+)").unwrap(),
        Regex::new(r"(?i)€\s*([\d.,]+)\s*(?:FRANCO|Totale)").unwrap(),
        Regex::new(r"\d+\s+(\d{1,3}(?:\.\d{3})*,\d{2})\s*$").unwrap(),
        Regex::new(r"(?i)Peso\s+Lordo\s+Porto\s+Spese\s+Tra?porto\s+Totale\s+documento\s+€[^0-9]*([\d.,]+)").unwrap(),
    ];

    // Line items
    pub static ref PRODUCT_CODE: Regex = Regex::new(
        r"^(?:\d{6}|[A-Z]{2}\d{6}|[A-Z]{2}\d{6}[A-Z]+|\d{6}[A-Z]+|PIRR\d{3})$"
    ).unwrap();
}

/// Header words the loose order-reference captures must never yield.
pub const ORDER_REFERENCE_STOPWORDS: &[&str] = &["TERMINI", "CONSEGNA", "PAGAMENTO"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_number_from_filename() {
        let caps = FILE_DELIVERY_NUMBER_PATTERNS
            .iter()
            .find_map(|p| p.captures("DDV_703723_2025_4251.PDF"));
        assert_eq!(&caps.unwrap()[1], "703723");
    }

    #[test]
    fn test_invoice_number_from_filename() {
        let caps = FILE_INVOICE_NUMBER.captures("FTV_701029_2025_00001_4251_21052025.PDF");
        assert_eq!(&caps.unwrap()[1], "00001");
    }

    #[test]
    fn test_internal_code_from_filename() {
        let caps = FILE_INTERNAL_CODE.captures("FTV_701029_2025_00001_4251_21052025.PDF");
        assert_eq!(&caps.unwrap()[1], "701029");
    }

    #[test]
    fn test_labeled_number_beats_bare_tuple() {
        let text = "1234 01/01/25\nD.D.T. 4255 21/05/25 1";
        let hit = DELIVERY_NUMBER_PATTERNS
            .iter()
            .find_map(|p| p.captures(text))
            .unwrap();
        assert_eq!(&hit[1], "4255");
    }

    #[test]
    fn test_header_tuple_groups() {
        let caps = HEADER_TUPLE
            .captures("4255 21/05/25 1 20322 DONAC S.R.L.")
            .unwrap();
        assert_eq!(&caps[1], "4255");
        assert_eq!(&caps[2], "21/05/25");
        assert_eq!(&caps[3], "20322");
        assert_eq!(&caps[4], "DONAC S.R.L.");
    }

    #[test]
    fn test_legal_suffix_alternatives() {
        assert!(LEGAL_SUFFIX.is_match("DONAC S.R.L."));
        assert!(LEGAL_SUFFIX.is_match("MAROTTA SRL"));
        assert!(LEGAL_SUFFIX.is_match("ALFIERI SPA"));
        assert!(LEGAL_SUFFIX.is_match("CANTINA SOCIALE COOP"));
        assert!(!LEGAL_SUFFIX.is_match("OSTERIA DEL PONTE"));
    }

    #[test]
    fn test_odv_capture() {
        let caps = ODV_NUMBER.captures("ODV Nr. 507A865AS02780 del").unwrap();
        assert_eq!(&caps[1], "507A865AS02780");
    }

    #[test]
    fn test_geographic_full_form() {
        let text = "VIA CAVOUR, 61 14100 ASTI AT";
        let hit = GEOGRAPHIC_PATTERNS
            .iter()
            .find_map(|p| p.captures(text));
        assert!(hit.is_some());
    }

    #[test]
    fn test_product_code_shapes() {
        for code in ["060041", "DL000301", "PS000034XX", "200016BL", "PIRR002"] {
            assert!(PRODUCT_CODE.is_match(code), "{code} should match");
        }
        for word in ["12345", "Lotto", "060041X2", "PIRR0021"] {
            assert!(!PRODUCT_CODE.is_match(word), "{word} should not match");
        }
    }

    #[test]
    fn test_order_reference_first_match_wins() {
        let text = "RIFERIMENTO VOSTRO ORDINE N° : 507A865AS02756\nRif. Vs. Ordine n. 999";
        let hit = ORDER_REFERENCE_PATTERNS
            .iter()
            .find_map(|p| p.captures(text))
            .unwrap();
        assert_eq!(&hit[1], "507A865AS02756");
    }
}
