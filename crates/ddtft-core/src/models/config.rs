//! Lookup tables and exclusion lists for the extraction engine.
//!
//! Everything here is pure data: pre-verified delivery addresses keyed by
//! internal or order-voucher code, client display-name mappings, and the
//! keyword lists that keep the issuer's own address and carrier addresses
//! out of extraction results. Loaded once, never mutated by the engine.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Engine-level configuration: behavior toggles plus the lookup tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fall back to the generic extractor when a family extractor gives up.
    pub fallback_to_generic: bool,

    /// Replace normalized client names with their short display form.
    pub apply_short_names: bool,

    /// Lookup tables and exclusion lists.
    pub lookup: LookupTables,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_to_generic: true,
            apply_short_names: true,
            lookup: LookupTables::default(),
        }
    }
}

impl EngineConfig {
    /// Load the configuration from a JSON file.
    ///
    /// Absent fields fall back to their defaults, so a site override only
    /// needs to spell out what it changes.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        let config = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Parse)?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }
}

/// The full lookup-table set injected into the extraction engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupTables {
    /// The issuing company's identity, excluded from all client fields.
    pub issuer: IssuerProfile,

    /// Keywords marking carrier/shipper addresses, never valid destinations.
    pub carrier_keywords: Vec<String>,

    /// Internal cross-reference code → pre-verified delivery address.
    pub internal_code_delivery: HashMap<String, String>,

    /// Order-voucher (ODV) code → pre-verified delivery address.
    pub odv_delivery: HashMap<String, String>,

    /// Full legal name → short display name.
    pub client_names: HashMap<String, String>,

    /// Clients whose delivery address is fixed regardless of document text.
    pub fixed_client_addresses: Vec<FixedClientAddress>,
}

/// The document issuer's own identity markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerProfile {
    /// The issuer's VAT number, excluded from counterparty VAT capture.
    pub vat_number: String,

    /// Tokens identifying the issuer's name in text.
    pub name_keywords: Vec<String>,

    /// Tokens identifying the issuer's registered address.
    pub address_keywords: Vec<String>,
}

/// A fixed delivery address for a known client.
///
/// Applies when every keyword appears in the resolved client name; when
/// `requires_text` is set, the token must additionally appear somewhere in
/// the document body. The conditions are opaque seed data carried over from
/// verified documents, not a general rule system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedClientAddress {
    /// Tokens that must all appear in the client name (uppercase match).
    pub keywords: Vec<String>,

    /// Extra token that must appear in the document body, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_text: Option<String>,

    /// The pre-verified delivery address.
    pub address: String,
}

impl Default for IssuerProfile {
    fn default() -> Self {
        Self {
            vat_number: "03247720042".to_string(),
            name_keywords: vec!["ALFIERI".to_string(), "SPECIALITA".to_string()],
            address_keywords: vec![
                "MARCONI".to_string(),
                "MAGLIANO ALFIERI".to_string(),
                "MAGLIANO".to_string(),
                "ALFIERI".to_string(),
                "C.SO G. MARCONI".to_string(),
                "CORSO MARCONI".to_string(),
                "G. MARCONI".to_string(),
                "12050".to_string(),
                "CN)".to_string(),
                "(CN)".to_string(),
                "10/E".to_string(),
            ],
        }
    }
}

impl Default for LookupTables {
    fn default() -> Self {
        let internal_code_delivery = HashMap::from([
            ("701029".to_string(), "VIA CAVOUR, 61 14100 ASTI AT".to_string()),
            ("701134".to_string(), "VIA FONTANA, 4 14100 ASTI AT".to_string()),
            ("701168".to_string(), "VIA REPERGO, 40 14057 ISOLA D'ASTI AT".to_string()),
            ("701179".to_string(), "P.ZA DEL POPOLO, 3 14046 MOMBARUZZO AT".to_string()),
            ("701184".to_string(), "VIA MOLINETTO, 24 15122 ALESSANDRIA AL".to_string()),
            ("701205".to_string(), "VIA GIANOLI, 64 15020 MURISENGO AL".to_string()),
            (
                "701207".to_string(),
                "VIA REGIONE ISOLA, 2/A C/O ARDITI FRATELLI 15030 ROSIGNANO MONFERRATO AL"
                    .to_string(),
            ),
            ("701209".to_string(), "VIALE RISORGIMENTO, 162 14053 CANELLI AT".to_string()),
            ("701213".to_string(), "VIA CHIVASSO, 7 15020 MURISENGO AL".to_string()),
        ]);

        let odv_delivery = HashMap::from([
            ("507A085AS00704".to_string(), "VIA CAVOUR, 61 14100 ASTI AT".to_string()),
            ("507A865AS02780".to_string(), "VIA FONTANA, 4 14100 ASTI AT".to_string()),
            ("507A865AS02772".to_string(), "VIA MOLINETTO, 24 15122 ALESSANDRIA AL".to_string()),
            (
                "507A865AS02790".to_string(),
                "VIA REGIONE ISOLA, 2/A C/O ARDITI FRATELLI 15030 ROSIGNANO MONFERRATO AL"
                    .to_string(),
            ),
            ("507A865AS02789".to_string(), "VIALE RISORGIMENTO, 162 14053 CANELLI AT".to_string()),
            ("507A865AS02786".to_string(), "VIA CHIVASSO, 7 15020 MURISENGO AL".to_string()),
        ]);

        let client_names = HashMap::from([
            (
                "IL GUSTO FRUTTA E VERDURA DI SQUILLACIOTI FRANCESCA".to_string(),
                "Il Gusto".to_string(),
            ),
            ("IL GUSTO FRUTTA E VERDURA".to_string(), "Il Gusto".to_string()),
            ("IL GUSTO FRUTTA & VERDURA".to_string(), "Il Gusto".to_string()),
            ("IL GUSTO".to_string(), "Il Gusto".to_string()),
            ("PIEMONTE CARNI".to_string(), "Piemonte Carni".to_string()),
            (
                "PIEMONTE CARNI DI CALDERA MASSIMO & C. S.A.S.".to_string(),
                "Piemonte Carni".to_string(),
            ),
            ("PIEMONTE CARNI S.A.S.".to_string(), "Piemonte Carni".to_string()),
            ("AZ. AGR. LA MANDRIA S.S.".to_string(), "La Mandria".to_string()),
            ("AZ. AGR. LA MANDRIA S.S. DI GOIA E BRUNO".to_string(), "La Mandria".to_string()),
            ("AZIENDA AGRICOLA LA MANDRIA".to_string(), "La Mandria".to_string()),
            ("LA MANDRIA S.S.".to_string(), "La Mandria".to_string()),
            ("BARISONE E BALDON SRL".to_string(), "Barisone E Baldon".to_string()),
            ("BARISONE E BALDON S.R.L.".to_string(), "Barisone E Baldon".to_string()),
            ("BARISONE & BALDON S.R.L.".to_string(), "Barisone E Baldon".to_string()),
            ("BARISONE & BALDON".to_string(), "Barisone E Baldon".to_string()),
            ("MAROTTA S.R.L.".to_string(), "Marotta".to_string()),
            ("MAROTTA SRL".to_string(), "Marotta".to_string()),
            ("BOREALE S.R.L.".to_string(), "Boreale".to_string()),
            ("BOREALE SRL".to_string(), "Boreale".to_string()),
            ("DONAC S.R.L.".to_string(), "Donac".to_string()),
            ("DONAC SRL".to_string(), "Donac".to_string()),
            ("ARDITI F.LLI S.R.L.".to_string(), "Arditi F.lli".to_string()),
            ("ARUDI MIRELLA".to_string(), "Arudi Mirella".to_string()),
            (
                "MOLINETTO SALUMI E FORMAGGI S.R.L.".to_string(),
                "Molinetto Salumi".to_string(),
            ),
            ("PANETTERIA PISTONE RENZO".to_string(), "Panetteria Pistone".to_string()),
            ("AZ.AGR.ISABELLA DI CONTI STEFANO".to_string(), "Azienda Isabella".to_string()),
            (
                "BOTTEGA DELLA CARNE DI AVIDANO SILVANA".to_string(),
                "Bottega Della Carne".to_string(),
            ),
        ]);

        let fixed_client_addresses = vec![
            FixedClientAddress {
                keywords: vec!["MAROTTA".to_string(), "SRL".to_string()],
                requires_text: None,
                address: "CORSO SUSA, 305/307 10098 RIVOLI TO".to_string(),
            },
            FixedClientAddress {
                keywords: vec!["BOREALE".to_string(), "SRL".to_string()],
                requires_text: Some("PEROSA".to_string()),
                address: "VIA CESANA, 78 10139 TORINO TO".to_string(),
            },
            FixedClientAddress {
                keywords: vec!["DONAC".to_string(), "S.R.L".to_string()],
                requires_text: None,
                address: "VIA CUNEO, 84/86 12011 BORGO SAN DALMAZZO CN".to_string(),
            },
        ];

        Self {
            issuer: IssuerProfile::default(),
            carrier_keywords: vec![
                "SUPEJA GALLINO".to_string(),
                "SUPEJA".to_string(),
                "GALLINO".to_string(),
                "SAFFIRIO FLAVIO".to_string(),
                "SAFFIRIO".to_string(),
                "S.A.F.I.M.".to_string(),
                "SAFIM".to_string(),
                "10060 NONE".to_string(),
                "NONE TO".to_string(),
                "TRASPORTATORE".to_string(),
                "VETTORE".to_string(),
                "CORRIERE".to_string(),
                "AUTOTRASPORTI".to_string(),
                "SPEDIZIONI".to_string(),
                "TRASPORTI".to_string(),
                "DHL".to_string(),
                "TNT".to_string(),
                "BARTOLINI".to_string(),
                "GLS".to_string(),
                "SDA".to_string(),
                "BRT".to_string(),
                "SPEDIZIONIERE".to_string(),
                "CARGO".to_string(),
                "EXPRESS".to_string(),
                "VIA SUPEJA".to_string(),
                "GALLINO 20/28".to_string(),
            ],
            internal_code_delivery,
            odv_delivery,
            client_names,
            fixed_client_addresses,
        }
    }
}

impl LookupTables {
    /// Load lookup tables from a JSON file.
    ///
    /// Fields absent from the file fall back to the built-in seed data.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        let tables = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        Ok(tables)
    }

    /// Save lookup tables to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Parse)?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Look up the short display name for a full legal name.
    ///
    /// Tries an exact match, then a case-insensitive match, then a
    /// bidirectional substring match. Returns `None` when nothing applies.
    pub fn short_client_name(&self, full_name: &str) -> Option<&str> {
        if full_name.is_empty() {
            return None;
        }
        if let Some(short) = self.client_names.get(full_name) {
            return Some(short);
        }
        let upper = full_name.to_uppercase();
        for (full, short) in &self.client_names {
            if full == &upper {
                return Some(short);
            }
        }
        for (full, short) in &self.client_names {
            if upper.contains(full.as_str()) || full.contains(&upper) {
                return Some(short);
            }
        }
        None
    }

    /// Fixed delivery address for a client, honoring text conditions.
    ///
    /// `body` is the full document text, checked uppercase when an entry
    /// carries a `requires_text` token.
    pub fn fixed_address_for(&self, client_name: &str, body: &str) -> Option<&str> {
        if client_name.is_empty() {
            return None;
        }
        let client_upper = client_name.to_uppercase();
        let body_upper = body.to_uppercase();
        for entry in &self.fixed_client_addresses {
            let all_keywords = entry
                .keywords
                .iter()
                .all(|keyword| client_upper.contains(keyword.as_str()));
            if !all_keywords {
                continue;
            }
            match &entry.requires_text {
                Some(token) if !body_upper.contains(token.as_str()) => continue,
                _ => return Some(&entry.address),
            }
        }
        None
    }

    /// Check whether an address belongs to the issuer.
    pub fn is_issuer_address(&self, address: &str) -> bool {
        if address.is_empty() {
            return false;
        }
        let upper = address.to_uppercase();
        self.issuer
            .address_keywords
            .iter()
            .any(|keyword| upper.contains(keyword.as_str()))
    }

    /// Check whether an address belongs to a carrier/shipper.
    pub fn is_carrier_address(&self, address: &str) -> bool {
        if address.is_empty() {
            return false;
        }
        let upper = address.to_uppercase();
        self.carrier_keywords
            .iter()
            .any(|keyword| upper.contains(keyword.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_seeded() {
        let tables = LookupTables::default();
        assert_eq!(
            tables.internal_code_delivery.get("701029").map(String::as_str),
            Some("VIA CAVOUR, 61 14100 ASTI AT")
        );
        assert_eq!(
            tables.odv_delivery.get("507A085AS00704").map(String::as_str),
            Some("VIA CAVOUR, 61 14100 ASTI AT")
        );
        assert_eq!(tables.fixed_client_addresses.len(), 3);
    }

    #[test]
    fn test_short_client_name_exact_and_partial() {
        let tables = LookupTables::default();
        assert_eq!(tables.short_client_name("MAROTTA SRL"), Some("Marotta"));
        assert_eq!(tables.short_client_name("marotta srl"), Some("Marotta"));
        // Partial: resolved name carries an extra trailing fragment.
        assert_eq!(
            tables.short_client_name("DONAC S.R.L. FILIALE DI CUNEO"),
            Some("Donac")
        );
        assert_eq!(tables.short_client_name("SCONOSCIUTO SNC"), None);
        assert_eq!(tables.short_client_name(""), None);
    }

    #[test]
    fn test_fixed_address_unconditional() {
        let tables = LookupTables::default();
        assert_eq!(
            tables.fixed_address_for("MAROTTA SRL", "any body"),
            Some("CORSO SUSA, 305/307 10098 RIVOLI TO")
        );
    }

    #[test]
    fn test_fixed_address_requires_body_token() {
        let tables = LookupTables::default();
        // Without the PEROSA token the conditional entry must not apply.
        assert_eq!(tables.fixed_address_for("BOREALE SRL", "VIA ROMA 1 TORINO"), None);
        assert_eq!(
            tables.fixed_address_for("BOREALE SRL", "consegna VIA PEROSA 12"),
            Some("VIA CESANA, 78 10139 TORINO TO")
        );
    }

    #[test]
    fn test_issuer_address_detection() {
        let tables = LookupTables::default();
        assert!(tables.is_issuer_address("C.SO G. MARCONI 10/E 12050 MAGLIANO ALFIERI CN"));
        assert!(!tables.is_issuer_address("VIA CAVOUR, 61 14100 ASTI AT"));
        assert!(!tables.is_issuer_address(""));
    }

    #[test]
    fn test_carrier_address_detection() {
        let tables = LookupTables::default();
        assert!(tables.is_carrier_address("VIA SUPEJA GALLINO 20/28 10060 NONE TO"));
        assert!(tables.is_carrier_address("corriere DHL deposito"));
        assert!(!tables.is_carrier_address("VIA FONTANA, 4 14100 ASTI AT"));
    }

    #[test]
    fn test_json_round_trip() {
        let tables = LookupTables::default();
        let json = serde_json::to_string(&tables).unwrap();
        let back: LookupTables = serde_json::from_str(&json).unwrap();
        assert_eq!(back.internal_code_delivery.len(), tables.internal_code_delivery.len());
        assert_eq!(back.carrier_keywords, tables.carrier_keywords);
    }

    #[test]
    fn test_partial_json_falls_back_to_seed() {
        let tables: LookupTables = serde_json::from_str(r#"{"carrier_keywords":["XPO"]}"#).unwrap();
        assert_eq!(tables.carrier_keywords, vec!["XPO".to_string()]);
        // Untouched sections keep the seed.
        assert!(tables.internal_code_delivery.contains_key("701213"));
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert!(config.fallback_to_generic);
        assert!(config.apply_short_names);
        assert!(!config.lookup.carrier_keywords.is_empty());
    }

    #[test]
    fn test_engine_config_partial_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"fallback_to_generic":false}"#).unwrap();
        assert!(!config.fallback_to_generic);
        assert!(config.apply_short_names);
        assert!(config.lookup.internal_code_delivery.contains_key("701029"));
    }
}
