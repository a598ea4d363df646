//! Per-extraction memoization of resolved field values.

use std::collections::HashMap;

/// Cache of field values resolved during one extraction call.
///
/// Field accessors consult the cache before running their cascades, so a
/// field reached through several internal call paths is derived (and
/// logged) exactly once. Empty results are cached like any other so a
/// failed cascade is not retried. The cache lives for a single extractor
/// invocation and is never shared across documents.
#[derive(Debug, Default)]
pub struct ExtractionContext {
    values: HashMap<&'static str, String>,
}

impl ExtractionContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously resolved field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Record a resolved field value and hand it back to the caller.
    pub fn store(&mut self, field: &'static str, value: String) -> String {
        self.values.insert(field, value.clone());
        value
    }

    /// Number of fields resolved so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether any field has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_store_and_get() {
        let mut context = ExtractionContext::new();
        assert_eq!(context.get("document_number"), None);

        let value = context.store("document_number", "4521".to_string());
        assert_eq!(value, "4521");
        assert_eq!(context.get("document_number"), Some("4521"));
    }

    #[test]
    fn test_empty_result_is_cached() {
        let mut context = ExtractionContext::new();
        context.store("vat_number", String::new());
        assert_eq!(context.get("vat_number"), Some(""));
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_store_overwrites() {
        let mut context = ExtractionContext::new();
        context.store("date", "19/05/2025".to_string());
        context.store("date", "20/05/2025".to_string());
        assert_eq!(context.get("date"), Some("20/05/2025"));
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_new_context_is_empty() {
        let context = ExtractionContext::new();
        assert!(context.is_empty());
        assert_eq!(context.len(), 0);
    }
}
