//! Error types for the ddtft-core library.

use thiserror::Error;

/// Main error type for the ddtft library.
#[derive(Error, Debug)]
pub enum DdtftError {
    /// Document extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to document field extraction.
///
/// An unresolved field is never an error (it defaults to empty); these
/// variants only signal that a whole family-specific extractor gave up,
/// which the orchestrator answers by switching to the generic pipeline.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The input text is empty or whitespace-only.
    #[error("document text is empty")]
    EmptyText,

    /// Failed to parse a captured value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },

    /// The family-specific extractor produced nothing usable.
    #[error("no document data found")]
    NoData,
}

/// Errors related to configuration and lookup-table loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config: {0}")]
    Read(String),

    /// Failed to parse the configuration JSON.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for the ddtft library.
pub type Result<T> = std::result::Result<T, DdtftError>;
