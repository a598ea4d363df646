//! Core library for Italian trade document field extraction.
//!
//! This crate provides:
//! - Document family classification (delivery notes vs. invoices)
//! - Regex-cascade field extractors with per-document memoization
//! - Delivery-address resolution with issuer/carrier exclusion
//! - Line-item parsing with VAT breakdown and totals reconciliation
//! - The canonical document record and configurable lookup tables

// The pattern module expands one large lazy_static block.
#![recursion_limit = "256"]

pub mod document;
pub mod error;
pub mod models;

pub use document::{
    classify_document, DdtExtractor, DocumentExtractor, DocumentFamily, DocumentParser,
    GenericExtractor, InvoiceExtractor, RawDocument,
};
pub use error::{ConfigError, DdtftError, ExtractionError, Result};
pub use models::{
    DocumentRecord, DocumentTotals, DocumentType, EngineConfig, LineItem, LookupTables, VatRate,
};
