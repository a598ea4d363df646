//! Data models: the canonical document record and the lookup-table
//! configuration.

pub mod config;
pub mod document;

pub use config::{EngineConfig, FixedClientAddress, IssuerProfile, LookupTables};
pub use document::{DocumentRecord, DocumentTotals, DocumentType, LineItem, VatRate};
