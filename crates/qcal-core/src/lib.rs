//! Core domain logic for qcal.
//!
//! This crate contains the bulk ingestion pipeline:
//! - Alias store: persisted mapping from short aliases to calendar IDs
//! - Line parser: splitting one line into (target calendar, clean text)
//! - Batch submitter: per-line submission with per-line error collection

pub mod alias;
pub mod batch;
pub mod parse;

pub use alias::{AliasMap, AliasStore, AliasStoreError};
pub use batch::{BatchResult, CreatedEvent, EventCreator, LineError, QuickAddResponse, submit_batch};
pub use parse::{PRIMARY_CALENDAR, ParseError, ParsedEvent, parse_line};
