//! `hymnscan` - scanned hymnal pages to structured hymn records.
//!
//! This crate turns per-page OCR text into hymn records (number, title,
//! verses), stores them as one JSON file per hymn, reports on extraction
//! coverage and builds metadata indices for a hymnal volume.

// Re-export public modules for use in integration tests and binaries
pub mod config;
pub mod constants;
pub mod coverage;
pub mod drafts;
pub mod driver;
pub mod error;
pub mod extract;
pub mod index;
pub mod ocr;
pub mod store;
pub mod types;
