//! SpreadsheetML (XLSX) export of pitch deck analysis results.
//!
//! Builds the workbook directly as a ZIP of XML parts: one sheet, a header
//! row of field names, one row per analyzed deck.

pub mod writer;

pub use writer::{XlsxWriter, DEFAULT_REPORT_FILENAME, XLSX_MIME};
