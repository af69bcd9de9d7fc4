//! Core domain types, model response parsing, and result aggregation
//! for pitch deck analysis.

pub mod error;
pub mod record;
pub mod table;
pub mod types;

pub use error::{Error, Result};
pub use record::{AnalysisRecord, InvalidResponse, NOT_MENTIONED};
pub use table::ResultTable;
pub use types::{DeckFormat, ExtractedText, Extraction, PitchDeckFile};
