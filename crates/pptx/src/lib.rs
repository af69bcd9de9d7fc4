//! PPTX (OOXML) text extractor for pitch deck analysis.
//!
//! Reads .pptx files, which are ZIP archives containing XML documents, and
//! collects the text of every shape as one line per shape.

pub mod parser;

pub use parser::PptxExtractor;
