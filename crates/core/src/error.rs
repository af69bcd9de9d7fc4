//! Error types for pitch deck analysis.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort processing of a pitch deck.
///
/// A model reply that is not a JSON object is not one of these; see
/// [`crate::InvalidResponse`].
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// ZIP archive error (PPTX container or XLSX output).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    XmlError(String),

    /// The request to the model endpoint could not be sent or read.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The model endpoint answered with a non-success status.
    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// The model endpoint answered, but not in the chat-completions shape.
    #[error("Unexpected API response: {0}")]
    InvalidApiResponse(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to build the spreadsheet export.
    #[error("Export error: {0}")]
    Export(String),
}
