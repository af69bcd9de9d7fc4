//! Domain types for uploaded decks and their extracted text.

use crate::Result;
use std::fmt;
use std::path::Path;

/// The format of an uploaded pitch deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
}

impl DeckFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Detect format from the extension of a file name or path.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// An uploaded deck, held in memory until it has been extracted.
#[derive(Debug, Clone)]
pub struct PitchDeckFile {
    /// Original filename (without path).
    pub filename: String,

    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl PitchDeckFile {
    /// Wrap bytes that were already loaded.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Load a deck from disk.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Ok(Self::new(file_name(path), bytes))
    }

    /// Load a deck from disk if its extension is supported.
    ///
    /// Other paths are never touched: they come back empty, so extraction
    /// reports them as unsupported even when they do not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match DeckFormat::from_path(path) {
            Some(_) => Self::read(path),
            None => Ok(Self::new(file_name(path), Vec::new())),
        }
    }

    /// The declared format, from the filename.
    pub fn format(&self) -> Option<DeckFormat> {
        DeckFormat::from_path(&self.filename)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Text of every text-bearing shape in a deck, slide then shape order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    lines: Vec<String>,
}

impl ExtractedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the text of one shape.
    pub fn push_shape(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    /// One entry per shape, in document order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render as a single string, each shape on its own newline-terminated line.
    pub fn as_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Outcome of running the extractor on one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The deck was read and its text collected.
    Text(ExtractedText),
    /// The upload is not in a supported format; nothing was read.
    Unsupported,
}

impl Extraction {
    /// Message shown in place of a result for unsupported uploads.
    pub const UNSUPPORTED_MESSAGE: &'static str = "Unsupported file format";

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported)
    }
}
