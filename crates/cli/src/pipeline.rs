//! Per-file analysis pipeline and session aggregation.

use pitch_core::{AnalysisRecord, Extraction, InvalidResponse, PitchDeckFile, Result, ResultTable};
use pitch_llm::{ChatModel, ReportGenerator};
use pitch_pptx::PptxExtractor;
use pitch_xlsx::XlsxWriter;
use std::path::{Path, PathBuf};

/// What happened to one uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// The model's reply parsed into a record.
    Analyzed(AnalysisRecord),
    /// The file is not a supported deck; the model was not called.
    Unsupported,
    /// The model replied with something other than a JSON object.
    InvalidJson(InvalidResponse),
}

/// Progress notifications emitted while a session runs.
#[derive(Debug)]
pub enum SessionEvent<'a> {
    /// About to extract and analyze this file.
    Processing(&'a PitchDeckFile),
    /// Finished with this file.
    Finished(&'a PitchDeckFile, &'a FileOutcome),
}

/// Extract, analyze and parse decks one at a time.
pub struct Analyzer<M> {
    extractor: PptxExtractor,
    generator: ReportGenerator<M>,
}

impl<M: ChatModel> Analyzer<M> {
    pub fn new(model: M) -> Self {
        Self::with_generator(ReportGenerator::new(model))
    }

    pub fn with_generator(generator: ReportGenerator<M>) -> Self {
        Self {
            extractor: PptxExtractor::new(),
            generator,
        }
    }

    /// Run one file through extraction, the model, and response parsing.
    ///
    /// Unsupported uploads and malformed replies are outcomes; I/O, archive
    /// and API failures are errors.
    pub fn process_file(&self, file: &PitchDeckFile) -> Result<FileOutcome> {
        let text = match self.extractor.extract(file)? {
            Extraction::Text(text) => text,
            Extraction::Unsupported => return Ok(FileOutcome::Unsupported),
        };
        log::info!("{}: extracted {} text shapes", file.filename, text.len());

        let raw = self.generator.generate(&text)?;

        match AnalysisRecord::parse(&raw) {
            Ok(record) => {
                log::info!("{}: parsed {} fields", file.filename, record.len());
                Ok(FileOutcome::Analyzed(record))
            }
            Err(invalid) => {
                log::info!("{}: {}", file.filename, invalid);
                Ok(FileOutcome::InvalidJson(invalid))
            }
        }
    }

    /// Process every file in order and collect the successful records.
    ///
    /// The first error aborts the session.
    pub fn run_session<F>(&self, files: &[PitchDeckFile], mut on_event: F) -> Result<ResultTable>
    where
        F: FnMut(SessionEvent<'_>),
    {
        let mut table = ResultTable::new();

        for file in files {
            on_event(SessionEvent::Processing(file));
            let outcome = self.process_file(file)?;
            on_event(SessionEvent::Finished(file, &outcome));
            if let FileOutcome::Analyzed(record) = outcome {
                table.push(record);
            }
        }

        Ok(table)
    }
}

/// Write the session's spreadsheet, unless there is nothing to export.
///
/// Returns the path written, or `None` for an empty table.
pub fn export_report(table: &ResultTable, path: &Path) -> Result<Option<PathBuf>> {
    if table.is_empty() {
        log::info!("No records, skipping spreadsheet export");
        return Ok(None);
    }
    XlsxWriter::new().write_to_path(table, path)?;
    log::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(Some(path.to_path_buf()))
}
