//! Report generation: deck text in, raw model response out.

use crate::prompt::{PromptTemplate, SYSTEM_INSTRUCTION};
use crate::ChatModel;
use pitch_core::{ExtractedText, Result};

/// Renders the analysis prompt for a deck and asks the model for a report.
#[derive(Debug, Clone)]
pub struct ReportGenerator<M> {
    model: M,
    template: PromptTemplate,
    system: String,
}

impl<M: ChatModel> ReportGenerator<M> {
    /// Create a generator using the standard pitch deck prompt.
    pub fn new(model: M) -> Self {
        Self {
            model,
            template: PromptTemplate::pitch_deck(),
            system: SYSTEM_INSTRUCTION.to_string(),
        }
    }

    /// Replace the user prompt template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// The full user prompt that would be sent for this text.
    pub fn prompt_for(&self, text: &ExtractedText) -> String {
        self.template.render(&text.as_text())
    }

    /// Send the prompt and return the model's reply without interpreting it.
    ///
    /// Service failures are returned unchanged.
    pub fn generate(&self, text: &ExtractedText) -> Result<String> {
        let prompt = self.prompt_for(text);
        log::debug!("Prompt is {} bytes for {} lines of deck text", prompt.len(), text.len());
        self.model.complete(&self.system, &prompt)
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}
