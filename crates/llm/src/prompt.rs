//! The fixed pitch deck analysis prompt.

/// System message sent alongside every analysis prompt.
pub const SYSTEM_INSTRUCTION: &str = "Extract startup details";

/// Placeholder replaced by the extracted deck text.
pub const PITCH_TEXT_PLACEHOLDER: &str = "{pitch_text}";

/// Fields the model is asked to fill, in the order they are listed.
pub const REQUIRED_FIELDS: &[&str] = &[
    "Name of the Startup",
    "Problem statement",
    "Solution",
    "Elevator pitch",
    "Founded year",
    "Location",
    "Industry",
    "Stage of the startup",
    "Website",
    "TAM",
    "SAM",
    "SOM",
    "Revenue channels",
    "Customer segments",
    "Consumer focus",
    "Competitive advantage",
    "Product innovation",
    "Investment looking for",
    "Team profile",
];

const PITCH_DECK_TEMPLATE: &str = r#"
Analyze the following startup pitch deck text and extract structured insights.
**Ensure the response is in valid JSON format.**

Extract the following details:

- **Name of the Startup**
- **Problem statement**: Clearly state the problem the startup is solving in a single line.
- **Solution**: Provide a one-line summary of how the startup addresses the problem.
- **Elevator pitch**: Summarize the startup's value proposition in one sentence.
- **Founded year**: Extract the year in which the startup was founded or incorporated.
- **Location**: Mention the city and country where the startup is based or registered.
- **Industry**: Identify the industry or sector in which the startup operates.
- **Stage of the startup**: Determine if the startup is in the idea stage, early-stage, growth-stage, or mature stage based on available context.
- **Website**: Provide the startup's official website URL (if available).
- **Market size analysis (TAM, SAM, SOM)**:
  - **TAM (Total Addressable Market)**: One-line estimate of the full market demand.
  - **SAM (Serviceable Available Market)**: The subset of TAM that the startup can realistically serve.
  - **SOM (Serviceable Obtainable Market)**: The market share the startup aims to capture.
- **Revenue channels**: How does the startup generate revenue?
- **Customer segments**: Who are the target customers?
- **Consumer focus**: Specify whether the startup operates in B2B, B2C, or a hybrid model.
- **Competitive advantage**: Identify the startup's unique strengths over competitors in one line.
- **Product innovation**: Describe any novel technology, features, or differentiators.
- **Investment looking for**: Specify the funding amount the startup is seeking.
- **Team profile**: List key team members along with their roles. Ex: [Tanmay: CEO, 15+ yrs experience in tech, Ravi: CTO, 10+ yrs in sales]

- **Do not assume details** if they are not explicitly mentioned.
- **Each response should be a single line of meaningful text, not just keywords.**
- If any section is missing, return **"Not mentioned"** instead of making assumptions.
- In your response, do not use any characters that break JSON rules, not even '\n'. Return a pure JSON object.

**Text to analyze:**
```{pitch_text}```
"#;

/// A prompt with a single `{pitch_text}` slot.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Use a custom template. It should contain `{pitch_text}` once.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The standard pitch deck analysis prompt.
    pub fn pitch_deck() -> Self {
        Self::new(PITCH_DECK_TEMPLATE)
    }

    /// Substitute the deck text into the template.
    pub fn render(&self, pitch_text: &str) -> String {
        self.template.replacen(PITCH_TEXT_PLACEHOLDER, pitch_text, 1)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::pitch_deck()
    }
}
