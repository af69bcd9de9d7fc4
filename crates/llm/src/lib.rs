//! Prompt template and chat-completions client for pitch deck analysis.
//!
//! [`ReportGenerator`] turns extracted deck text into a prompt and returns
//! the model's raw reply. The model sits behind the [`ChatModel`] trait;
//! [`ChatCompletionsClient`] talks to any OpenAI-compatible endpoint.

pub mod client;
pub mod config;
pub mod generator;
pub mod prompt;

pub use client::{ChatCompletionsClient, ChatModel};
pub use config::{LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use generator::ReportGenerator;
pub use prompt::{PromptTemplate, REQUIRED_FIELDS, SYSTEM_INSTRUCTION};
