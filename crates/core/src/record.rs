//! Structured analysis records parsed from model responses.
//!
//! The model is asked for a flat JSON object, one key per field. It does not
//! always comply, so a failed parse is an ordinary outcome carried by
//! [`InvalidResponse`] rather than an [`crate::Error`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Placeholder the model is told to use for fields it cannot determine.
pub const NOT_MENTIONED: &str = "Not mentioned";

/// One deck's analysis: field name to value, in the order the model wrote them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnalysisRecord {
    fields: Map<String, Value>,
}

impl AnalysisRecord {
    /// Parse a raw model response as a single JSON object.
    ///
    /// No repair is attempted: surrounding prose, code fences, arrays and bare
    /// scalars are all rejected.
    pub fn parse(raw: &str) -> Result<Self, InvalidResponse> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(other) => Err(InvalidResponse::new(
                raw,
                format!("expected a JSON object, got {}", json_kind(&other)),
            )),
            Err(e) => Err(InvalidResponse::new(raw, e.to_string())),
        }
    }

    /// Field names, in response order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the model reported this field as not mentioned.
    pub fn is_not_mentioned(&self, key: &str) -> bool {
        matches!(self.fields.get(key), Some(Value::String(s)) if s.trim() == NOT_MENTIONED)
    }

    /// Render a field as opaque cell text.
    ///
    /// Strings are used as-is, `null` and absent keys become empty, anything
    /// else (nested objects, lists, numbers) is written as compact JSON.
    pub fn cell_text(&self, key: &str) -> String {
        match self.fields.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Pretty-printed JSON for display.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.fields).unwrap_or_default()
    }
}

/// A model response that could not be turned into an [`AnalysisRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidResponse {
    /// The response exactly as received.
    pub raw: String,
    /// Why parsing failed.
    pub reason: String,
}

impl InvalidResponse {
    /// Message shown to the user when a response is dropped.
    pub const MESSAGE: &'static str = "Error: LLM response is not valid JSON!";

    pub fn new(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for InvalidResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", Self::MESSAGE, self.reason)
    }
}

impl std::error::Error for InvalidResponse {}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_keeps_keys_in_order() {
        let raw = r#"{"Name of the Startup": "Acme Robotics", "Problem statement": "Cold pizza", "Founded year": "Not mentioned"}"#;
        let record = AnalysisRecord::parse(raw).unwrap();

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(
            keys,
            vec!["Name of the Startup", "Problem statement", "Founded year"]
        );
        assert_eq!(record.cell_text("Name of the Startup"), "Acme Robotics");
        assert!(record.is_not_mentioned("Founded year"));
        assert!(!record.is_not_mentioned("Problem statement"));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let raw = "Here is the analysis:\n{\"Name of the Startup\": \"Acme\"";
        let err = AnalysisRecord::parse(raw).unwrap_err();
        assert_eq!(err.raw, raw);
        assert!(!err.reason.is_empty());
        assert!(err.to_string().starts_with(InvalidResponse::MESSAGE));
    }

    #[test]
    fn test_parse_rejects_non_object_json() {
        let err = AnalysisRecord::parse(r#"["Acme", "Robotics"]"#).unwrap_err();
        assert_eq!(err.reason, "expected a JSON object, got an array");

        let err = AnalysisRecord::parse("42").unwrap_err();
        assert_eq!(err.reason, "expected a JSON object, got a number");
    }

    #[test]
    fn test_parse_rejects_code_fenced_json() {
        let raw = "```json\n{\"Name of the Startup\": \"Acme\"}\n```";
        assert!(AnalysisRecord::parse(raw).is_err());
    }

    #[test]
    fn test_cell_text_for_nested_values() {
        let raw = r#"{
            "Market size": {"TAM": "$10B", "SAM": "$1B"},
            "Team profile": ["Tanmay: CEO", "Ravi: CTO"],
            "Founded year": 2021,
            "Website": null
        }"#;
        let record = AnalysisRecord::parse(raw).unwrap();

        assert_eq!(record.cell_text("Market size"), r#"{"TAM":"$10B","SAM":"$1B"}"#);
        assert_eq!(record.cell_text("Team profile"), r#"["Tanmay: CEO","Ravi: CTO"]"#);
        assert_eq!(record.cell_text("Founded year"), "2021");
        assert_eq!(record.cell_text("Website"), "");
        assert_eq!(record.cell_text("Missing"), "");
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let record = AnalysisRecord::parse(r#"{"b": "2", "a": "1"}"#).unwrap();
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"b":"2","a":"1"}"#);
    }
}
