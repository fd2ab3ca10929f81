use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RenderDataError;

/// One node of a decision flowchart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStep {
    pub role: String,
    pub action: String,
}

impl FlowStep {
    pub fn new(role: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            action: action.into(),
        }
    }

    /// Interprets one raw step entry as returned by the classifier.
    ///
    /// An entry is well-formed when it is an array of at least two elements;
    /// trailing elements are ignored. Non-string elements are rendered with
    /// their JSON text.
    pub fn from_raw(raw: &Value) -> Result<Self, RenderDataError> {
        match raw.as_array() {
            Some(items) if items.len() >= 2 => Ok(Self {
                role: display_text(&items[0]),
                action: display_text(&items[1]),
            }),
            Some(items) => Err(RenderDataError::TooFewElements { found: items.len() }),
            None => Err(RenderDataError::NotASequence {
                found: raw.to_string(),
            }),
        }
    }
}

impl From<FlowStep> for Value {
    fn from(step: FlowStep) -> Self {
        Value::Array(vec![Value::String(step.role), Value::String(step.action)])
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Outcome of a successful classification query.
///
/// `steps` stays untyped so that malformed entries reach the renderer, which
/// skips them one at a time instead of rejecting the whole diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub result_level: String,
    pub steps: Option<Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_pair_and_ignores_trailing_elements() {
        let step = FlowStep::from_raw(&json!(["Engineer", "Review", "extra"])).expect("step");
        assert_eq!(step, FlowStep::new("Engineer", "Review"));
    }

    #[test]
    fn renders_non_string_elements_as_json_text() {
        let step = FlowStep::from_raw(&json!([7, null])).expect("step");
        assert_eq!(step, FlowStep::new("7", "null"));
    }

    #[test]
    fn rejects_short_and_non_array_entries() {
        assert!(matches!(
            FlowStep::from_raw(&json!(["X"])),
            Err(RenderDataError::TooFewElements { found: 1 })
        ));
        assert!(matches!(
            FlowStep::from_raw(&json!({"role": "X"})),
            Err(RenderDataError::NotASequence { .. })
        ));
    }
}
