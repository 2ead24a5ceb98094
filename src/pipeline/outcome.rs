//! Per-item results of the two stages.

use crate::error::FetchError;
use serde_json::Value;
use std::fmt;

/// Integer derived from one fetch outcome by the process stage.
pub type ProcessedResult = usize;

/// Terminal result of fetching one resource.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Decoded JSON body of a 200 response
    Success(Value),
    /// Why no payload was produced
    Failure(FetchError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(err) => Some(err),
        }
    }

    /// Human-readable failure reason, e.g. `"404"` or `"timeout"`.
    pub fn reason(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }
}

impl From<Result<Value, FetchError>> for FetchOutcome {
    fn from(result: Result<Value, FetchError>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(err) => Self::Failure(err),
        }
    }
}

/// Renders the payload as compact JSON, or `None` for a failure.
impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(payload) => write!(f, "{}", payload),
            Self::Failure(_) => f.write_str("None"),
        }
    }
}

/// Size of a decoded payload.
///
/// Containers count their entries and strings their characters. `null`,
/// `false` and zero are empty; any other scalar counts as one value.
pub fn payload_size(payload: &Value) -> usize {
    match payload {
        Value::Null => 0,
        Value::Bool(b) => usize::from(*b),
        Value::Number(n) => {
            let is_zero = n.as_f64().map_or(false, |v| v == 0.0);
            usize::from(!is_zero)
        }
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_size() {
        assert_eq!(payload_size(&json!({"a": 1, "b": 2, "c": 3})), 3);
        assert_eq!(payload_size(&json!([1, 2, 3, 4])), 4);
        assert_eq!(payload_size(&json!("héllo")), 5);
        assert_eq!(payload_size(&json!({})), 0);
        assert_eq!(payload_size(&json!([])), 0);
        assert_eq!(payload_size(&json!("")), 0);
        assert_eq!(payload_size(&Value::Null), 0);
        assert_eq!(payload_size(&json!(false)), 0);
        assert_eq!(payload_size(&json!(0)), 0);
        assert_eq!(payload_size(&json!(true)), 1);
        assert_eq!(payload_size(&json!(42.5)), 1);
    }

    #[test]
    fn test_outcome_display() {
        let success = FetchOutcome::Success(json!({"id": 1}));
        assert_eq!(success.to_string(), r#"{"id":1}"#);

        let failure = FetchOutcome::Failure(FetchError::HttpStatus(404));
        assert_eq!(failure.to_string(), "None");
        assert_eq!(failure.reason().as_deref(), Some("404"));
        assert!(success.reason().is_none());
    }
}
