//! Shape validation for loosely typed model payloads.
//!
//! Builders never see malformed input: a payload that fails to parse or fails
//! its minimum-shape check is replaced by the type's static fallback, and the
//! substitution is reported through `Validated::Fallback`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// A payload produced by a language model, with a minimum shape and a fallback.
pub trait ModelPayload: DeserializeOwned + Sized {
    /// Short name used in logs.
    const NAME: &'static str;

    /// Returns a description of the first missing requirement, if any.
    fn check_shape(&self) -> Result<(), String>;

    /// Deterministic static payload used when the model's output is unusable.
    fn fallback() -> Self;
}

/// Either the model's payload, or the fallback plus why it was used.
#[derive(Debug, Clone, PartialEq)]
pub enum Validated<T> {
    Model(T),
    Fallback { payload: T, reason: String },
}

impl<T> Validated<T> {
    pub fn payload(&self) -> &T {
        match self {
            Validated::Model(payload) | Validated::Fallback { payload, .. } => payload,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Validated::Model(payload) | Validated::Fallback { payload, .. } => payload,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Validated::Fallback { .. })
    }

    /// `"model"` or `"fallback"`, as reported in the `x-export-source` header.
    pub fn source(&self) -> &'static str {
        if self.is_fallback() {
            "fallback"
        } else {
            "model"
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

fn fallback<T: ModelPayload>(reason: String) -> Validated<T> {
    warn!(payload = T::NAME, %reason, "Model payload rejected, using fallback");
    Validated::Fallback {
        payload: T::fallback(),
        reason,
    }
}

fn checked<T: ModelPayload>(payload: T) -> Validated<T> {
    match payload.check_shape() {
        Ok(()) => Validated::Model(payload),
        Err(reason) => fallback(reason),
    }
}

/// Parses raw model text (optionally fenced) into `T`.
pub fn parse_or_fallback<T: ModelPayload>(raw: &str) -> Validated<T> {
    match serde_json::from_str::<T>(strip_json_fences(raw)) {
        Ok(payload) => checked(payload),
        Err(e) => fallback(format!("invalid JSON: {e}")),
    }
}

/// Converts an already-parsed JSON value. A JSON string is treated as raw model text.
pub fn from_value_or_fallback<T: ModelPayload>(value: Value) -> Validated<T> {
    match value {
        Value::String(raw) => parse_or_fallback(&raw),
        Value::Null => fallback("payload missing".to_string()),
        other => match serde_json::from_value::<T>(other) {
            Ok(payload) => checked(payload),
            Err(e) => fallback(format!("unexpected shape: {e}")),
        },
    }
}

/// True when `s` has visible content.
pub(crate) fn present(s: &str) -> bool {
    !s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Tracklist {
        #[serde(default)]
        tracks: Vec<String>,
    }

    impl ModelPayload for Tracklist {
        const NAME: &'static str = "tracklist";

        fn check_shape(&self) -> Result<(), String> {
            if self.tracks.len() < 2 {
                return Err(format!("expected at least 2 tracks, got {}", self.tracks.len()));
            }
            Ok(())
        }

        fn fallback() -> Self {
            Tracklist {
                tracks: vec!["Intro".to_string(), "Outro".to_string()],
            }
        }
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_valid_fenced_payload_is_model() {
        let raw = "```json\n{\"tracks\": [\"A\", \"B\", \"C\"]}\n```";
        let validated: Validated<Tracklist> = parse_or_fallback(raw);
        assert_eq!(validated.source(), "model");
        assert_eq!(validated.payload().tracks.len(), 3);
    }

    #[test]
    fn test_short_payload_falls_back_with_reason() {
        let validated: Validated<Tracklist> = from_value_or_fallback(json!({"tracks": ["A"]}));
        match validated {
            Validated::Fallback { payload, reason } => {
                assert_eq!(payload, Tracklist::fallback());
                assert!(reason.contains("at least 2"), "reason was {reason}");
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_falls_back() {
        let validated: Validated<Tracklist> = parse_or_fallback("Sure! Here is your tracklist:");
        assert!(validated.is_fallback());
        assert_eq!(validated.into_inner(), Tracklist::fallback());
    }

    #[test]
    fn test_string_value_is_parsed_as_raw_text() {
        let validated: Validated<Tracklist> =
            from_value_or_fallback(json!("{\"tracks\": [\"A\", \"B\"]}"));
        assert!(!validated.is_fallback());
    }

    #[test]
    fn test_null_value_falls_back() {
        let validated: Validated<Tracklist> = from_value_or_fallback(Value::Null);
        assert!(validated.is_fallback());
    }
}
