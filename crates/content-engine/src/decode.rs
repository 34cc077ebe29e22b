//! Conversion of free-text provider replies into validated typed records.
//!
//! Every structured stage goes through the same path:
//!
//! 1. **Locate** the first balanced `{...}` (or `[...]`) fragment with a
//!    string-aware scanner, falling back to the widest first-open/last-close
//!    span when the balanced one does not parse.
//! 2. **Parse** it into a `serde_json::Value`. One lenient cleanup pass
//!    (comments, trailing commas) is tried before giving up.
//! 3. **Validate** the value against the stage's embedded JSON Schema.
//! 4. **Deserialize** into the stage's record type.
//!
//! Replies from providers running in JSON mode are a degenerate case of the
//! above: the whole reply is the fragment.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StageError;
use crate::sanitize;
use crate::stages::Stage;

const RESEARCH_SCHEMA: &str = include_str!("../schema/research-v1.json");
const OPTIMIZER_SCHEMA: &str = include_str!("../schema/optimizer-v1.json");
const SCORER_SCHEMA: &str = include_str!("../schema/scorer-v1.json");
const IDEAS_SCHEMA: &str = include_str!("../schema/ideas-v1.json");

/// Compiled reply schemas. A schema that fails to compile is kept as its
/// error message and reported on every decode for that stage.
static VALIDATORS: LazyLock<HashMap<Stage, Result<jsonschema::Validator, String>>> =
    LazyLock::new(|| {
        [
            (Stage::Research, RESEARCH_SCHEMA),
            (Stage::Optimizer, OPTIMIZER_SCHEMA),
            (Stage::Scorer, SCORER_SCHEMA),
            (Stage::Ideas, IDEAS_SCHEMA),
        ]
        .into_iter()
        .map(|(stage, source)| (stage, compile(source)))
        .collect()
    });

fn compile(source: &str) -> Result<jsonschema::Validator, String> {
    let schema: Value =
        serde_json::from_str(source).map_err(|e| format!("invalid schema JSON: {}", e))?;
    jsonschema::validator_for(&schema).map_err(|e| format!("failed to compile schema: {}", e))
}

/// Which delimiter pair a structured reply is wrapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Object,
    Array,
}

impl Shape {
    fn delimiters(self) -> (char, char) {
        match self {
            Shape::Object => ('{', '}'),
            Shape::Array => ('[', ']'),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Shape::Object => "object",
            Shape::Array => "array",
        }
    }
}

/// Decodes the first JSON object in `reply` into `T`.
pub fn decode_object<T: DeserializeOwned>(stage: Stage, reply: &str) -> Result<T, StageError> {
    decode(stage, reply, Shape::Object)
}

/// Decodes the first JSON array in `reply` into `T`.
pub fn decode_array<T: DeserializeOwned>(stage: Stage, reply: &str) -> Result<T, StageError> {
    decode(stage, reply, Shape::Array)
}

fn decode<T: DeserializeOwned>(stage: Stage, reply: &str, shape: Shape) -> Result<T, StageError> {
    let candidates = locate(reply, shape);
    if candidates.is_empty() {
        warn!(
            stage = %stage,
            reply = %sanitize::for_log(reply),
            "No JSON {} found in provider reply",
            shape.describe()
        );
        return Err(StageError::Extraction {
            stage,
            expected: shape.describe(),
        });
    }

    let value = parse_first(stage, &candidates)?;
    validate(stage, &value)?;

    serde_json::from_value(value).map_err(|e| StageError::contract(stage, e.to_string()))
}

/// Candidate fragments in preference order: the first balanced span, then
/// the widest span from the first opening to the last closing delimiter.
pub(crate) fn locate(text: &str, shape: Shape) -> Vec<&str> {
    let (open, close) = shape.delimiters();
    let Some(start) = text.find(open) else {
        return Vec::new();
    };

    let mut candidates = Vec::with_capacity(2);
    if let Some(end) = balanced_end(&text[start..], open, close) {
        candidates.push(&text[start..start + end]);
    }

    if let Some(last) = text.rfind(close) {
        if last > start {
            let widest = &text[start..=last];
            if candidates.first() != Some(&widest) {
                candidates.push(widest);
            }
        }
    }

    candidates
}

/// Byte offset one past the delimiter closing the one at index 0.
fn balanced_end(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

fn parse_first(stage: Stage, candidates: &[&str]) -> Result<Value, StageError> {
    let mut first_error: Option<String> = None;

    for fragment in candidates {
        match serde_json::from_str::<Value>(fragment) {
            Ok(value) => return Ok(value),
            Err(e) => {
                let cleaned = strip_lenient(fragment);
                if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
                    debug!(stage = %stage, "Parsed provider JSON after lenient cleanup");
                    return Ok(value);
                }
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    let fragment = candidates.first().copied().unwrap_or_default();
    warn!(
        stage = %stage,
        fragment = %sanitize::for_log(fragment),
        "Provider reply contained malformed JSON"
    );
    Err(StageError::Parse {
        stage,
        reason: first_error.unwrap_or_else(|| "unparsable fragment".to_string()),
        fragment: sanitize::for_log(fragment),
    })
}

/// Removes `//` and `/* */` comments and trailing commas that appear
/// outside string literals.
pub(crate) fn strip_lenient(fragment: &str) -> String {
    let chars: Vec<char> = fragment.chars().collect();
    let mut out = String::with_capacity(fragment.len());
    let mut in_string = false;
    let mut escape_next = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_string {
            out.push(c);
            if escape_next {
                escape_next = false;
            } else if c == '\\' {
                escape_next = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn validate(stage: Stage, value: &Value) -> Result<(), StageError> {
    let Some(compiled) = VALIDATORS.get(&stage) else {
        return Ok(());
    };

    let validator = compiled
        .as_ref()
        .map_err(|e| StageError::contract(stage, format!("embedded reply schema: {}", e)))?;

    let errors: Vec<String> = validator.iter_errors(value).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        return Ok(());
    }

    warn!(stage = %stage, errors = errors.len(), "Provider reply failed schema validation");
    Err(StageError::contract(stage, errors.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        name: String,
    }

    // ── Locating ──

    #[test]
    fn test_locate_skips_surrounding_prose() {
        let text = "Sure! Here is the JSON:\n```json\n{\"name\": \"a\"}\n```\nHope it helps.";
        let found = locate(text, Shape::Object);
        assert_eq!(found[0], "{\"name\": \"a\"}");
    }

    #[test]
    fn test_locate_ignores_braces_inside_strings() {
        let text = r#"{"name": "a } tricky \" { value"} trailing }"#;
        let found = locate(text, Shape::Object);
        assert_eq!(found[0], r#"{"name": "a } tricky \" { value"}"#);
    }

    #[test]
    fn test_locate_array() {
        let text = "Ideas:\n[{\"title\": \"x\"}]\n";
        assert_eq!(locate(text, Shape::Array)[0], "[{\"title\": \"x\"}]");
    }

    #[test]
    fn test_locate_nothing() {
        assert!(locate("no structure here", Shape::Object).is_empty());
        assert!(locate("closing only }", Shape::Object).is_empty());
    }

    #[test]
    fn test_locate_unbalanced_falls_back_to_widest() {
        assert_eq!(locate("{\"a\": {\"b\": 1} }", Shape::Object).len(), 1);

        let text = "{ {\"name\": \"a\"}";
        assert_eq!(locate(text, Shape::Object), vec![text]);
    }

    // ── Lenient cleanup ──

    #[test]
    fn test_strip_trailing_commas_and_comments() {
        let text = "{\n  // comment\n  \"a\": [1, 2,],\n  /* block */ \"b\": \"x, }\",\n}";
        let cleaned = strip_lenient(text);
        let value: Value = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(value["a"], serde_json::json!([1, 2]));
        assert_eq!(value["b"], "x, }");
    }

    #[test]
    fn test_strip_keeps_slashes_inside_strings() {
        let text = r#"{"url": "https://example.com/a"}"#;
        assert_eq!(strip_lenient(text), text);
    }

    // ── Full decode ──

    #[test]
    fn test_decode_without_schema_stage() {
        let probe: Probe = decode_object(Stage::Writer, "text {\"name\": \"ok\"} text").unwrap();
        assert_eq!(probe.name, "ok");
    }

    #[test]
    fn test_decode_extraction_error() {
        let err = decode_object::<Probe>(Stage::Research, "I could not find anything.").unwrap_err();
        assert!(matches!(
            err,
            StageError::Extraction {
                stage: Stage::Research,
                expected: "object"
            }
        ));
    }

    #[test]
    fn test_decode_parse_error_carries_truncated_fragment() {
        let reply = format!("{{\"name\": {}", "x".repeat(2000)) + "}";
        let err = decode_object::<Probe>(Stage::Writer, &reply).unwrap_err();
        match err {
            StageError::Parse { fragment, .. } => {
                assert!(fragment.ends_with("(truncated)"));
                assert!(fragment.chars().count() < 600);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_recovers_trailing_comma() {
        let probe: Probe = decode_object(Stage::Writer, "{\"name\": \"ok\",}").unwrap();
        assert_eq!(probe.name, "ok");
    }

    #[test]
    fn test_schema_violation_is_contract_error() {
        let err = decode_object::<Value>(Stage::Research, "{\"keyFindings\": []}").unwrap_err();
        assert!(matches!(
            err,
            StageError::Contract {
                stage: Stage::Research,
                ..
            }
        ));
    }

    #[test]
    fn test_ideas_priority_out_of_range_is_contract_error() {
        let reply = r#"[{"title": "t", "suggestedAuthor": "pinky", "priority": 9}]"#;
        let err = decode_array::<Value>(Stage::Ideas, reply).unwrap_err();
        assert!(matches!(err, StageError::Contract { .. }));
    }

    #[test]
    fn test_embedded_schemas_compile() {
        for stage in [Stage::Research, Stage::Optimizer, Stage::Scorer, Stage::Ideas] {
            assert!(
                VALIDATORS.get(&stage).map(|v| v.is_ok()).unwrap_or(false),
                "{} schema",
                stage
            );
        }
    }
}
