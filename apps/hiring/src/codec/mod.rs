//! Answer codec: reduces loosely-shaped stored answers and correct-answer
//! values to one comparable scalar.
//!
//! # Canonicalization rules
//! 1. `null` / absent / blank string → `Unanswered` (`false` and `0` are answers)
//! 2. string, number, bool → itself (strings trimmed)
//! 3. array → first non-null element (stored multi-select is scored as single choice)
//! 4. object → first of `selectedText`, `text`, `value`, `option`, `label` holding
//!    a non-blank string, else the first non-blank string value in key order
//! 5. anything else → `Unanswered`, displayed as "Invalid answer format"
//!
//! Numbers compare exactly when both sides are integers (no rounding through
//! f64 above 2^53); an integer and a float compare by value, so `1 == 1.0`.
//!
//! Nothing in this module fails: review screens render arbitrary historical data.

pub mod review;
pub mod scoring;

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Object keys tried, in priority order, before falling back to the first
/// string-valued property.
pub const PRIORITY_KEYS: &[&str] = &["selectedText", "text", "value", "option", "label"];

pub const NO_ANSWER: &str = "No answer provided";
pub const EMPTY_ANSWER: &str = "Empty answer";
pub const NO_OPTIONS: &str = "No options selected";
pub const INVALID_FORMAT: &str = "Invalid answer format";

/// The storage shapes an answer blob arrives in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnswerShape<'a> {
    Missing,
    Text(&'a str),
    Number(&'a Number),
    Bool(bool),
    MultiChoice(&'a [Value]),
    KeyedObject(&'a Map<String, Value>),
    Unrecognized,
}

impl<'a> AnswerShape<'a> {
    pub fn classify(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => AnswerShape::Missing,
            Some(Value::String(s)) => AnswerShape::Text(s),
            Some(Value::Number(n)) => AnswerShape::Number(n),
            Some(Value::Bool(b)) => AnswerShape::Bool(*b),
            Some(Value::Array(items)) => AnswerShape::MultiChoice(items),
            // An object without any usable string property matches no rule.
            Some(Value::Object(map)) if keyed_text(map).is_none() => AnswerShape::Unrecognized,
            Some(Value::Object(map)) => AnswerShape::KeyedObject(map),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CanonicalAnswer {
    Text(String),
    Number(Number),
    Bool(bool),
    Unanswered,
}

impl PartialEq for CanonicalAnswer {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CanonicalAnswer::Text(a), CanonicalAnswer::Text(b)) => a == b,
            (CanonicalAnswer::Number(a), CanonicalAnswer::Number(b)) => numbers_equal(a, b),
            (CanonicalAnswer::Bool(a), CanonicalAnswer::Bool(b)) => a == b,
            (CanonicalAnswer::Unanswered, CanonicalAnswer::Unanswered) => true,
            _ => false,
        }
    }
}

impl CanonicalAnswer {
    pub fn is_answered(&self) -> bool {
        !matches!(self, CanonicalAnswer::Unanswered)
    }

    /// Back to a JSON scalar; canonicalizing the result is a no-op.
    pub fn to_value(&self) -> Value {
        match self {
            CanonicalAnswer::Text(s) => Value::String(s.clone()),
            CanonicalAnswer::Number(n) => Value::Number(n.clone()),
            CanonicalAnswer::Bool(b) => Value::Bool(*b),
            CanonicalAnswer::Unanswered => Value::Null,
        }
    }
}

impl fmt::Display for CanonicalAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalAnswer::Text(s) => f.write_str(s),
            CanonicalAnswer::Number(n) => f.write_str(&format_number(n)),
            CanonicalAnswer::Bool(b) => write!(f, "{b}"),
            CanonicalAnswer::Unanswered => f.write_str(NO_ANSWER),
        }
    }
}

pub fn canonicalize(value: &Value) -> CanonicalAnswer {
    canonicalize_opt(Some(value))
}

pub fn canonicalize_opt(value: Option<&Value>) -> CanonicalAnswer {
    match AnswerShape::classify(value) {
        AnswerShape::Missing | AnswerShape::Unrecognized => CanonicalAnswer::Unanswered,
        AnswerShape::Text(s) => canonical_text(s),
        AnswerShape::Number(n) => CanonicalAnswer::Number(n.clone()),
        AnswerShape::Bool(b) => CanonicalAnswer::Bool(b),
        AnswerShape::MultiChoice(items) => items
            .iter()
            .find(|item| !item.is_null())
            .map_or(CanonicalAnswer::Unanswered, canonicalize),
        AnswerShape::KeyedObject(map) => {
            keyed_text(map).map_or(CanonicalAnswer::Unanswered, canonical_text)
        }
    }
}

/// Strict equality of canonical forms. An unanswered submission is never
/// correct, even against a missing correct value.
pub fn is_correct(submitted: Option<&Value>, correct: Option<&Value>) -> bool {
    let submitted = canonicalize_opt(submitted);
    submitted.is_answered() && submitted == canonicalize_opt(correct)
}

/// Human-readable form for the review screen. Never blank.
pub fn display_answer(value: Option<&Value>) -> String {
    match AnswerShape::classify(value) {
        AnswerShape::Missing => NO_ANSWER.to_string(),
        AnswerShape::Text(s) => match s.trim() {
            "" => EMPTY_ANSWER.to_string(),
            trimmed => trimmed.to_string(),
        },
        AnswerShape::Number(n) => format_number(n),
        AnswerShape::Bool(b) => b.to_string(),
        AnswerShape::MultiChoice(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| display_answer(Some(item)))
                .collect();
            if parts.is_empty() {
                NO_OPTIONS.to_string()
            } else {
                parts.join(", ")
            }
        }
        AnswerShape::KeyedObject(map) => keyed_text(map)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| INVALID_FORMAT.to_string()),
        AnswerShape::Unrecognized => INVALID_FORMAT.to_string(),
    }
}

fn canonical_text(s: &str) -> CanonicalAnswer {
    match s.trim() {
        "" => CanonicalAnswer::Unanswered,
        trimmed => CanonicalAnswer::Text(trimmed.to_string()),
    }
}

fn non_blank_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

fn keyed_text(map: &Map<String, Value>) -> Option<&str> {
    PRIORITY_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(non_blank_str))
        .or_else(|| map.values().find_map(non_blank_str))
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    // A negative integer against a u64 beyond i64::MAX lands here too.
    (a.is_f64() || b.is_f64()) && a.as_f64() == b.as_f64()
}

/// Integers print as-is; integral floats print without a fractional part
/// ("42", not "42.0").
fn format_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}
