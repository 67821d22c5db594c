//! Expected fixtures: the same shapes as [`Value`] plus full-string patterns.

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Number, Value as JsonValue};

use crate::Value;

/// Regular expression that must match the entire actual text.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: Regex,
    anchored: Regex,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::from_regex(Regex::new(pattern)?))
    }

    pub fn from_regex(source: Regex) -> Self {
        let anchored =
            Regex::new(&format!("^(?:{})$", source.as_str())).unwrap_or_else(|_| source.clone());
        Self { source, anchored }
    }

    pub fn as_str(&self) -> &str {
        self.source.as_str()
    }

    pub fn is_full_match(&self, text: &str) -> bool {
        self.anchored
            .find(text)
            .is_some_and(|found| found.start() == 0 && found.end() == text.len())
    }
}

/// Expected side of a comparison.
#[derive(Clone, Debug)]
pub enum Expected {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Bytes(Vec<u8>),
    Pattern(Pattern),
    List(Vec<Expected>),
    Map(IndexMap<String, Expected>),
}

impl Expected {
    /// Builds a pattern expectation; fails on an invalid regular expression.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Pattern::new(pattern).map(Expected::Pattern)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Expected::Null => "null",
            Expected::Bool(_) => "boolean",
            Expected::Number(_) => "number",
            Expected::String(_) => "string",
            Expected::Bytes(_) => "binary",
            Expected::Pattern(_) => "pattern",
            Expected::List(_) => "list",
            Expected::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Expected::Null)
    }

    /// Renders the expectation with its kind, e.g. `2 <number>`.
    pub fn describe(&self) -> String {
        match self {
            Expected::Null => "null".to_string(),
            Expected::Pattern(pattern) => format!("/{}/ <pattern>", pattern.as_str()),
            other => format!("{other} <{}>", other.kind_name()),
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Null => write!(f, "null"),
            Expected::Bool(flag) => write!(f, "{flag}"),
            Expected::Number(number) => write!(f, "{number}"),
            Expected::String(text) => write!(f, "{}", JsonValue::String(text.clone())),
            Expected::Bytes(content) => write!(f, "<{} bytes>", content.len()),
            Expected::Pattern(pattern) => write!(f, "/{}/", pattern.as_str()),
            Expected::List(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Expected::Map(entries) => {
                write!(f, "{{")?;
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {value}", JsonValue::String(key.clone()))?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<Value> for Expected {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Expected::Null,
            Value::Bool(flag) => Expected::Bool(flag),
            Value::Number(number) => Expected::Number(number),
            Value::String(text) => Expected::String(text),
            Value::Bytes(content) => Expected::Bytes(content),
            Value::List(items) => Expected::List(items.into_iter().map(Expected::from).collect()),
            Value::Map(entries) => Expected::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Expected::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<JsonValue> for Expected {
    fn from(value: JsonValue) -> Self {
        Expected::from(Value::from(value))
    }
}

impl From<Regex> for Expected {
    fn from(regex: Regex) -> Self {
        Expected::Pattern(Pattern::from_regex(regex))
    }
}

impl From<Pattern> for Expected {
    fn from(pattern: Pattern) -> Self {
        Expected::Pattern(pattern)
    }
}

impl From<bool> for Expected {
    fn from(flag: bool) -> Self {
        Expected::Bool(flag)
    }
}

macro_rules! expected_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Expected {
                fn from(number: $ty) -> Self {
                    Expected::from(Value::from(number))
                }
            }
        )*
    };
}

expected_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f64);

impl From<&str> for Expected {
    fn from(text: &str) -> Self {
        Expected::String(text.to_string())
    }
}

impl From<String> for Expected {
    fn from(text: String) -> Self {
        Expected::String(text)
    }
}

impl<T: Into<Expected>> From<Vec<T>> for Expected {
    fn from(items: Vec<T>) -> Self {
        Expected::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Expected>> From<Option<T>> for Expected {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Expected::Null)
    }
}
