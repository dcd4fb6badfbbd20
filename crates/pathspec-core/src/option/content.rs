//! File content options: raw text and parsed structured content.
//!
//! Content can be arbitrarily large, so failure messages never echo it
//! unless it is short.
//!
//! Plain content tolerates binary files; parsed content requires UTF-8.

use std::path::Path;

use super::{summarize, OptionDefinition, OptionKey};
use crate::error::FetchError;
use crate::value::{yaml_to_json_value, Value, ValueKind};

fn read_error(e: std::io::Error) -> FetchError {
    FetchError::Failed(format!("expected readable content, but got error: {e}"))
}

/// Raw file bytes as text. Invalid UTF-8 sequences become U+FFFD so
/// binary files can still be compared and searched.
fn read_lossy(path: &Path) -> Result<String, FetchError> {
    let bytes = std::fs::read(path).map_err(read_error)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Strict UTF-8 text, for content that must parse.
fn read_text(path: &Path) -> Result<String, FetchError> {
    std::fs::read_to_string(path).map_err(read_error)
}

/// Whole-file text. A `Text` literal must equal the content; a `Pattern`
/// literal must match somewhere in it.
#[derive(Debug)]
pub(super) struct Content;

impl OptionDefinition for Content {
    fn key(&self) -> OptionKey {
        OptionKey::Content
    }

    fn valid_literal_kinds(&self) -> &'static [ValueKind] {
        &[ValueKind::Text, ValueKind::Pattern]
    }

    fn fetch_actual(&self, path: &Path, _follow_links: bool) -> Result<Value, FetchError> {
        read_lossy(path).map(Value::Text)
    }

    fn literal_match(&self, actual: &Value, expected: &Value) -> bool {
        match (actual, expected) {
            (Value::Text(text), Value::Pattern(re)) => re.is_match(text),
            _ => actual == expected,
        }
    }

    fn literal_failure_message(&self, actual: &Value, expected: &Value) -> String {
        match expected {
            Value::Pattern(_) => format!(
                "expected content to match {expected}, but {}",
                summarize(actual, "it did not")
            ),
            _ => format!(
                "expected content to be {expected}, but {}",
                summarize(actual, "it was not")
            ),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) enum Format {
    Json,
    Yaml,
}

impl Format {
    fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }

    fn parse(self, text: &str) -> Result<serde_json::Value, String> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Self::Yaml => {
                let yaml: serde_yaml::Value =
                    serde_yaml::from_str(text).map_err(|e| e.to_string())?;
                yaml_to_json_value(&yaml)
            }
        }
    }
}

/// Structured content. The literal `true` asserts only that the content
/// parses; predicates receive the parsed document.
#[derive(Debug)]
pub(super) struct ParsedContent(Format);

pub(super) static JSON_CONTENT: ParsedContent = ParsedContent(Format::Json);
pub(super) static YAML_CONTENT: ParsedContent = ParsedContent(Format::Yaml);

impl OptionDefinition for ParsedContent {
    fn key(&self) -> OptionKey {
        match self.0 {
            Format::Json => OptionKey::JsonContent,
            Format::Yaml => OptionKey::YamlContent,
        }
    }

    fn label(&self) -> &'static str {
        match self.0 {
            Format::Json => "JSON content",
            Format::Yaml => "YAML content",
        }
    }

    fn valid_literal_kinds(&self) -> &'static [ValueKind] {
        &[ValueKind::Bool]
    }

    fn validate_literal(&self, literal: &Value) -> Result<(), String> {
        match literal {
            Value::Bool(true) => Ok(()),
            _ => Err("a Predicate or true".into()),
        }
    }

    fn fetch_actual(&self, path: &Path, _follow_links: bool) -> Result<Value, FetchError> {
        let text = read_text(path)?;
        self.0.parse(&text).map(Value::Document).map_err(|e| {
            FetchError::Failed(format!(
                "expected valid {} content, but got error: {e}",
                self.0.name()
            ))
        })
    }

    fn literal_match(&self, _actual: &Value, _expected: &Value) -> bool {
        true
    }
}
