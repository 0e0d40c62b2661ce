//! Declarative field validation.
//!
//! A [`Schema`] lists the fields of one form, each with an ordered list of
//! [`FieldRule`]s, plus cross-field rules that only run once every field is
//! individually valid. [`validate`] interprets a schema against a candidate
//! [`Record`] and never fails: invalid input is reported as
//! [`ValidationResult::Invalid`].

pub mod rule;
pub mod schema;
pub mod validator;

use std::collections::BTreeMap;

use serde::Serialize;

pub use rule::{CrossFieldRule, FieldRule};
pub use schema::{Schema, SchemaError};
pub use validator::validate;

/// Value of a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    /// Textual view of the value, as seen by text rules.
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s.as_str(),
            FieldValue::Flag(true) => "true",
            FieldValue::Flag(false) => "",
        }
    }

    pub fn is_checked(&self) -> bool {
        match self {
            FieldValue::Text(s) => is_truthy(s),
            FieldValue::Flag(b) => *b,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Mapping from field name to value.
pub type Record = BTreeMap<String, FieldValue>;

/// Mapping from field name to the message of its first failing rule.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid(Record),
    Invalid(FieldErrors),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationResult::Invalid(errors) => Some(errors),
            ValidationResult::Valid(_) => None,
        }
    }
}

/// Checkbox coercion: `on`, `true`, `1` and `yes` are checked, anything else is not.
pub fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}
