use std::sync::OnceLock;

use regex::Regex;

use super::{schema::SchemaError, FieldValue, Record};

/// A single validation predicate on one field, with the message shown when it fails.
#[derive(Debug, Clone)]
pub enum FieldRule {
    Required { message: String },
    MinLength { min: usize, message: String },
    Pattern { regex: Regex, message: String },
    EqualsField { other: String, message: String },
    EmailFormat { message: String },
}

impl FieldRule {
    pub fn required(message: impl Into<String>) -> Self {
        FieldRule::Required {
            message: message.into(),
        }
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        FieldRule::MinLength {
            min,
            message: message.into(),
        }
    }

    /// Compiles `pattern`; a bad expression is a schema defect.
    pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<Self, SchemaError> {
        let regex = Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(FieldRule::Pattern {
            regex,
            message: message.into(),
        })
    }

    pub fn equals_field(other: impl Into<String>, message: impl Into<String>) -> Self {
        FieldRule::EqualsField {
            other: other.into(),
            message: message.into(),
        }
    }

    pub fn email_format(message: impl Into<String>) -> Self {
        FieldRule::EmailFormat {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FieldRule::Required { message }
            | FieldRule::MinLength { message, .. }
            | FieldRule::Pattern { message, .. }
            | FieldRule::EqualsField { message, .. }
            | FieldRule::EmailFormat { message } => message,
        }
    }

    /// Field this rule reads besides its own, if any.
    pub fn referenced_field(&self) -> Option<&str> {
        match self {
            FieldRule::EqualsField { other, .. } => Some(other.as_str()),
            _ => None,
        }
    }

    /// Returns `true` when `value` satisfies the rule. `record` is the whole
    /// candidate, used by rules that look at other fields.
    pub fn check(&self, value: Option<&FieldValue>, record: &Record) -> bool {
        let text = value.map(FieldValue::as_text).unwrap_or_default();

        match self {
            FieldRule::Required { .. } => !text.is_empty(),
            FieldRule::MinLength { min, .. } => text.chars().count() >= *min,
            FieldRule::Pattern { regex, .. } => regex.is_match(text),
            FieldRule::EqualsField { other, .. } => {
                let other = record
                    .get(other)
                    .map(FieldValue::as_text)
                    .unwrap_or_default();
                text == other
            }
            FieldRule::EmailFormat { .. } => is_email(text),
        }
    }
}

/// What a cross-field rule asserts about its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossFieldCheck {
    /// Every listed field holds the same text.
    AllEqual(Vec<String>),
}

/// A rule spanning several fields. Its message is attached to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossFieldRule {
    pub check: CrossFieldCheck,
    pub target: String,
    pub message: String,
}

impl CrossFieldRule {
    /// `fields` must all be equal; failures are reported on `target`.
    pub fn all_equal<I, S>(fields: I, target: impl Into<String>, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            check: CrossFieldCheck::AllEqual(fields.into_iter().map(Into::into).collect()),
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        let CrossFieldCheck::AllEqual(fields) = &self.check;
        fields.iter().map(String::as_str).chain(Some(self.target.as_str()))
    }

    pub fn check(&self, record: &Record) -> bool {
        match &self.check {
            CrossFieldCheck::AllEqual(fields) => {
                let mut values = fields.iter().map(|field| {
                    record
                        .get(field)
                        .map(FieldValue::as_text)
                        .unwrap_or_default()
                });
                match values.next() {
                    Some(first) => values.all(|value| value == first),
                    None => true,
                }
            }
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
            .expect("email pattern compiles")
    })
}

/// `local@domain.tld` check. The regex crate has no look-around, so the
/// leading dot and double dot restrictions are checked by hand.
pub fn is_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && email_regex().is_match(value)
}
