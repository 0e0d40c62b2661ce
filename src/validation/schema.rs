use std::collections::HashSet;

use super::{is_truthy, CrossFieldRule, FieldRule, FieldValue};

/// Errors in a schema declaration. These are programming defects, caught when
/// the schema is built, never while validating user input.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("rule on field '{field}' references undeclared field '{referenced}'")]
    UnknownField { field: String, referenced: String },

    #[error("cross-field rule targeting '{target}' references undeclared field '{referenced}'")]
    UnknownCrossField { target: String, referenced: String },

    #[error("cross-field rule targeting '{0}' needs at least two fields")]
    TooFewCrossFields(String),

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// How a field's raw input is coerced into the emitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Checkbox,
}

impl FieldKind {
    /// Parses raw form input for a field of this kind.
    pub fn parse(self, raw: &str) -> FieldValue {
        match self {
            FieldKind::Text => FieldValue::Text(raw.to_string()),
            FieldKind::Checkbox => FieldValue::Flag(is_truthy(raw)),
        }
    }

    /// Coerces an optional value into this kind; absent text is empty, absent
    /// checkboxes are unchecked.
    pub fn coerce(self, value: Option<&FieldValue>) -> FieldValue {
        match (self, value) {
            (FieldKind::Text, Some(FieldValue::Text(s))) => FieldValue::Text(s.clone()),
            (FieldKind::Text, Some(FieldValue::Flag(b))) => FieldValue::Text(b.to_string()),
            (FieldKind::Text, None) => FieldValue::Text(String::new()),
            (FieldKind::Checkbox, value) => {
                FieldValue::Flag(value.map(FieldValue::is_checked).unwrap_or(false))
            }
        }
    }

    pub fn empty(self) -> FieldValue {
        self.coerce(None)
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub rules: Vec<FieldRule>,
}

/// The complete, immutable set of rules for one form.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    cross_field: Vec<CrossFieldRule>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn cross_field_rules(&self) -> &[CrossFieldRule] {
        &self.cross_field
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldSpec>,
    cross_field: Vec<CrossFieldRule>,
}

impl SchemaBuilder {
    pub fn field(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        rules: impl IntoIterator<Item = FieldRule>,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            rules: rules.into_iter().collect(),
        });
        self
    }

    pub fn text(self, name: impl Into<String>, rules: impl IntoIterator<Item = FieldRule>) -> Self {
        self.field(name, FieldKind::Text, rules)
    }

    pub fn checkbox(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Checkbox, [])
    }

    pub fn cross_field(mut self, rule: CrossFieldRule) -> Self {
        self.cross_field.push(rule);
        self
    }

    /// Checks that every referenced field is declared, exactly once.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut declared = HashSet::new();
        for spec in &self.fields {
            if !declared.insert(spec.name.as_str()) {
                return Err(SchemaError::DuplicateField(spec.name.clone()));
            }
        }

        for spec in &self.fields {
            for referenced in spec.rules.iter().filter_map(FieldRule::referenced_field) {
                if !declared.contains(referenced) {
                    return Err(SchemaError::UnknownField {
                        field: spec.name.clone(),
                        referenced: referenced.to_string(),
                    });
                }
            }
        }

        for rule in &self.cross_field {
            let super::rule::CrossFieldCheck::AllEqual(fields) = &rule.check;
            if fields.len() < 2 {
                return Err(SchemaError::TooFewCrossFields(rule.target.clone()));
            }
            if let Some(referenced) = rule.fields().find(|f| !declared.contains(f)) {
                return Err(SchemaError::UnknownCrossField {
                    target: rule.target.clone(),
                    referenced: referenced.to_string(),
                });
            }
        }

        Ok(Schema {
            fields: self.fields,
            cross_field: self.cross_field,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_in_declaration_order() {
        let schema = Schema::builder()
            .text("b", [FieldRule::required("b")])
            .text("a", [])
            .checkbox("c")
            .build()
            .unwrap();

        let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert_eq!(schema.field("c").unwrap().kind, FieldKind::Checkbox);
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn rejects_duplicate_fields() {
        let err = Schema::builder().text("a", []).text("a", []).build().unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField(name) if name == "a"));
    }

    #[test]
    fn rejects_cross_field_rule_on_undeclared_field() {
        let err = Schema::builder()
            .text("password", [])
            .cross_field(CrossFieldRule::all_equal(
                ["password", "confirmPassword"],
                "confirmPassword",
                "Passwords do not match",
            ))
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            SchemaError::UnknownCrossField { referenced, .. } if referenced == "confirmPassword"
        ));
    }

    #[test]
    fn rejects_cross_field_rule_with_one_field() {
        let err = Schema::builder()
            .text("a", [])
            .cross_field(CrossFieldRule::all_equal(["a"], "a", "never"))
            .build()
            .unwrap_err();

        assert!(matches!(err, SchemaError::TooFewCrossFields(_)));
    }

    #[test]
    fn rejects_equals_field_on_undeclared_field() {
        let err = Schema::builder()
            .text("confirm", [FieldRule::equals_field("password", "mismatch")])
            .build()
            .unwrap_err();

        assert!(matches!(err, SchemaError::UnknownField { field, .. } if field == "confirm"));
    }

    #[test]
    fn coercion_defaults() {
        assert_eq!(FieldKind::Checkbox.empty(), FieldValue::Flag(false));
        assert_eq!(FieldKind::Text.empty(), FieldValue::Text(String::new()));
        assert_eq!(FieldKind::Checkbox.parse("on"), FieldValue::Flag(true));
        assert_eq!(
            FieldKind::Checkbox.coerce(Some(&FieldValue::Text("yes".into()))),
            FieldValue::Flag(true)
        );
    }
}
