use super::{FieldErrors, Record, Schema, ValidationResult};

/// Evaluates `schema` against `record`.
///
/// Each field is checked independently, stopping at its first failing rule.
/// Cross-field rules run only when every field passed, and the first failing
/// one reports on its target field. On success the record is rebuilt from the
/// schema: undeclared fields are dropped and values coerced to their kind.
pub fn validate(schema: &Schema, record: &Record) -> ValidationResult {
    let mut errors = FieldErrors::new();

    for spec in schema.fields() {
        let value = record.get(&spec.name);
        if let Some(rule) = spec.rules.iter().find(|rule| !rule.check(value, record)) {
            errors.insert(spec.name.clone(), rule.message().to_string());
        }
    }

    if errors.is_empty() {
        if let Some(rule) = schema
            .cross_field_rules()
            .iter()
            .find(|rule| !rule.check(record))
        {
            errors.insert(rule.target.clone(), rule.message.clone());
        }
    }

    if !errors.is_empty() {
        return ValidationResult::Invalid(errors);
    }

    let validated = schema
        .fields()
        .iter()
        .map(|spec| (spec.name.clone(), spec.kind.coerce(record.get(&spec.name))))
        .collect();

    ValidationResult::Valid(validated)
}
