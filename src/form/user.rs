use serde::Deserialize;

use super::controller::ActionError;
use crate::validation::{CrossFieldRule, FieldRule, Record, Schema, SchemaError};

const USERNAME_OR_EMAIL: &str =
    r"^([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}|[a-zA-Z0-9]+)$";
const UPPERCASE: &str = r"[A-Z]";
const DIGIT: &str = r"[0-9]";
const SYMBOL: &str = r"[@$!%*?&]";

#[derive(Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginFormData {
    pub username: String,
    pub password: String,
    pub remember_me: bool,
}

#[derive(Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFormData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl LoginFormData {
    pub fn from_record(record: Record) -> Result<Self, ActionError> {
        Ok(serde_json::from_value(serde_json::to_value(record)?)?)
    }
}

impl RegisterFormData {
    pub fn from_record(record: Record) -> Result<Self, ActionError> {
        Ok(serde_json::from_value(serde_json::to_value(record)?)?)
    }
}

pub fn login_schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .text(
            "username",
            [
                FieldRule::required("Username or email is required."),
                FieldRule::pattern(USERNAME_OR_EMAIL, "Enter a valid username or email.")?,
            ],
        )
        .text(
            "password",
            [
                FieldRule::min_length(8, "Password must be at least 8 characters."),
                FieldRule::pattern(UPPERCASE, "Password must have at least one uppercase letter.")?,
                FieldRule::pattern(DIGIT, "Password must contain at least one number.")?,
            ],
        )
        .checkbox("rememberMe")
        .build()
}

pub fn register_schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .text("name", [FieldRule::required("Name is required")])
        .text(
            "email",
            [
                FieldRule::required("Email is required"),
                FieldRule::email_format("Invalid email address"),
            ],
        )
        .text(
            "password",
            [
                FieldRule::min_length(8, "Password must be at least 8 characters"),
                FieldRule::pattern(UPPERCASE, "Password must include at least one uppercase letter")?,
                FieldRule::pattern(DIGIT, "Password must include at least one number")?,
                FieldRule::pattern(SYMBOL, "Password must include at least one special character")?,
            ],
        )
        .text(
            "confirmPassword",
            [FieldRule::required("Please confirm your password")],
        )
        .cross_field(CrossFieldRule::all_equal(
            ["password", "confirmPassword"],
            "confirmPassword",
            "Passwords do not match",
        ))
        .build()
}

/// Schemas of both forms, compiled once and shared by every request.
#[derive(Debug, Clone)]
pub struct Schemas {
    pub login: Schema,
    pub register: Schema,
}

impl Schemas {
    pub fn build() -> Result<Self, SchemaError> {
        Ok(Self {
            login: login_schema()?,
            register: register_schema()?,
        })
    }
}

/// Default action for a validated login: log it.
pub async fn log_login(record: Record) -> Result<(), ActionError> {
    let data = LoginFormData::from_record(record)?;
    log::info!(
        "login data: {}",
        serde_json::json!({ "username": data.username, "rememberMe": data.remember_me })
    );
    Ok(())
}

/// Default action for a validated registration: log it.
pub async fn log_registration(record: Record) -> Result<(), ActionError> {
    let data = RegisterFormData::from_record(record)?;
    log::info!(
        "registration data: {}",
        serde_json::json!({ "name": data.name, "email": data.email })
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate, FieldErrors, FieldValue, ValidationResult};

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::from(*v)))
            .collect()
    }

    fn errors(pairs: &[(&str, &str)]) -> FieldErrors {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn login_requires_username() {
        let result = validate(
            &login_schema().unwrap(),
            &record(&[("username", ""), ("password", "Abcdefg1")]),
        );

        assert_eq!(
            result,
            ValidationResult::Invalid(errors(&[("username", "Username or email is required.")]))
        );
    }

    #[test]
    fn login_password_needs_uppercase() {
        let result = validate(
            &login_schema().unwrap(),
            &record(&[("username", "bob"), ("password", "abcdefg1")]),
        );

        assert_eq!(
            result,
            ValidationResult::Invalid(errors(&[(
                "password",
                "Password must have at least one uppercase letter."
            )]))
        );
    }

    #[test]
    fn non_ascii_digits_do_not_count_as_numbers() {
        let login = validate(
            &login_schema().unwrap(),
            &record(&[("username", "bob"), ("password", "Abcdefg\u{0661}")]),
        );
        assert_eq!(
            login,
            ValidationResult::Invalid(errors(&[(
                "password",
                "Password must contain at least one number."
            )]))
        );

        let password = "Abcdef\u{0661}!";
        let register = validate(
            &register_schema().unwrap(),
            &record(&[
                ("name", "A"),
                ("email", "a@b.com"),
                ("password", password),
                ("confirmPassword", password),
            ]),
        );
        assert_eq!(
            register,
            ValidationResult::Invalid(errors(&[(
                "password",
                "Password must include at least one number"
            )]))
        );
    }

    #[test]
    fn login_short_password_reports_length_first() {
        let schema = login_schema().unwrap();
        for password in ["", "a", "Ab1", "Abcdef1"] {
            let result = validate(&schema, &record(&[("username", "bob"), ("password", password)]));
            assert_eq!(
                result.errors().and_then(|e| e.get("password")).map(String::as_str),
                Some("Password must be at least 8 characters."),
                "{password}"
            );
        }
    }

    #[test]
    fn login_accepts_username_or_email() {
        let schema = login_schema().unwrap();
        for username in ["bob", "Bob42", "bob.smith@example.com"] {
            let result = validate(&schema, &record(&[("username", username), ("password", "Abcdefg1")]));
            assert!(result.is_valid(), "{username}");
        }

        let result = validate(&schema, &record(&[("username", "bob smith"), ("password", "Abcdefg1")]));
        assert_eq!(
            result,
            ValidationResult::Invalid(errors(&[("username", "Enter a valid username or email.")]))
        );
    }

    #[test]
    fn login_record_always_carries_remember_me() {
        let schema = login_schema().unwrap();
        let ValidationResult::Valid(valid) =
            validate(&schema, &record(&[("username", "bob"), ("password", "Abcdefg1")]))
        else {
            panic!("expected a valid login");
        };

        assert_eq!(
            LoginFormData::from_record(valid).unwrap(),
            LoginFormData {
                username: "bob".into(),
                password: "Abcdefg1".into(),
                remember_me: false,
            }
        );
    }

    #[test]
    fn register_accepts_matching_passwords() {
        let result = validate(
            &register_schema().unwrap(),
            &record(&[
                ("name", "A"),
                ("email", "a@b.com"),
                ("password", "Abcdef1!"),
                ("confirmPassword", "Abcdef1!"),
            ]),
        );

        let ValidationResult::Valid(valid) = result else {
            panic!("expected a valid registration");
        };
        let data = RegisterFormData::from_record(valid).unwrap();
        assert_eq!(data.name, "A");
        assert_eq!(data.confirm_password, "Abcdef1!");
    }

    #[test]
    fn register_mismatch_lands_on_confirm_password() {
        let result = validate(
            &register_schema().unwrap(),
            &record(&[
                ("name", "A"),
                ("email", "a@b.com"),
                ("password", "Abcdef1!"),
                ("confirmPassword", "Abcdef2!"),
            ]),
        );

        assert_eq!(
            result,
            ValidationResult::Invalid(errors(&[("confirmPassword", "Passwords do not match")]))
        );
    }

    #[test]
    fn register_reports_every_missing_field() {
        let result = validate(&register_schema().unwrap(), &Record::new());

        assert_eq!(
            result,
            ValidationResult::Invalid(errors(&[
                ("name", "Name is required"),
                ("email", "Email is required"),
                ("password", "Password must be at least 8 characters"),
                ("confirmPassword", "Please confirm your password"),
            ]))
        );
    }

    #[test]
    fn register_password_rules_in_order() {
        let schema = register_schema().unwrap();
        let cases = [
            ("abcdefgh", "Password must include at least one uppercase letter"),
            ("Abcdefgh", "Password must include at least one number"),
            ("Abcdefg1", "Password must include at least one special character"),
        ];

        for (password, message) in cases {
            let result = validate(
                &schema,
                &record(&[
                    ("name", "A"),
                    ("email", "a@b.com"),
                    ("password", password),
                    ("confirmPassword", password),
                ]),
            );
            assert_eq!(result, ValidationResult::Invalid(errors(&[("password", message)])));
        }
    }

    #[test]
    fn register_rejects_bad_email() {
        let result = validate(
            &register_schema().unwrap(),
            &record(&[
                ("name", "A"),
                ("email", "not-an-email"),
                ("password", "Abcdef1!"),
                ("confirmPassword", "Abcdef1!"),
            ]),
        );

        assert_eq!(
            result,
            ValidationResult::Invalid(errors(&[("email", "Invalid email address")]))
        );
    }

    #[test]
    fn schemas_build() {
        let schemas = Schemas::build().unwrap();
        assert_eq!(schemas.login.fields().len(), 3);
        assert_eq!(schemas.register.cross_field_rules().len(), 1);
    }
}
