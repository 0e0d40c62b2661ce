use std::{collections::HashMap, future::Future};

use uuid::Uuid;

use super::state::{FormState, SubmissionStatus, Transition, TransitionError};
use crate::validation::{self, FieldErrors, FieldValue, Record, Schema, ValidationResult};

/// Failure reported by the action a validated record is handed to.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("{0}")]
    Rejected(String),

    #[error("submitted data could not be read: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Outcome of the synchronous half of a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Validation failed; the form is idle again and shows these errors.
    Rejected(FieldErrors),
    /// Validation passed; the form stays `submitting` until resolved.
    Accepted(Record),
}

/// Owns the state of one form instance and drives it through a submission.
pub struct FormController<'s> {
    id: Uuid,
    schema: &'s Schema,
    state: FormState,
}

impl<'s> FormController<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        let id = Uuid::new_v4();
        log::debug!("form {id} mounted");

        Self {
            id,
            schema,
            state: FormState::new(schema),
        }
    }

    /// Mounts a form pre-filled from posted input. Undeclared keys are ignored;
    /// declared fields missing from `input` keep their empty value.
    pub fn from_input(schema: &'s Schema, input: &HashMap<String, String>) -> Self {
        let mut controller = Self::new(schema);
        for spec in schema.fields() {
            if let Some(raw) = input.get(&spec.name) {
                let value = spec.kind.parse(raw);
                controller.state.values_mut().insert(spec.name.clone(), value);
            }
        }
        controller
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn into_state(self) -> FormState {
        log::debug!("form {} unmounted", self.id);
        self.state
    }

    pub fn change(
        &mut self,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Result<(), TransitionError> {
        self.apply(Transition::Change {
            field: field.into(),
            value: value.into(),
        })
    }

    /// Like [`change`](Self::change), parsing `raw` according to the field's kind.
    pub fn input(&mut self, field: &str, raw: &str) -> Result<(), TransitionError> {
        let spec = self
            .schema
            .field(field)
            .ok_or_else(|| TransitionError::UnknownField(field.to_string()))?;
        let value = spec.kind.parse(raw);
        self.change(field, value)
    }

    /// Validates a snapshot of the current values.
    ///
    /// On failure the form goes back to idle with the new errors and no
    /// action must be run. On success the form stays `submitting` and the
    /// caller owes a [`resolve`](Self::resolve).
    pub fn begin_submit(&mut self) -> Result<Submission, TransitionError> {
        self.apply(Transition::Submit)?;

        let snapshot = self.state.values().clone();
        match validation::validate(self.schema, &snapshot) {
            ValidationResult::Invalid(errors) => {
                log::info!(
                    "form {} rejected: invalid fields [{}]",
                    self.id,
                    errors.keys().cloned().collect::<Vec<_>>().join(", ")
                );
                self.apply(Transition::Reject(errors.clone()))?;
                Ok(Submission::Rejected(errors))
            }
            ValidationResult::Valid(record) => {
                self.apply(Transition::Accept)?;
                Ok(Submission::Accepted(record))
            }
        }
    }

    pub fn resolve(&mut self, outcome: Result<(), ActionError>) -> Result<(), TransitionError> {
        if let Err(e) = &outcome {
            log::warn!("form {} submission failed: {}", self.id, e);
        }
        self.apply(Transition::Resolve(outcome.map_err(|e| e.to_string())))
    }

    /// Validates and, when valid, hands the record to `action` and waits for it.
    pub async fn submit<F, Fut>(&mut self, action: F) -> Result<SubmissionStatus, TransitionError>
    where
        F: FnOnce(Record) -> Fut,
        Fut: Future<Output = Result<(), ActionError>>,
    {
        if let Submission::Accepted(record) = self.begin_submit()? {
            let outcome = action(record).await;
            self.resolve(outcome)?;
        }

        Ok(self.state.status())
    }

    fn apply(&mut self, transition: Transition) -> Result<(), TransitionError> {
        let from = self.state.status();
        self.state = self.state.reduce(transition)?;
        if from != self.state.status() {
            log::debug!("form {}: {:?} -> {:?}", self.id, from, self.state.status());
        }
        Ok(())
    }
}
