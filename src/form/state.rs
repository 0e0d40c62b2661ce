use crate::validation::{FieldErrors, FieldValue, Record, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Events that move a [`FormState`] forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The user edited a field.
    Change { field: String, value: FieldValue },
    /// The user pressed submit.
    Submit,
    /// Validation failed with these errors.
    Reject(FieldErrors),
    /// Validation passed; the record is on its way to the external action.
    Accept,
    /// The external action finished, with its failure message if it failed.
    Resolve(Result<(), String>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("a submission is already in flight")]
    SubmissionInFlight,

    #[error("no submission is in flight")]
    NotSubmitting,

    #[error("field '{0}' is not part of this form")]
    UnknownField(String),
}

/// Field values, errors and submission status of one form instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    values: Record,
    errors: FieldErrors,
    status: SubmissionStatus,
    failure: Option<String>,
}

impl FormState {
    /// Empty state with one entry per field declared by `schema`.
    pub fn new(schema: &Schema) -> Self {
        Self {
            values: schema
                .fields()
                .iter()
                .map(|spec| (spec.name.clone(), spec.kind.empty()))
                .collect(),
            errors: FieldErrors::new(),
            status: SubmissionStatus::Idle,
            failure: None,
        }
    }

    pub fn values(&self) -> &Record {
        &self.values
    }

    pub(super) fn values_mut(&mut self) -> &mut Record {
        &mut self.values
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    /// Message reported by the last failed external action.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Computes the state that follows `transition`, leaving `self` untouched.
    pub fn reduce(&self, transition: Transition) -> Result<FormState, TransitionError> {
        let mut next = self.clone();

        match transition {
            Transition::Change { field, value } => match next.values.get_mut(&field) {
                Some(slot) => *slot = value,
                None => return Err(TransitionError::UnknownField(field)),
            },
            Transition::Submit => {
                if self.status == SubmissionStatus::Submitting {
                    return Err(TransitionError::SubmissionInFlight);
                }
                next.status = SubmissionStatus::Submitting;
                next.failure = None;
            }
            Transition::Reject(errors) => {
                self.ensure_submitting()?;
                next.status = SubmissionStatus::Idle;
                next.errors = errors;
            }
            Transition::Accept => {
                self.ensure_submitting()?;
                next.errors.clear();
            }
            Transition::Resolve(outcome) => {
                self.ensure_submitting()?;
                match outcome {
                    Ok(()) => next.status = SubmissionStatus::Succeeded,
                    Err(message) => {
                        next.status = SubmissionStatus::Failed;
                        next.failure = Some(message);
                    }
                }
            }
        }

        Ok(next)
    }

    fn ensure_submitting(&self) -> Result<(), TransitionError> {
        if self.status == SubmissionStatus::Submitting {
            Ok(())
        } else {
            Err(TransitionError::NotSubmitting)
        }
    }
}
