use askama::Template;

use crate::form::{FormState, SubmissionStatus};

pub mod error;
pub mod user;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate;

/// Read-only view of a form's state, as the templates consume it.
pub struct FormView<'a> {
    state: &'a FormState,
}

impl<'a> FormView<'a> {
    pub fn new(state: &'a FormState) -> Self {
        Self { state }
    }

    /// Current text of a field, empty when unset.
    pub fn text(&self, field: &str) -> &'a str {
        self.state.value(field).map(|v| v.as_text()).unwrap_or_default()
    }

    pub fn checked(&self, field: &str) -> bool {
        self.state.value(field).map(|v| v.is_checked()).unwrap_or(false)
    }

    pub fn error(&self, field: &str) -> Option<&'a str> {
        self.state.error(field)
    }

    pub fn failure(&self) -> Option<&'a str> {
        self.state.failure()
    }

    /// Only true for a form rendered mid-submission; the HTTP handlers always
    /// resolve the action first, so they never render this state.
    pub fn is_submitting(&self) -> bool {
        self.state.status() == SubmissionStatus::Submitting
    }

    pub fn succeeded(&self) -> bool {
        self.state.status() == SubmissionStatus::Succeeded
    }
}
