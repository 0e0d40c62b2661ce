pub mod controller;
pub mod state;
pub mod user;

pub use controller::FormController;
pub use state::{FormState, SubmissionStatus};
