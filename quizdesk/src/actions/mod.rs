//! Row-level actions
//!
//! Tables expose per-row controls (edit, delete, reset password, retry).
//! The binders in this module attach a [`RowCommand`] to each control; the
//! dispatcher turns a clicked command into a service request and reconciles
//! the page with the response. Page-level actions (roster upload, quiz
//! creation, deletion and submission) go through the same dispatcher.

pub mod dispatch;
pub mod quiz;
pub mod roster;
pub mod statistics;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowAction {
    Edit,
    Save,
    Delete,
    ResetPassword,
    RetryQuiz,
}

/// What a bound control does when clicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCommand {
    pub action: RowAction,
    pub student_id: String,
}

impl RowCommand {
    pub fn new(action: RowAction, student_id: &str) -> Self {
        Self {
            action,
            student_id: student_id.to_string(),
        }
    }
}

pub use dispatch::{ActionDispatcher, ActionOutcome, Confirm};
pub use quiz::QuizSubmission;
pub use roster::{RosterBinder, Student};
pub use statistics::{StatisticsBinder, StudentResult};
