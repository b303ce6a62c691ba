use crate::actions::quiz::{generate_quiz, submit_quiz};
use crate::actions::roster::{begin_edit, edit_request, finish_edit, render_students, ROSTER_TABLE_ID};
use crate::actions::{RowAction, RowCommand};
use crate::api_client::{
    EditStudentResponse, QuizProgress, QuizRequest, QuizService, ResetPasswordResponse,
    UploadResponse,
};
use crate::table::{NodeId, Page, SortableTableController};
use anyhow::{anyhow, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

const DELETE_PROMPT: &str = "Are you sure you want to delete this student?";
const RETRY_PROMPT: &str =
    "Are you sure you want to allow this student to retake the quiz? This will delete their previous results.";
const DELETE_QUIZ_PROMPT: &str =
    "Are you sure you want to delete this quiz? This action cannot be undone.";

/// Asks the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    EditStarted,
    Saved { name: String, group: String },
    Deleted,
    PasswordReset(String),
    ResultReset,
    /// Roster upload; `added` rows replaced the roster when non-zero
    Uploaded {
        message: String,
        errors: Vec<String>,
        added: usize,
    },
    QuizDeleted(String),
    QuizCreated(String),
    QuizSubmitted {
        message: String,
        summary: Vec<String>,
    },
    Cancelled,
    /// User-facing failure message
    Failed(String),
}

/// Runs row commands against the service and reconciles the page
pub struct ActionDispatcher<'a> {
    service: &'a dyn QuizService,
    confirm: &'a dyn Confirm,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(service: &'a dyn QuizService, confirm: &'a dyn Confirm) -> Self {
        Self { service, confirm }
    }

    pub fn dispatch(
        &self,
        page: &mut Page,
        controller: &SortableTableController,
        table_id: &str,
        row_id: NodeId,
        command: &RowCommand,
    ) -> ActionOutcome {
        info!(
            target: "actions",
            "{:?} for student {} in '{}'",
            command.action, command.student_id, table_id
        );

        let result = match command.action {
            RowAction::Edit => self.start_edit(page, controller, table_id, row_id),
            RowAction::Save => self.save_edit(page, controller, table_id, row_id),
            RowAction::Delete => {
                if !self.confirm.confirm(DELETE_PROMPT) {
                    return ActionOutcome::Cancelled;
                }
                self.delete_student(page, table_id, row_id, &command.student_id)
            }
            RowAction::ResetPassword => self.reset_password(&command.student_id),
            RowAction::RetryQuiz => {
                if !self.confirm.confirm(RETRY_PROMPT) {
                    return ActionOutcome::Cancelled;
                }
                self.reset_result(page, table_id, row_id, &command.student_id)
            }
        };

        result.unwrap_or_else(|e| self.failed(&format!("{:?}", command.action), e))
    }

    /// Upload a roster CSV. Students the service added replace the roster
    /// rows, which are then rebound.
    pub fn upload_students(
        &self,
        page: &mut Page,
        controller: &SortableTableController,
        csv_file: &Path,
    ) -> ActionOutcome {
        info!(target: "actions", "Uploading roster {}", csv_file.display());
        self.upload(page, controller, csv_file)
            .unwrap_or_else(|e| self.failed("Upload", e))
    }

    pub fn delete_quiz(&self) -> ActionOutcome {
        if !self.confirm.confirm(DELETE_QUIZ_PROMPT) {
            return ActionOutcome::Cancelled;
        }
        info!(target: "actions", "Deleting quiz");
        self.service
            .delete_quiz()
            .and_then(|r| r.into_result("Error deleting quiz. Please try again."))
            .map(|r| ActionOutcome::QuizDeleted(r.message.unwrap_or_default()))
            .unwrap_or_else(|e| self.failed("DeleteQuiz", e))
    }

    pub fn create_quiz(
        &self,
        request: &QuizRequest,
        poll_interval: Duration,
        on_progress: &mut dyn FnMut(&QuizProgress),
    ) -> ActionOutcome {
        generate_quiz(self.service, request, poll_interval, on_progress)
            .map(ActionOutcome::QuizCreated)
            .unwrap_or_else(|e| self.failed("CreateQuiz", e))
    }

    pub fn submit_quiz(&self, answers: &[Option<String>]) -> ActionOutcome {
        info!(target: "actions", "Submitting {} answers", answers.len());
        submit_quiz(self.service, answers)
            .map(|s| ActionOutcome::QuizSubmitted {
                message: s.message,
                summary: s.summary,
            })
            .unwrap_or_else(|e| self.failed("SubmitQuiz", e))
    }

    fn failed(&self, action: &str, error: anyhow::Error) -> ActionOutcome {
        warn!(target: "actions", "{} failed: {}", action, error);
        ActionOutcome::Failed(error.to_string())
    }

    fn upload(
        &self,
        page: &mut Page,
        controller: &SortableTableController,
        csv_file: &Path,
    ) -> Result<ActionOutcome> {
        let response = self
            .service
            .upload_students(csv_file)?
            .into_result("Error uploading file. Please try again.")?;
        let upload: UploadResponse = response.payload()?;

        let added = upload.students.len();
        if added > 0 {
            let body = page
                .body_mut(ROSTER_TABLE_ID)
                .ok_or_else(|| anyhow!("No roster table on this page"))?;
            render_students(body, &upload.students);
            controller.rebind(page, ROSTER_TABLE_ID);
        }

        Ok(ActionOutcome::Uploaded {
            message: response.message.unwrap_or_default(),
            errors: upload.errors,
            added,
        })
    }

    fn start_edit(
        &self,
        page: &mut Page,
        controller: &SortableTableController,
        table_id: &str,
        row_id: NodeId,
    ) -> Result<ActionOutcome> {
        let row = page
            .body_mut(table_id)
            .and_then(|b| b.row_mut(row_id))
            .ok_or_else(|| anyhow!("Row is no longer on the page"))?;
        if !begin_edit(row) {
            return Err(anyhow!("Row is already being edited"));
        }
        controller.rebind(page, table_id);
        Ok(ActionOutcome::EditStarted)
    }

    fn save_edit(
        &self,
        page: &mut Page,
        controller: &SortableTableController,
        table_id: &str,
        row_id: NodeId,
    ) -> Result<ActionOutcome> {
        let request = page
            .body(table_id)
            .and_then(|b| b.row(row_id))
            .and_then(edit_request)
            .ok_or_else(|| anyhow!("Row is not being edited"))?;

        let edited: EditStudentResponse = self
            .service
            .edit_student(&request)?
            .into_result("Error updating student")?
            .payload()?;

        // The row may have been removed while the request was in flight
        if let Some(row) = page.body_mut(table_id).and_then(|b| b.row_mut(row_id)) {
            finish_edit(row, &edited.name, &edited.group);
        }
        controller.rebind(page, table_id);

        Ok(ActionOutcome::Saved {
            name: edited.name,
            group: edited.group,
        })
    }

    fn delete_student(
        &self,
        page: &mut Page,
        table_id: &str,
        row_id: NodeId,
        student_id: &str,
    ) -> Result<ActionOutcome> {
        self.service
            .delete_student(student_id)?
            .into_result("Error deleting student")?;
        if let Some(body) = page.body_mut(table_id) {
            body.remove_row(row_id);
        }
        Ok(ActionOutcome::Deleted)
    }

    fn reset_password(&self, student_id: &str) -> Result<ActionOutcome> {
        let reset: ResetPasswordResponse = self
            .service
            .reset_student_password(student_id)?
            .into_result("Error resetting password")?
            .payload()?;
        Ok(ActionOutcome::PasswordReset(reset.password))
    }

    fn reset_result(
        &self,
        page: &mut Page,
        table_id: &str,
        row_id: NodeId,
        student_id: &str,
    ) -> Result<ActionOutcome> {
        self.service
            .reset_student_result(student_id)?
            .into_result("Error resetting result")?;
        if let Some(body) = page.body_mut(table_id) {
            body.remove_row(row_id);
        }
        Ok(ActionOutcome::ResultReset)
    }
}
