use crate::api_client::{QuizProgress, QuizRequest, QuizService, SubmitQuizResponse};
use anyhow::{anyhow, Result};
use regex::Regex;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

pub const NO_CATEGORY_SELECTED: &str =
    "Please select at least one category with questions > 0.";
const CREATE_FAILED: &str = "Error creating quiz. Please try again.";
const SUBMIT_FAILED: &str = "Error submitting quiz";

/// Send `request` to the service and poll its progress every
/// `poll_interval` until the request returns. Returns the service's message.
pub fn generate_quiz<S>(
    service: &S,
    request: &QuizRequest,
    poll_interval: Duration,
    on_progress: &mut dyn FnMut(&QuizProgress),
) -> Result<String>
where
    S: QuizService + ?Sized,
{
    if request.selected_categories() == 0 {
        return Err(anyhow!(NO_CATEGORY_SELECTED));
    }
    info!(
        target: "actions",
        "Creating quiz from {} categories",
        request.selected_categories()
    );

    let response = thread::scope(|scope| {
        let pending = scope.spawn(|| service.create_quiz(request));
        let mut polls = 0usize;

        loop {
            thread::sleep(poll_interval);
            if pending.is_finished() {
                break;
            }
            match service.quiz_progress() {
                Ok(progress) => {
                    polls += 1;
                    on_progress(&progress);
                }
                // a missed poll is retried on the next tick
                Err(e) => debug!(target: "actions", "Progress poll failed: {}", e),
            }
        }

        debug!(target: "actions", "Quiz request returned after {} polls", polls);
        pending
            .join()
            .map_err(|_| anyhow!("Quiz request thread panicked"))
    })??;

    let response = response.into_result(CREATE_FAILED)?;
    Ok(response.message.unwrap_or_default())
}

/// What a student sees after submitting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSubmission {
    pub message: String,
    /// Summary lines with markup removed
    pub summary: Vec<String>,
}

pub fn submit_quiz<S>(service: &S, answers: &[Option<String>]) -> Result<QuizSubmission>
where
    S: QuizService + ?Sized,
{
    let response = service.submit_quiz(answers)?.into_result(SUBMIT_FAILED)?;
    let payload: SubmitQuizResponse = response.payload()?;
    Ok(QuizSubmission {
        message: response.message.unwrap_or_default(),
        summary: summary_lines(&payload.summary),
    })
}

/// Split the service's HTML summary into plain lines
pub fn summary_lines(summary: &str) -> Vec<String> {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();
    let line_break = BREAK.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"));

    let text = line_break.replace_all(summary, "\n");
    let text = tag.replace_all(&text, "");
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
