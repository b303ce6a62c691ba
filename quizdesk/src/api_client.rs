use crate::actions::Student;
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Answer given for a roster file the service would refuse anyway
const INVALID_UPLOAD: &str = "Please upload a valid CSV file.";

/// JSON envelope every endpoint answers with: `{success, message, ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Endpoint-specific fields (`name`, `group`, `password`, ...)
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ServiceResponse {
    pub fn ok(payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            success: true,
            message: None,
            payload,
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
            payload: Map::new(),
        }
    }

    /// Read the endpoint-specific fields as `T`
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.payload.clone()))
            .context("Unexpected response payload")
    }

    /// Turn `success: false` into an error carrying the server's message,
    /// or `default_message` when the server sent none
    pub fn into_result(self, default_message: &str) -> Result<Self> {
        if self.success {
            return Ok(self);
        }
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_message.to_string());
        Err(anyhow!(message))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditStudentRequest {
    pub id: String,
    pub name: String,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRequest {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditStudentResponse {
    pub name: String,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordResponse {
    pub password: String,
}

/// Payload of `/upload`: the students added and the CSV lines refused
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Payload of `/submit_quiz`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitQuizResponse {
    pub summary: String,
}

/// Question-bank categories a quiz is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizCategory {
    Math,
    Physics,
    Chemistry,
    Biology,
    Cs,
}

impl QuizCategory {
    pub const ALL: [QuizCategory; 5] = [
        QuizCategory::Math,
        QuizCategory::Physics,
        QuizCategory::Chemistry,
        QuizCategory::Biology,
        QuizCategory::Cs,
    ];

    /// Suffix of the `num_questions_*` and `level_*` form fields
    pub fn form_key(self) -> &'static str {
        match self {
            QuizCategory::Math => "math",
            QuizCategory::Physics => "physics",
            QuizCategory::Chemistry => "chemistry",
            QuizCategory::Biology => "biology",
            QuizCategory::Cs => "cs",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuizCategory::Math => "Mathematics",
            QuizCategory::Physics => "Physics",
            QuizCategory::Chemistry => "Chemistry",
            QuizCategory::Biology => "Biology",
            QuizCategory::Cs => "Computer Science",
        }
    }

    /// Accepts the form key or the label, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.form_key().eq_ignore_ascii_case(name) || c.label().eq_ignore_ascii_case(name))
    }
}

pub const DEFAULT_LEVEL: &str = "Elementary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRequest {
    pub category: QuizCategory,
    pub questions: u32,
    /// `Elementary`, `Middle School` or `High School`
    pub level: String,
}

/// Form sent to `/create_quiz`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizRequest {
    pub categories: Vec<CategoryRequest>,
}

impl QuizRequest {
    /// Categories that ask for at least one question
    pub fn selected_categories(&self) -> usize {
        self.categories.iter().filter(|c| c.questions > 0).count()
    }

    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.categories
            .iter()
            .flat_map(|c| {
                [
                    (format!("num_questions_{}", c.category.form_key()), c.questions.to_string()),
                    (format!("level_{}", c.category.form_key()), c.level.clone()),
                ]
            })
            .collect()
    }
}

impl std::str::FromStr for QuizRequest {
    type Err = anyhow::Error;

    /// `math:5:High School,cs:3`; the level defaults to Elementary
    fn from_str(s: &str) -> Result<Self> {
        let categories = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| {
                let mut fields = part.splitn(3, ':');
                let name = fields.next().unwrap_or_default();
                let category = QuizCategory::from_name(name)
                    .ok_or_else(|| anyhow!("Unknown quiz category '{}'", name.trim()))?;
                let questions = fields
                    .next()
                    .ok_or_else(|| anyhow!("Missing question count for '{}'", name.trim()))?
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("Invalid question count for '{}'", name.trim()))?;
                let level = fields
                    .next()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .unwrap_or(DEFAULT_LEVEL)
                    .to_string();
                Ok(CategoryRequest {
                    category,
                    questions,
                    level,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { categories })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Processing,
    Completed,
    Error,
    #[serde(other)]
    Idle,
}

/// One `/quiz_progress` poll
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuizProgress {
    pub status: ProgressStatus,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub message: Option<String>,
}

impl QuizProgress {
    /// Bar width to show; stays below 100 until the request itself returns
    pub fn display_percentage(&self) -> f64 {
        match self.status {
            ProgressStatus::Processing => self.percentage.clamp(0.0, 95.0),
            ProgressStatus::Completed | ProgressStatus::Error => 100.0,
            ProgressStatus::Idle => 0.0,
        }
    }

    pub fn display_text(&self) -> &str {
        match self.status {
            ProgressStatus::Processing => self
                .message
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or("Processing..."),
            ProgressStatus::Completed => "Finalizing...",
            ProgressStatus::Error => "Error occurred",
            ProgressStatus::Idle => "Starting generation...",
        }
    }
}

/// The remote quiz/roster service as seen by the page.
///
/// `Sync` so quiz generation can poll progress while its request runs.
pub trait QuizService: Sync {
    fn edit_student(&self, request: &EditStudentRequest) -> Result<ServiceResponse>;
    fn delete_student(&self, student_id: &str) -> Result<ServiceResponse>;
    fn reset_student_password(&self, student_id: &str) -> Result<ServiceResponse>;
    fn reset_student_result(&self, student_id: &str) -> Result<ServiceResponse>;
    fn delete_quiz(&self) -> Result<ServiceResponse>;
    fn upload_students(&self, csv_file: &Path) -> Result<ServiceResponse>;
    fn create_quiz(&self, request: &QuizRequest) -> Result<ServiceResponse>;
    fn quiz_progress(&self) -> Result<QuizProgress>;
    /// Answers in question order; `None` leaves a question unanswered
    fn submit_quiz(&self, answers: &[Option<String>]) -> Result<ServiceResponse>;
}

/// Blocking HTTP client for the quiz service
#[derive(Clone)]
pub struct QuizServiceClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl QuizServiceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::blocking::RequestBuilder,
        path: &str,
    ) -> Result<T> {
        debug!(target: "service", "Request {}", path);

        let response = request
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .with_context(|| format!("Request to {} failed", path))?;

        if !response.status().is_success() {
            warn!(target: "service", "{} answered {}", path, response.status());
            return Err(anyhow!("Network response was not ok"));
        }

        response
            .json()
            .with_context(|| format!("Invalid JSON from {}", path))
    }

    fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<ServiceResponse> {
        let request = self.client.post(self.endpoint(path)).json(body);
        let envelope: ServiceResponse = self.send(request, path)?;
        debug!(target: "service", "{} -> success={}", path, envelope.success);
        Ok(envelope)
    }

    fn post_form(&self, path: &str, fields: &[(String, String)]) -> Result<ServiceResponse> {
        let request = self.client.post(self.endpoint(path)).form(fields);
        self.send(request, path)
    }

    fn post_empty(&self, path: &str) -> Result<ServiceResponse> {
        let request = self.client.post(self.endpoint(path));
        self.send(request, path)
    }
}

/// Only `.csv` files are accepted by `/upload`
pub fn is_roster_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// `q0`, `q1`, ... form fields; unanswered questions are left out
pub fn answer_fields(answers: &[Option<String>]) -> Vec<(String, String)> {
    answers
        .iter()
        .enumerate()
        .filter_map(|(i, answer)| answer.as_ref().map(|a| (format!("q{}", i), a.clone())))
        .collect()
}

impl QuizService for QuizServiceClient {
    fn edit_student(&self, request: &EditStudentRequest) -> Result<ServiceResponse> {
        self.post_json("/edit_student", request)
    }

    fn delete_student(&self, student_id: &str) -> Result<ServiceResponse> {
        self.post_json(
            "/delete_student",
            &IdRequest {
                id: student_id.to_string(),
            },
        )
    }

    fn reset_student_password(&self, student_id: &str) -> Result<ServiceResponse> {
        self.post_json(
            "/reset_student_password",
            &IdRequest {
                id: student_id.to_string(),
            },
        )
    }

    fn reset_student_result(&self, student_id: &str) -> Result<ServiceResponse> {
        self.post_json(
            "/reset_student_result",
            &IdRequest {
                id: student_id.to_string(),
            },
        )
    }

    fn delete_quiz(&self) -> Result<ServiceResponse> {
        self.post_empty("/delete_quiz")
    }

    fn upload_students(&self, csv_file: &Path) -> Result<ServiceResponse> {
        if !is_roster_csv(csv_file) {
            return Ok(ServiceResponse::failure(INVALID_UPLOAD));
        }
        let form = reqwest::blocking::multipart::Form::new()
            .file("file", csv_file)
            .with_context(|| format!("Could not read {}", csv_file.display()))?;
        let request = self.client.post(self.endpoint("/upload")).multipart(form);
        self.send(request, "/upload")
    }

    fn create_quiz(&self, request: &QuizRequest) -> Result<ServiceResponse> {
        self.post_form("/create_quiz", &request.form_fields())
    }

    fn quiz_progress(&self) -> Result<QuizProgress> {
        let request = self.client.get(self.endpoint("/quiz_progress"));
        self.send(request, "/quiz_progress")
    }

    fn submit_quiz(&self, answers: &[Option<String>]) -> Result<ServiceResponse> {
        self.post_form("/submit_quiz", &answer_fields(answers))
    }
}
