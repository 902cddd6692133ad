//! Action API module.
//!
//! Every client call is a `POST` whose JSON body names an `action`; the
//! remaining fields are that action's payload. Handlers answer with the
//! `{status: "success", ...}` envelope, errors go out through `AppError`.

mod assignments;
mod classroom;
mod reports;
mod users;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::AppState;

/// Success response envelope. The body's fields sit next to `status`.
#[derive(Debug, Serialize)]
pub struct ActionResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> ActionResponse<T> {
    pub fn new(body: T) -> Self {
        Self {
            status: "success",
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for ActionResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Body of actions that only confirm.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

/// Response type of every action handler.
pub type ActionResult = Result<Response, AppError>;

/// Wrap a body in the success envelope.
pub fn success<T: Serialize>(body: T) -> ActionResult {
    Ok(ActionResponse::new(body).into_response())
}

/// Success envelope carrying only a message.
pub fn message(text: impl Into<String>) -> ActionResult {
    success(Message {
        message: text.into(),
    })
}

/// Decode the action payload into a request type. Unknown fields, including
/// `action` itself, are ignored.
pub fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, AppError> {
    Ok(serde_json::from_value(payload)?)
}

/// POST / - Dispatch one action.
pub async fn exec(State(state): State<AppState>, body: Bytes) -> Response {
    match dispatch(&state, &body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn dispatch(state: &AppState, body: &[u8]) -> ActionResult {
    let payload: Value = serde_json::from_slice(body)?;
    if !payload.is_object() {
        return Err(AppError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    }

    let action = match payload.get("action").and_then(Value::as_str) {
        Some(action) if !action.trim().is_empty() => action.trim().to_string(),
        _ => return Err(AppError::missing_field("action")),
    };
    tracing::debug!(action = %action, "Dispatching action");

    match action.as_str() {
        // Users
        "login" => users::login(state, payload).await,
        "updateProfile" => users::update_profile(state, payload).await,
        "getStudents" => users::get_students(state).await,
        // Assignments
        "createAssignment" => assignments::create_assignment(state, payload).await,
        "getAssignments" => assignments::get_assignments(state, payload).await,
        "getAssignmentStatus" => assignments::get_assignment_status(state, payload).await,
        "updateAssignmentMetadata" => {
            assignments::update_assignment_metadata(state, payload).await
        }
        "deleteAssignment" => assignments::delete_assignment(state, payload).await,
        "submitAssignment" => assignments::submit_assignment(state, payload).await,
        "updateStatus" => assignments::update_status(state, payload).await,
        "updateGrade" => assignments::update_grade(state, payload).await,
        // Questions, points, contact book
        "postQuestion" => classroom::post_question(state, payload).await,
        "getQuestions" => classroom::get_questions(state, payload).await,
        "answerQuestion" => classroom::answer_question(state, payload).await,
        "getStudentPoints" => classroom::get_student_points(state, payload).await,
        "adjustPoints" => classroom::adjust_points(state, payload).await,
        "createContactNote" => classroom::create_contact_note(state, payload).await,
        "getLatestContactNote" => classroom::get_latest_contact_note(state, payload).await,
        "signContactNote" => classroom::sign_contact_note(state, payload).await,
        // Reports
        "getDailySummary" => reports::get_daily_summary(state).await,
        "getStudentStats" => reports::get_student_stats(state, payload).await,
        "getClassStats" => reports::get_class_stats(state, payload).await,
        _ => Err(AppError::InvalidAction(action)),
    }
}
