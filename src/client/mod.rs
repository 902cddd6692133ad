//! HTTP client for the action API, plus the QR scan helpers the scanner
//! screens use.

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::fields::{non_blank, opt_string};
use crate::models::{AssignmentSummary, SubmitReceipt, SubmitRequest, User};

/// Failure of a client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request never produced a response
    Transport(String),
    /// The response or a scanned code was not the expected JSON
    Decode(String),
    /// The server answered with `status: "error"`
    Action { code: String, message: String },
    /// A scanned code lacks a student or assignment id
    InvalidScan(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Transport(e) => write!(f, "網路連線錯誤: {}", e),
            ClientError::Decode(e) => write!(f, "Invalid response: {}", e),
            ClientError::Action { message, .. } => write!(f, "{}", message),
            ClientError::InvalidScan(e) => write!(f, "Invalid QR code: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    user: User,
}

#[derive(Debug, Deserialize)]
struct AssignmentsBody {
    assignments: Vec<AssignmentSummary>,
}

#[derive(Debug, Deserialize)]
struct SubmitBody {
    data: SubmitReceipt,
}

/// Calls actions on one backend endpoint.
#[derive(Debug, Clone)]
pub struct ActionClient {
    http: Client,
    endpoint: String,
}

impl ActionClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Send `action` with `payload` merged into the body and return the
    /// success envelope.
    pub async fn call<P: Serialize>(&self, action: &str, payload: P) -> Result<Value, ClientError> {
        let mut body = match serde_json::to_value(payload)
            .map_err(|e| ClientError::Decode(e.to_string()))?
        {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ClientError::Decode(format!(
                    "payload must be a JSON object, found {}",
                    other
                )))
            }
        };
        body.insert("action".to_string(), Value::String(action.to_string()));

        let response = self.http.post(&self.endpoint).json(&body).send().await?;
        let text = response.text().await?;
        let envelope: Value =
            serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))?;

        if envelope.get("status").and_then(Value::as_str) == Some("success") {
            return Ok(envelope);
        }
        let error: ErrorBody =
            serde_json::from_value(envelope).map_err(|e| ClientError::Decode(e.to_string()))?;
        tracing::debug!(action, code = %error.code, "Action failed: {}", error.message);
        Err(ClientError::Action {
            code: error.code,
            message: error.message,
        })
    }

    /// Like [`call`](Self::call), decoding the envelope into `T`.
    pub async fn call_as<T: DeserializeOwned, P: Serialize>(
        &self,
        action: &str,
        payload: P,
    ) -> Result<T, ClientError> {
        let envelope = self.call(action, payload).await?;
        serde_json::from_value(envelope).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn login(&self, user_id: &str) -> Result<User, ClientError> {
        let body: UserBody = self
            .call_as("login", serde_json::json!({ "userId": user_id }))
            .await?;
        Ok(body.user)
    }

    /// Assignments, with the student's statuses when `student_id` is given.
    pub async fn assignments(
        &self,
        student_id: Option<&str>,
    ) -> Result<Vec<AssignmentSummary>, ClientError> {
        let body: AssignmentsBody = self
            .call_as("getAssignments", serde_json::json!({ "studentId": student_id }))
            .await?;
        Ok(body.assignments)
    }

    pub async fn submit(&self, request: &SubmitRequest) -> Result<SubmitReceipt, ClientError> {
        let body: SubmitBody = self.call_as("submitAssignment", request).await?;
        Ok(body.data)
    }

    /// Submit a scanned QR code, using `selected` when the code carries no
    /// assignment.
    pub async fn submit_scan(
        &self,
        raw: &str,
        selected: Option<&str>,
    ) -> Result<SubmitReceipt, ClientError> {
        let request = ScanPayload::decode(raw)?.resolve(selected)?;
        self.submit(&request).await
    }
}

/// Contents of a student's QR code.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScanPayload {
    #[serde(default, deserialize_with = "opt_string")]
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub assignment_id: Option<String>,
}

impl ScanPayload {
    pub fn decode(raw: &str) -> Result<Self, ClientError> {
        serde_json::from_str(raw.trim()).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Turn the scan into a submit request.
    pub fn resolve(self, selected: Option<&str>) -> Result<SubmitRequest, ClientError> {
        let student_id = non_blank(self.student_id)
            .ok_or_else(|| ClientError::InvalidScan("missing studentId".to_string()))?;
        let assignment_id = non_blank(self.assignment_id)
            .or_else(|| non_blank(selected.map(str::to_string)))
            .ok_or_else(|| ClientError::InvalidScan("no assignment selected".to_string()))?;
        Ok(SubmitRequest {
            student_id: Some(student_id),
            assignment_id: Some(assignment_id),
        })
    }
}

/// Order for assignment pickers: earliest deadline first, undated last.
pub fn sort_by_deadline(assignments: &mut [AssignmentSummary]) {
    assignments.sort_by(|a, b| {
        (a.end_date.is_empty(), &a.end_date).cmp(&(b.end_date.is_empty(), &b.end_date))
    });
}
