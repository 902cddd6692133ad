//! Assignment metadata, roster snapshot rows and the submission status machine.

use serde::{Deserialize, Serialize};

use super::fields::opt_string;
use super::User;

/// Per-student submission status for one assignment.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SubmissionStatus {
    #[default]
    #[serde(rename = "未繳交")]
    NotSubmitted,
    #[serde(rename = "已繳交")]
    Submitted,
    #[serde(rename = "訂正")]
    Correction,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::NotSubmitted => "未繳交",
            SubmissionStatus::Submitted => "已繳交",
            SubmissionStatus::Correction => "訂正",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "未繳交" => Some(SubmissionStatus::NotSubmitted),
            "已繳交" => Some(SubmissionStatus::Submitted),
            "訂正" => Some(SubmissionStatus::Correction),
            _ => None,
        }
    }
}

/// Descriptive metadata row of an assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub created_at: String,
    /// Class whose students were snapshotted into the roster
    pub class_id: String,
    pub teacher_id: String,
}

/// One student's row in an assignment roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    #[serde(skip_serializing, default)]
    pub assignment_id: String,
    pub student_id: String,
    pub status: SubmissionStatus,
    pub submitted_at: Option<String>,
    pub student_name: String,
    pub grade: Option<String>,
}

impl RosterEntry {
    /// Fresh roster row for a student at snapshot time.
    pub fn snapshot(assignment_id: &str, student: &User) -> Self {
        Self {
            assignment_id: assignment_id.to_string(),
            student_id: student.id.clone(),
            status: SubmissionStatus::NotSubmitted,
            submitted_at: None,
            student_name: student.name.clone(),
            grade: None,
        }
    }

    /// Move to `status`, maintaining the submission timestamp.
    pub fn transition(&mut self, status: SubmissionStatus, now: &str) {
        status.stamp(now).apply(&mut self.submitted_at);
        self.status = status;
    }

    pub fn is_submitted(&self) -> bool {
        self.status == SubmissionStatus::Submitted
    }

    /// Numeric grade, or `None` when ungraded or unparsable.
    pub fn score(&self) -> Option<f64> {
        self.grade
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .and_then(|g| g.parse::<f64>().ok())
            .filter(|s| s.is_finite())
    }
}

/// Effect of a status change on a roster row's `submittedAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp<'a> {
    Set(&'a str),
    Clear,
    Keep,
}

impl Stamp<'_> {
    pub fn apply(self, submitted_at: &mut Option<String>) {
        match self {
            Stamp::Set(now) => *submitted_at = Some(now.to_string()),
            Stamp::Clear => *submitted_at = None,
            Stamp::Keep => {}
        }
    }
}

impl SubmissionStatus {
    /// Submitting stamps `now`, reverting to not-submitted clears the stamp
    /// and marking for correction leaves it as it was.
    pub fn stamp(self, now: &str) -> Stamp<'_> {
        match self {
            SubmissionStatus::Submitted => Stamp::Set(now),
            SubmissionStatus::NotSubmitted => Stamp::Clear,
            SubmissionStatus::Correction => Stamp::Keep,
        }
    }
}

/// Item returned by `getAssignments`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSummary {
    pub id: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    /// Status of the requesting student, absent for teacher listings
    pub status: Option<SubmissionStatus>,
}

/// Echo of a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub student_id: String,
    pub assignment_id: String,
    pub timestamp: String,
}

/// Payload of `createAssignment`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub new_assignment_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub teacher_id: Option<String>,
}

/// Payload of `getAssignments`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAssignmentsRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub student_id: Option<String>,
}

/// Payload of actions addressing a whole assignment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRef {
    #[serde(default, deserialize_with = "opt_string")]
    pub assignment_id: Option<String>,
}

/// Payload of `updateAssignmentMetadata`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMetadataRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub assignment_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub description: Option<String>,
}

/// Payload of `submitAssignment`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub assignment_id: Option<String>,
}

/// Payload of `updateStatus`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub assignment_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub status: Option<String>,
}

/// Payload of `updateGrade`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGradeRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub assignment_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub grade: Option<String>,
}
