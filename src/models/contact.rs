//! Contact book notes and parent signatures.

use serde::{Deserialize, Serialize};

use super::fields::opt_string;

/// Status written on every signature row.
pub const SIGNED: &str = "Signed";

/// A dated note from the teacher to parents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactNote {
    pub id: String,
    /// Local calendar date, `yyyy-MM-dd`
    pub date: String,
    pub content: String,
    pub teacher_id: Option<String>,
    #[serde(skip_serializing, default)]
    pub created_at: String,
}

/// A parent's acknowledgement of a note for one student.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactSignature {
    pub note_id: String,
    pub student_id: String,
    pub status: String,
    pub signed_at: String,
}

/// Response of `getLatestContactNote`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LatestNote {
    pub note: Option<ContactNote>,
    pub is_signed: bool,
    pub signed_at: Option<String>,
}

/// Payload of `createContactNote`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub teacher_id: Option<String>,
}

/// Payload of `getLatestContactNote`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestNoteRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub student_id: Option<String>,
}

/// Payload of `signContactNote`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignNoteRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub note_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub student_id: Option<String>,
}
