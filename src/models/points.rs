//! Points ledger model.

use serde::{Deserialize, Serialize};

use super::fields::{opt_i64, opt_string};

/// Teacher id recorded when an adjustment names no teacher.
pub const SYSTEM_TEACHER: &str = "System";

/// One append-only change to a student's points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PointsEntry {
    pub id: String,
    #[serde(skip_serializing, default)]
    pub student_id: String,
    pub change: i64,
    pub reason: String,
    pub timestamp: String,
    #[serde(skip_serializing, default)]
    pub teacher_id: String,
}

/// Response of `getStudentPoints`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointsBalance {
    pub points: i64,
    /// Most recent entries, newest first
    pub history: Vec<PointsEntry>,
}

/// Payload of `getStudentPoints`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRefRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub student_id: Option<String>,
}

/// Payload of `adjustPoints`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustPointsRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "opt_i64")]
    pub change: Option<i64>,
    #[serde(default, deserialize_with = "opt_string")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub teacher_id: Option<String>,
}
