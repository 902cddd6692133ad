//! Analytics and daily summary response models.

use serde::{Deserialize, Serialize};

use super::fields::opt_string;

/// Per-student submission and grade statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub total_assignments: u32,
    pub submitted_count: u32,
    pub submission_rate: i64,
    pub avg_score: i64,
}

/// Class-wide rates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassStats {
    pub submission_rate: i64,
    pub avg_score: i64,
}

/// One student's line in the class report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub id: String,
    pub name: String,
    pub submission_rate: i64,
    pub avg_score: i64,
}

/// Response of `getClassStats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassReport {
    pub class_stats: ClassStats,
    pub students: Vec<StudentReport>,
}

/// Assignment due today with the students still missing it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DueSummary {
    pub subject: String,
    /// Seat numbers, falling back to student ids
    pub missing: Vec<String>,
}

/// Payload of `getClassStats`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStatsRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub class_id: Option<String>,
}
