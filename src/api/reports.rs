//! Statistics and the due-today summary.

use serde::Serialize;
use serde_json::Value;

use super::{decode, success, ActionResult};
use crate::models::{ClassStatsRequest, DueSummary, StudentRefRequest, StudentStats};
use crate::services::{analytics, today};
use crate::AppState;

#[derive(Debug, Serialize)]
struct StatsBody {
    stats: StudentStats,
}

#[derive(Debug, Serialize)]
struct SummaryBody {
    summary: Vec<DueSummary>,
}

/// getDailySummary {} -> {summary}
pub async fn get_daily_summary(state: &AppState) -> ActionResult {
    let summary = analytics::daily_summary(state.store.as_ref(), today()).await?;
    success(SummaryBody { summary })
}

/// getStudentStats {studentId} -> {stats}
pub async fn get_student_stats(state: &AppState, payload: Value) -> ActionResult {
    let request: StudentRefRequest = decode(payload)?;
    let stats = analytics::student_stats(state.store.as_ref(), request).await?;
    success(StatsBody { stats })
}

/// getClassStats {classId?} -> {classStats, students}
pub async fn get_class_stats(state: &AppState, payload: Value) -> ActionResult {
    let request: ClassStatsRequest = decode(payload)?;
    let report = analytics::class_stats(state.store.as_ref(), request).await?;
    success(report)
}
