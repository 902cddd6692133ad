//! Append-only points ledger.

use crate::errors::AppError;
use crate::models::fields::{non_blank, required};
use crate::models::{
    AdjustPointsRequest, PointsBalance, PointsEntry, StudentRefRequest, SYSTEM_TEACHER,
};
use crate::services::{new_id, now_timestamp};
use crate::store::Store;

/// Number of ledger entries returned with a balance.
pub const HISTORY_LIMIT: usize = 10;

/// Balance is always recomputed from the ledger.
pub async fn balance(
    store: &dyn Store,
    request: StudentRefRequest,
) -> Result<PointsBalance, AppError> {
    let student_id = required(request.student_id, "studentId")?;
    let entries = store.list_points(&student_id).await?;

    let points = total(&entries)?;
    let history: Vec<PointsEntry> = entries.into_iter().rev().take(HISTORY_LIMIT).collect();

    Ok(PointsBalance { points, history })
}

/// Sum of a ledger, computed in `i128`. A sum outside `i64` is an error.
fn total(entries: &[PointsEntry]) -> Result<i64, AppError> {
    let sum: i128 = entries.iter().map(|e| i128::from(e.change)).sum();
    i64::try_from(sum).map_err(|_| AppError::Validation("Points balance out of range".to_string()))
}

/// Append a change. Any integer is accepted, zero included, as long as the
/// balance stays within `i64`.
pub async fn adjust(
    store: &dyn Store,
    request: AdjustPointsRequest,
) -> Result<PointsEntry, AppError> {
    let student_id = required(request.student_id, "studentId")?;
    let change = request.change.ok_or_else(|| AppError::missing_field("change"))?;

    let current = total(&store.list_points(&student_id).await?)?;
    if current.checked_add(change).is_none() {
        return Err(AppError::Validation(format!(
            "Points change {} would take the balance of {} out of range",
            change, student_id
        )));
    }

    let entry = PointsEntry {
        id: new_id('P'),
        student_id,
        change,
        reason: request.reason.unwrap_or_default(),
        timestamp: now_timestamp(),
        teacher_id: non_blank(request.teacher_id).unwrap_or_else(|| SYSTEM_TEACHER.to_string()),
    };
    store.append_points(&entry).await?;

    tracing::info!(
        student_id = %entry.student_id,
        change = entry.change,
        teacher_id = %entry.teacher_id,
        "Points adjusted"
    );
    Ok(entry)
}
