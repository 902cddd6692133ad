//! Submission status machine and grading.

use crate::errors::AppError;
use crate::models::fields::{non_blank, required};
use crate::models::{
    RosterEntry, SubmissionStatus, SubmitReceipt, SubmitRequest, UpdateGradeRequest,
    UpdateStatusRequest,
};
use crate::services::assignments::require_assignment;
use crate::services::now_timestamp;
use crate::store::Store;

/// Student submission, by scan or by hand. Always lands on `已繳交`.
///
/// A student missing from the roster snapshot is rejected rather than added.
/// Only status and timestamp are written, so a grade saved meanwhile stays.
pub async fn submit(store: &dyn Store, request: SubmitRequest) -> Result<SubmitReceipt, AppError> {
    let student_id = required(request.student_id, "studentId")?;
    let assignment_id = required(request.assignment_id, "assignmentId")?;
    require_assignment(store, &assignment_id).await?;

    let now = now_timestamp();
    let updated = store
        .set_status(&assignment_id, &student_id, SubmissionStatus::Submitted, &now)
        .await?;
    if !updated {
        return Err(AppError::StudentNotInRoster {
            student_id,
            assignment_id,
        });
    }

    tracing::info!(
        student_id = %student_id,
        assignment_id = %assignment_id,
        "Assignment submitted"
    );

    Ok(SubmitReceipt {
        student_id,
        assignment_id,
        timestamp: now,
    })
}

/// Teacher override of a student's status.
pub async fn update_status(
    store: &dyn Store,
    request: UpdateStatusRequest,
) -> Result<RosterEntry, AppError> {
    let student_id = required(request.student_id, "studentId")?;
    let assignment_id = required(request.assignment_id, "assignmentId")?;
    let raw_status = required(request.status, "status")?;
    let status = SubmissionStatus::parse(&raw_status)
        .ok_or_else(|| AppError::Validation(format!("Invalid status: {}", raw_status)))?;

    require_assignment(store, &assignment_id).await?;
    let updated = store
        .set_status(&assignment_id, &student_id, status, &now_timestamp())
        .await?;
    if !updated {
        return Err(row_not_found(&assignment_id, &student_id));
    }

    tracing::info!(
        student_id = %student_id,
        assignment_id = %assignment_id,
        status = status.as_str(),
        "Status overridden"
    );
    current_row(store, &assignment_id, &student_id).await
}

/// Set or clear a grade. Status is not affected.
pub async fn update_grade(
    store: &dyn Store,
    request: UpdateGradeRequest,
) -> Result<RosterEntry, AppError> {
    let student_id = required(request.student_id, "studentId")?;
    let assignment_id = required(request.assignment_id, "assignmentId")?;
    let grade = non_blank(request.grade).map(|g| g.trim().to_string());

    require_assignment(store, &assignment_id).await?;
    let updated = store
        .set_grade(&assignment_id, &student_id, grade.as_deref())
        .await?;
    if !updated {
        return Err(row_not_found(&assignment_id, &student_id));
    }

    tracing::info!(student_id = %student_id, assignment_id = %assignment_id, "Grade updated");
    current_row(store, &assignment_id, &student_id).await
}

/// The row as stored after a write.
async fn current_row(
    store: &dyn Store,
    assignment_id: &str,
    student_id: &str,
) -> Result<RosterEntry, AppError> {
    store
        .get_roster_entry(assignment_id, student_id)
        .await?
        .ok_or_else(|| row_not_found(assignment_id, student_id))
}

fn row_not_found(assignment_id: &str, student_id: &str) -> AppError {
    AppError::NotFound(format!(
        "Student {} not found in assignment {}",
        student_id, assignment_id
    ))
}
