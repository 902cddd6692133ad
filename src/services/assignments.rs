//! Assignment lifecycle: creation with roster snapshot, listing, edits and
//! deletion.

use crate::errors::AppError;
use crate::models::fields::{non_blank, required};
use crate::models::{
    Assignment, AssignmentRef, AssignmentSummary, CreateAssignmentRequest,
    ListAssignmentsRequest, Role, RosterEntry, SubmissionStatus, UpdateMetadataRequest,
};
use crate::services::now_timestamp;
use crate::store::Store;

/// Outcome of a successful `createAssignment`.
#[derive(Debug, Clone)]
pub struct CreatedAssignment {
    pub assignment: Assignment,
    pub roster_size: usize,
}

/// Create an assignment and snapshot the teacher's class roster.
///
/// The roster is resolved at call time; students who join the class later
/// never get a row.
pub async fn create(
    store: &dyn Store,
    request: CreateAssignmentRequest,
) -> Result<CreatedAssignment, AppError> {
    let id = required(request.new_assignment_id, "newAssignmentId")?;
    let teacher_id = required(request.teacher_id, "teacherId")?;

    if store.get_assignment(&id).await?.is_some() {
        return Err(AppError::AlreadyExists(format!(
            "Assignment already exists: {}",
            id
        )));
    }

    let users = store.list_users().await?;
    let class_id = users
        .iter()
        .find(|u| u.id == teacher_id && u.role == Role::Teacher)
        .map(|u| u.class_id.clone())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized(format!(
                "Teacher not found or no class assigned: {}",
                teacher_id
            ))
        })?;

    let roster: Vec<RosterEntry> = users
        .iter()
        .filter(|u| u.is_student_in(&class_id))
        .map(|student| RosterEntry::snapshot(&id, student))
        .collect();

    let assignment = Assignment {
        id: id.clone(),
        start_date: non_blank(request.start_date).unwrap_or_default(),
        end_date: non_blank(request.end_date).unwrap_or_default(),
        description: request.description.unwrap_or_default(),
        created_at: now_timestamp(),
        class_id,
        teacher_id,
    };

    store.create_assignment(&assignment, &roster).await?;

    tracing::info!(
        assignment_id = %assignment.id,
        class_id = %assignment.class_id,
        roster_size = roster.len(),
        "Assignment created"
    );

    Ok(CreatedAssignment {
        assignment,
        roster_size: roster.len(),
    })
}

/// List assignments in creation order, with the student's status if asked.
pub async fn list(
    store: &dyn Store,
    request: ListAssignmentsRequest,
) -> Result<Vec<AssignmentSummary>, AppError> {
    let student_id = non_blank(request.student_id);
    let assignments = store.list_assignments().await?;

    let mut summaries = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let status = match &student_id {
            Some(student_id) => Some(
                store
                    .get_roster_entry(&assignment.id, student_id)
                    .await?
                    .map(|row| row.status)
                    .unwrap_or(SubmissionStatus::NotSubmitted),
            ),
            None => None,
        };
        summaries.push(AssignmentSummary {
            id: assignment.id,
            start_date: assignment.start_date,
            end_date: assignment.end_date,
            description: assignment.description,
            status,
        });
    }
    Ok(summaries)
}

/// Roster rows of one assignment, in snapshot order.
pub async fn roster(
    store: &dyn Store,
    request: AssignmentRef,
) -> Result<Vec<RosterEntry>, AppError> {
    let id = required(request.assignment_id, "assignmentId")?;
    require_assignment(store, &id).await?;
    store.list_roster(&id).await
}

pub async fn update_metadata(
    store: &dyn Store,
    request: UpdateMetadataRequest,
) -> Result<(), AppError> {
    let id = required(request.assignment_id, "assignmentId")?;
    let description = required(request.description, "description")?;

    if !store.update_assignment_description(&id, &description).await? {
        return Err(not_found(&id));
    }
    tracing::info!(assignment_id = %id, "Assignment description updated");
    Ok(())
}

/// Delete metadata and roster. Questions, points and notes that mention the id
/// are left untouched.
pub async fn delete(store: &dyn Store, request: AssignmentRef) -> Result<(), AppError> {
    let id = required(request.assignment_id, "assignmentId")?;

    if !store.delete_assignment(&id).await? {
        return Err(not_found(&id));
    }
    tracing::info!(assignment_id = %id, "Assignment deleted");
    Ok(())
}

pub(crate) async fn require_assignment(
    store: &dyn Store,
    id: &str,
) -> Result<Assignment, AppError> {
    store.get_assignment(id).await?.ok_or_else(|| not_found(id))
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Assignment not found: {}", id))
}
