//! Assignment and submission actions.

use serde::Serialize;
use serde_json::Value;

use super::{decode, message, success, ActionResult};
use crate::models::{
    AssignmentRef, AssignmentSummary, CreateAssignmentRequest, ListAssignmentsRequest,
    RosterEntry, SubmitReceipt, SubmitRequest, UpdateGradeRequest, UpdateMetadataRequest,
    UpdateStatusRequest,
};
use crate::services::{assignments, submissions};
use crate::AppState;

#[derive(Debug, Serialize)]
struct AssignmentsBody {
    assignments: Vec<AssignmentSummary>,
}

#[derive(Debug, Serialize)]
struct RosterBody {
    data: Vec<RosterEntry>,
}

#[derive(Debug, Serialize)]
struct SubmitBody {
    message: &'static str,
    data: SubmitReceipt,
}

/// createAssignment {newAssignmentId, startDate, endDate, description, teacherId} -> {message}
pub async fn create_assignment(state: &AppState, payload: Value) -> ActionResult {
    let request: CreateAssignmentRequest = decode(payload)?;
    let created = assignments::create(state.store.as_ref(), request).await?;
    message(format!(
        "作業建立成功: {} (Class {})",
        created.assignment.id, created.assignment.class_id
    ))
}

/// getAssignments {studentId?} -> {assignments}
pub async fn get_assignments(state: &AppState, payload: Value) -> ActionResult {
    let request: ListAssignmentsRequest = decode(payload)?;
    let assignments = assignments::list(state.store.as_ref(), request).await?;
    success(AssignmentsBody { assignments })
}

/// getAssignmentStatus {assignmentId} -> {data}
pub async fn get_assignment_status(state: &AppState, payload: Value) -> ActionResult {
    let request: AssignmentRef = decode(payload)?;
    let data = assignments::roster(state.store.as_ref(), request).await?;
    success(RosterBody { data })
}

/// updateAssignmentMetadata {assignmentId, description} -> {message}
pub async fn update_assignment_metadata(state: &AppState, payload: Value) -> ActionResult {
    let request: UpdateMetadataRequest = decode(payload)?;
    assignments::update_metadata(state.store.as_ref(), request).await?;
    message("Description updated")
}

/// deleteAssignment {assignmentId} -> {message}
pub async fn delete_assignment(state: &AppState, payload: Value) -> ActionResult {
    let request: AssignmentRef = decode(payload)?;
    assignments::delete(state.store.as_ref(), request).await?;
    message("Assignment deleted successfully")
}

/// submitAssignment {studentId, assignmentId} -> {message, data}
pub async fn submit_assignment(state: &AppState, payload: Value) -> ActionResult {
    let request: SubmitRequest = decode(payload)?;
    let data = submissions::submit(state.store.as_ref(), request).await?;
    success(SubmitBody {
        message: "繳交成功",
        data,
    })
}

/// updateStatus {studentId, assignmentId, status} -> {message}
pub async fn update_status(state: &AppState, payload: Value) -> ActionResult {
    let request: UpdateStatusRequest = decode(payload)?;
    submissions::update_status(state.store.as_ref(), request).await?;
    message("Status updated")
}

/// updateGrade {studentId, assignmentId, grade} -> {message}
pub async fn update_grade(state: &AppState, payload: Value) -> ActionResult {
    let request: UpdateGradeRequest = decode(payload)?;
    submissions::update_grade(state.store.as_ref(), request).await?;
    message("成績已更新")
}
