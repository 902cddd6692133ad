//! User actions: login, profile edits and the student list.

use serde::Serialize;
use serde_json::Value;

use super::{decode, message, success, ActionResult};
use crate::models::{LoginRequest, StudentRef, UpdateProfileRequest, User};
use crate::services::users;
use crate::AppState;

#[derive(Debug, Serialize)]
struct LoginBody {
    user: User,
}

#[derive(Debug, Serialize)]
struct StudentsBody {
    students: Vec<StudentRef>,
}

/// login {userId} -> {user}
pub async fn login(state: &AppState, payload: Value) -> ActionResult {
    let request: LoginRequest = decode(payload)?;
    let user = users::login(state.store.as_ref(), request).await?;
    success(LoginBody { user })
}

/// updateProfile {userId, name} -> {message}
pub async fn update_profile(state: &AppState, payload: Value) -> ActionResult {
    let request: UpdateProfileRequest = decode(payload)?;
    users::update_profile(state.store.as_ref(), request).await?;
    message("Name updated")
}

/// getStudents {} -> {students}
pub async fn get_students(state: &AppState) -> ActionResult {
    let students = users::list_students(state.store.as_ref()).await?;
    success(StudentsBody { students })
}
