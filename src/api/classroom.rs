//! Q&A, points ledger and contact book actions.

use serde::Serialize;
use serde_json::Value;

use super::{decode, message, success, ActionResult};
use crate::models::{
    AdjustPointsRequest, AnswerQuestionRequest, CreateNoteRequest, LatestNoteRequest,
    ListQuestionsRequest, PostQuestionRequest, Question, SignNoteRequest, StudentRefRequest,
};
use crate::services::{contact, points, questions};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostedBody {
    message: &'static str,
    question_id: String,
}

#[derive(Debug, Serialize)]
struct QuestionsBody {
    questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NoteCreatedBody {
    message: &'static str,
    note_id: String,
}

/// postQuestion {studentId, assignmentId?, questionText} -> {message, questionId}
pub async fn post_question(state: &AppState, payload: Value) -> ActionResult {
    let request: PostQuestionRequest = decode(payload)?;
    let question = questions::post(state.store.as_ref(), request).await?;
    success(PostedBody {
        message: "問題已送出",
        question_id: question.id,
    })
}

/// getQuestions {studentId?} -> {questions}
pub async fn get_questions(state: &AppState, payload: Value) -> ActionResult {
    let request: ListQuestionsRequest = decode(payload)?;
    let questions = questions::list(state.store.as_ref(), request).await?;
    success(QuestionsBody { questions })
}

/// answerQuestion {questionId, answerText} -> {message}
pub async fn answer_question(state: &AppState, payload: Value) -> ActionResult {
    let request: AnswerQuestionRequest = decode(payload)?;
    questions::answer(state.store.as_ref(), request).await?;
    message("回覆成功")
}

/// getStudentPoints {studentId} -> {points, history}
pub async fn get_student_points(state: &AppState, payload: Value) -> ActionResult {
    let request: StudentRefRequest = decode(payload)?;
    let balance = points::balance(state.store.as_ref(), request).await?;
    success(balance)
}

/// adjustPoints {studentId, change, reason?, teacherId?} -> {message}
pub async fn adjust_points(state: &AppState, payload: Value) -> ActionResult {
    let request: AdjustPointsRequest = decode(payload)?;
    points::adjust(state.store.as_ref(), request).await?;
    message("Points updated")
}

/// createContactNote {content, teacherId?} -> {message, noteId}
pub async fn create_contact_note(state: &AppState, payload: Value) -> ActionResult {
    let request: CreateNoteRequest = decode(payload)?;
    let note = contact::create_note(state.store.as_ref(), request).await?;
    success(NoteCreatedBody {
        message: "Note created",
        note_id: note.id,
    })
}

/// getLatestContactNote {studentId?} -> {note, isSigned, signedAt}
pub async fn get_latest_contact_note(state: &AppState, payload: Value) -> ActionResult {
    let request: LatestNoteRequest = decode(payload)?;
    let latest = contact::latest(state.store.as_ref(), request).await?;
    success(latest)
}

/// signContactNote {noteId, studentId} -> {message}
pub async fn sign_contact_note(state: &AppState, payload: Value) -> ActionResult {
    let request: SignNoteRequest = decode(payload)?;
    let outcome = contact::sign(state.store.as_ref(), request).await?;
    message(outcome.message())
}
