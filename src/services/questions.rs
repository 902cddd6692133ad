//! Q&A channel between students and teachers.

use crate::errors::AppError;
use crate::models::fields::{non_blank, required};
use crate::models::{
    AnswerQuestionRequest, ListQuestionsRequest, PostQuestionRequest, Question, QuestionStatus,
};
use crate::services::{new_id, now_timestamp};
use crate::store::Store;

pub async fn post(store: &dyn Store, request: PostQuestionRequest) -> Result<Question, AppError> {
    let student_id = required(request.student_id, "studentId")?;
    let question_text = required(request.question_text, "questionText")?;

    let question = Question {
        id: new_id('Q'),
        student_id,
        assignment_id: non_blank(request.assignment_id),
        question_text,
        status: QuestionStatus::Open,
        answer_text: String::new(),
        timestamp: now_timestamp(),
    };
    store.insert_question(&question).await?;

    tracing::info!(question_id = %question.id, student_id = %question.student_id, "Question posted");
    Ok(question)
}

/// Questions newest first, optionally only one student's.
pub async fn list(
    store: &dyn Store,
    request: ListQuestionsRequest,
) -> Result<Vec<Question>, AppError> {
    let student_id = non_blank(request.student_id);
    let mut questions: Vec<Question> = store
        .list_questions()
        .await?
        .into_iter()
        .filter(|q| student_id.as_ref().map_or(true, |s| &q.student_id == s))
        .collect();
    questions.reverse();
    Ok(questions)
}

/// Answer a question. Answering again overwrites the previous answer.
pub async fn answer(store: &dyn Store, request: AnswerQuestionRequest) -> Result<(), AppError> {
    let question_id = required(request.question_id, "questionId")?;
    let answer_text = required(request.answer_text, "answerText")?;

    if !store.answer_question(&question_id, &answer_text).await? {
        return Err(AppError::NotFound(format!(
            "Question not found: {}",
            question_id
        )));
    }
    tracing::info!(question_id = %question_id, "Question answered");
    Ok(())
}
