//! Q&A question model.

use serde::{Deserialize, Serialize};

use super::fields::opt_string;

/// Lifecycle of a question: `Open` until a teacher answers it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuestionStatus {
    Open,
    Answered,
}

impl QuestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionStatus::Open => "Open",
            QuestionStatus::Answered => "Answered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(QuestionStatus::Open),
            "Answered" => Some(QuestionStatus::Answered),
            _ => None,
        }
    }
}

/// A student question, optionally tied to an assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub student_id: String,
    /// May reference an assignment that has since been deleted
    pub assignment_id: Option<String>,
    pub question_text: String,
    pub status: QuestionStatus,
    pub answer_text: String,
    pub timestamp: String,
}

/// Payload of `postQuestion`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuestionRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub assignment_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub question_text: Option<String>,
}

/// Payload of `getQuestions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuestionsRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub student_id: Option<String>,
}

/// Payload of `answerQuestion`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerQuestionRequest {
    #[serde(default, deserialize_with = "opt_string")]
    pub question_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub answer_text: Option<String>,
}
