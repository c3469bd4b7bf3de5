// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use thiserror::Error;
use utoipa::ToSchema;

/// Represents the 'quiz_questions' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub quiz_id: i64,

    /// The prompt shown to the learner.
    pub question_text: String,

    /// Ordered option labels, stored as a JSON array.
    pub options: Json<Vec<String>>,

    /// Zero-based index into `options`.
    pub correct_answer: i32,

    pub order_index: i32,
}

/// A question as loaded into a quiz session. Immutable for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
}

/// A stored question no learner could answer correctly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidQuestion {
    #[error("question {id} has no options")]
    NoOptions { id: i64 },
    #[error("question {id} marks option {answer} correct but has {options} options")]
    AnswerOutOfRange { id: i64, answer: i32, options: usize },
}

impl TryFrom<QuestionRow> for Question {
    type Error = InvalidQuestion;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let options = row.options.0;
        if options.is_empty() {
            return Err(InvalidQuestion::NoOptions { id: row.id });
        }
        let correct_option = usize::try_from(row.correct_answer)
            .ok()
            .filter(|index| *index < options.len())
            .ok_or(InvalidQuestion::AnswerOutOfRange {
                id: row.id,
                answer: row.correct_answer,
                options: options.len(),
            })?;

        Ok(Self {
            id: row.id,
            prompt: row.question_text,
            options,
            correct_option,
        })
    }
}

/// DTO for sending a question to the client.
/// `correct_option` is only filled in once answers may be shown.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicQuestion {
    pub id: i64,
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<usize>,
}

impl PublicQuestion {
    pub fn hidden(question: &Question) -> Self {
        Self {
            id: question.id,
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            correct_option: None,
        }
    }

    pub fn revealed(question: &Question) -> Self {
        Self {
            correct_option: Some(question.correct_option),
            ..Self::hidden(question)
        }
    }
}
