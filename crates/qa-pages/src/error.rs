use thiserror::Error;

use crate::event::{AnswerId, QuestionId};

/// Structural errors raised by the questionnaire engine.
///
/// Validation failures are not errors: they surface as `false` plus an inline
/// message on the offending question.
#[derive(Debug, Error)]
pub enum QuestionnaireError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no page to render")]
    NoPage,
    #[error("page {0} does not exist")]
    UnknownPage(usize),
    #[error("question {0} does not exist")]
    UnknownQuestion(QuestionId),
    #[error("answer {0} does not exist")]
    UnknownAnswer(AnswerId),
    #[error("answer {answer} does not accept {input} input")]
    UnsupportedInput { answer: AnswerId, input: &'static str },
    #[error("render failed: {0}")]
    Render(#[from] std::io::Error),
    #[error("invalid questionnaire definition: {0}")]
    Definition(String),
}

pub type Result<T> = std::result::Result<T, QuestionnaireError>;
