use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answer::Answer;
use crate::error::{QuestionnaireError, Result};
use crate::question::{Question, ValidationOptions};

/// Declarative description of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    pub text: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub answers: Vec<AnswerSpec>,
}

/// Answer widget variants, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerSpec {
    SingleChoice {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    MultipleChoice {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    TextInput {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Hint {
        text: String,
    },
}

impl AnswerSpec {
    pub fn build(&self) -> Answer {
        match self {
            AnswerSpec::SingleChoice { label, value } => {
                Answer::single_choice(label.as_str(), value.as_deref())
            }
            AnswerSpec::MultipleChoice { label, value } => {
                Answer::multiple_choice(label.as_str(), value.as_deref())
            }
            AnswerSpec::TextInput { placeholder } => Answer::text_input(placeholder.as_deref()),
            AnswerSpec::Hint { text } => Answer::hint(text.as_str()),
        }
    }
}

impl QuestionSpec {
    pub fn check(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(QuestionnaireError::Definition(
                "question text cannot be empty".into(),
            ));
        }
        if self.answers.is_empty() {
            return Err(QuestionnaireError::Definition(format!(
                "question '{}' must define at least one answer",
                self.text
            )));
        }
        if let (Some(min), Some(max)) = (self.min, self.max)
            && min > 0.0
            && max > 0.0
            && min > max
        {
            return Err(QuestionnaireError::Definition(format!(
                "question '{}' has min {} above max {}",
                self.text, min, max
            )));
        }
        for answer in &self.answers {
            let label = match answer {
                AnswerSpec::SingleChoice { label, .. } | AnswerSpec::MultipleChoice { label, .. } => {
                    Some(label)
                }
                _ => None,
            };
            if label.is_some_and(|label| label.trim().is_empty()) {
                return Err(QuestionnaireError::Definition(format!(
                    "question '{}' has a choice without a label",
                    self.text
                )));
            }
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Question> {
        self.check()?;
        let options = ValidationOptions {
            required: self.required,
            min: self.min,
            max: self.max,
            callback: None,
        };
        let mut question = Question::new(self.text.as_str(), options);
        for answer in &self.answers {
            question.add_answer(answer.build());
        }
        Ok(question)
    }
}
