use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::QuestionId;

/// A question paired with its answer at the time it was captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAnswer {
    pub question: QuestionId,
    pub text: String,
    pub answer: Option<Value>,
}

/// Answers snapshotted per page number whenever a page is left.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedResults {
    pages: BTreeMap<usize, Vec<SavedAnswer>>,
}

impl SavedResults {
    /// Replace the snapshot of `page` wholesale.
    pub fn save(&mut self, page: usize, answers: Vec<SavedAnswer>) {
        self.pages.insert(page, answers);
    }

    pub fn page(&self, page: usize) -> Option<&[SavedAnswer]> {
        self.pages.get(&page).map(Vec::as_slice)
    }

    pub fn get(&self, question: QuestionId) -> Option<&Value> {
        self.pages
            .get(&question.page)?
            .iter()
            .find(|saved| saved.question == question)
            .and_then(|saved| saved.answer.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn to_result_set(&self, questionnaire_id: &str) -> ResultSet {
        ResultSet {
            questionnaire_id: questionnaire_id.to_string(),
            pages: self
                .pages
                .iter()
                .map(|(number, answers)| ResultPage {
                    number: *number,
                    answers: answers.clone(),
                })
                .collect(),
        }
    }
}

/// Exportable snapshot of every saved page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub questionnaire_id: String,
    pub pages: Vec<ResultPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub number: usize,
    pub answers: Vec<SavedAnswer>,
}

impl ResultSet {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }
}
