use serde_json::Value;

use crate::event::{Emits, Emitter, QuestionId};
use crate::l10n::L10n;
use crate::question::Question;
use crate::results::{SavedAnswer, SavedResults};

/// One step of a questionnaire.
#[derive(Debug, Default)]
pub struct Page {
    number: Option<usize>,
    title: Option<String>,
    questions: Vec<Question>,
    emitter: Emitter,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// 1-based position, assigned once the page is added to a questionnaire.
    pub fn number(&self) -> Option<usize> {
        self.number
    }

    pub(crate) fn attach(&mut self, number: usize) {
        self.number = Some(number);
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Append a question; returns its index on the page.
    pub fn add_question(&mut self, question: Question) -> usize {
        self.questions.push(question);
        self.questions.len() - 1
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn question_mut(&mut self, index: usize) -> Option<&mut Question> {
        self.questions.get_mut(index)
    }

    /// `true` only if every question validates; stops at the first failure.
    pub fn validate(&mut self, l10n: &L10n) -> bool {
        self.questions
            .iter_mut()
            .all(|question| question.validate(l10n))
    }

    /// Current answers of all questions, valid or not.
    pub fn answers(&self) -> Vec<SavedAnswer> {
        let number = self.number.unwrap_or_default();
        self.questions
            .iter()
            .enumerate()
            .map(|(index, question)| SavedAnswer {
                question: QuestionId::new(number, index),
                text: question.text().to_string(),
                answer: question.answer(),
            })
            .collect()
    }

    /// Saved answer of the question at `index`, looked up under this page's number.
    pub fn saved_result<'s>(&self, saved: &'s SavedResults, index: usize) -> Option<&'s Value> {
        let number = self.number?;
        saved.get(QuestionId::new(number, index))
    }

    pub(crate) fn restore(&mut self, saved: &SavedResults) {
        for index in 0..self.questions.len() {
            let existing = self.saved_result(saved, index);
            self.questions[index].restore(existing);
        }
    }
}

impl Emits for Page {
    fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }
}
