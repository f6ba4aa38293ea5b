use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{QuestionnaireError, Result};
use crate::l10n::L10n;
use crate::page::Page;
use crate::questionnaire::Questionnaire;
use crate::spec::question::QuestionSpec;

/// One page of a questionnaire definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub questions: Vec<QuestionSpec>,
}

/// Top-level questionnaire definition, as loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionnaireSpec {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l10n: Option<L10n>,
    pub pages: Vec<PageSpec>,
}

impl QuestionnaireSpec {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| QuestionnaireError::Definition(err.to_string()))
    }

    /// JSON schema describing the definition format.
    pub fn json_schema() -> Value {
        schemars::schema_for!(QuestionnaireSpec).to_value()
    }

    pub fn question_count(&self) -> usize {
        self.pages.iter().map(|page| page.questions.len()).sum()
    }

    /// Build a ready-to-render questionnaire; pages are numbered in order.
    pub fn build(&self) -> Result<Questionnaire> {
        if self.id.trim().is_empty() {
            return Err(QuestionnaireError::Definition(
                "questionnaire id cannot be empty".into(),
            ));
        }
        if self.pages.is_empty() {
            return Err(QuestionnaireError::Definition(format!(
                "questionnaire '{}' must define at least one page",
                self.id
            )));
        }

        let mut questionnaire = Questionnaire::new(self.id.as_str()).with_title(self.title.as_str());
        if let Some(l10n) = &self.l10n {
            questionnaire.set_l10n(l10n.clone());
        }
        for page_spec in &self.pages {
            let mut page = Page::new();
            if let Some(title) = &page_spec.title {
                page = page.with_title(title.as_str());
            }
            for question in &page_spec.questions {
                page.add_question(question.build()?);
            }
            questionnaire.add_page(page);
        }
        Ok(questionnaire)
    }
}
