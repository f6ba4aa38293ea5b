#![allow(missing_docs)]

pub mod answer;
pub mod error;
pub mod event;
pub mod l10n;
pub mod page;
pub mod question;
pub mod questionnaire;
pub mod render;
pub mod results;
pub mod spec;

pub use answer::{Answer, AnswerKind, Input, display_value};
pub use error::{QuestionnaireError, Result};
pub use event::{
    Action, AnswerId, Emits, Emitter, EntityRef, Event, Flow, QuestionId, normalize_event_name,
};
pub use l10n::{ButtonLabels, L10n, ValidationMessages, format_message, substitute_placeholder};
pub use page::Page;
pub use question::{Question, ValidationOptions, ValidatorFn, Verdict};
pub use questionnaire::{Blocked, Questionnaire, State, Transition};
pub use render::{Controls, ForwardControl, Renderer, TextRenderer};
pub use results::{ResultPage, ResultSet, SavedAnswer, SavedResults};
pub use spec::{AnswerSpec, PageSpec, QuestionSpec, QuestionnaireSpec};
