pub mod form;
pub mod question;

pub use form::{PageSpec, QuestionnaireSpec};
pub use question::{AnswerSpec, QuestionSpec};
