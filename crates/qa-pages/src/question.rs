use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::answer::{Answer, AnswerKind, Input, display_value};
use crate::event::{Emits, Emitter};
use crate::l10n::{L10n, ValidationMessages, format_bound, format_message, substitute_placeholder};

/// Result of a custom validation callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// Fail with the generic message.
    Fail,
    /// Fail with this message; `{{n}}` is replaced by the answer value.
    Message(String),
}

/// Custom validation hook. A plain function so rules stay inspectable.
pub type ValidatorFn = fn(Option<&Value>) -> Verdict;

/// Validation rules of a question.
///
/// `min`/`max` only apply when positive; they compare string length,
/// numeric value or number of selected options depending on the answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub callback: Option<ValidatorFn>,
}

impl ValidationOptions {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_callback(mut self, callback: ValidatorFn) -> Self {
        self.callback = Some(callback);
        self
    }

    fn active_min(&self) -> Option<f64> {
        self.min.filter(|min| *min > 0.0)
    }

    fn active_max(&self) -> Option<f64> {
        self.max.filter(|max| *max > 0.0)
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Min,
    Max,
}

/// One prompt with its validation rules and answer widgets.
#[derive(Debug)]
pub struct Question {
    text: String,
    answers: Vec<Answer>,
    options: ValidationOptions,
    group_id: String,
    message: Option<String>,
    emitter: Emitter,
}

impl Question {
    pub fn new(text: impl Into<String>, options: ValidationOptions) -> Self {
        Self {
            text: text.into(),
            answers: Vec::new(),
            options,
            group_id: Uuid::new_v4().to_string(),
            message: None,
            emitter: Emitter::new(),
        }
    }

    /// Append an answer widget; returns its index within the question.
    pub fn add_answer(&mut self, answer: Answer) -> usize {
        self.answers.push(answer);
        self.answers.len() - 1
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn answer_at(&self, index: usize) -> Option<&Answer> {
        self.answers.get(index)
    }

    pub fn answer_at_mut(&mut self, index: usize) -> Option<&mut Answer> {
        self.answers.get_mut(index)
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Identifier shared by this question's mutually exclusive widgets.
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Inline validation message, `None` while hidden.
    pub fn validation_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// First value reported by any answer, in declaration order.
    pub fn answer(&self) -> Option<Value> {
        self.answers
            .iter()
            .find_map(|answer| answer.value(&self.answers))
    }

    /// Apply user input to the answer at `index`.
    ///
    /// Selecting a single-choice option clears the other single-choice
    /// options of this question. Input the widget does not accept is ignored.
    pub fn apply_input(&mut self, index: usize, input: Input) {
        let Some(answer) = self.answers.get(index) else {
            warn!(question = %self.text, index, "input for a missing answer ignored");
            return;
        };
        if !answer.accepts(&input) {
            warn!(
                question = %self.text,
                index,
                input = input.label(),
                widget = answer.kind_label(),
                "input not accepted by answer widget"
            );
            return;
        }
        match input {
            Input::Select => {
                for (position, answer) in self.answers.iter_mut().enumerate() {
                    if matches!(answer.kind(), AnswerKind::SingleChoice { .. }) {
                        answer.set_checked(position == index);
                    }
                }
            }
            Input::Toggle(on) => self.answers[index].set_checked(on),
            Input::Text(text) => self.answers[index].set_text(text),
        }
    }

    /// Re-populate every widget from the saved answer of this question.
    pub fn restore(&mut self, existing: Option<&Value>) {
        for answer in &mut self.answers {
            answer.restore(existing);
        }
    }

    /// Check the answer against the rules, stopping at the first failure.
    ///
    /// Failures show a message and return `false`; success hides it.
    pub fn validate(&mut self, l10n: &L10n) -> bool {
        let messages = &l10n.validation;
        let value = self.answer();

        if self.options.required && value.is_none() {
            self.show_error(&messages.required, "");
            return false;
        }

        if let Some(min) = self.options.active_min()
            && let Some((template, placeholder)) =
                bound_violation(value.as_ref(), min, Bound::Min, messages)
        {
            self.show_error(&template, &placeholder);
            return false;
        }

        if let Some(max) = self.options.active_max()
            && let Some((template, placeholder)) =
                bound_violation(value.as_ref(), max, Bound::Max, messages)
        {
            self.show_error(&template, &placeholder);
            return false;
        }

        if let Some(callback) = self.options.callback {
            match callback(value.as_ref()) {
                Verdict::Pass => {}
                Verdict::Fail => {
                    self.show_error(&messages.generic, "");
                    return false;
                }
                Verdict::Message(message) => {
                    let placeholder = value.as_ref().map(display_value).unwrap_or_default();
                    self.message = Some(substitute_placeholder(&message, &placeholder));
                    return false;
                }
            }
        }

        self.hide_error();
        true
    }

    pub fn show_error(&mut self, template: &str, placeholder: &str) {
        self.message = Some(format_message(template, placeholder));
    }

    pub fn hide_error(&mut self) {
        self.message = None;
    }
}

impl Emits for Question {
    fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }
}

fn bound_violation(
    value: Option<&Value>,
    bound: f64,
    which: Bound,
    messages: &ValidationMessages,
) -> Option<(String, String)> {
    let pick = |min: &String, max: &String| match which {
        Bound::Min => min.clone(),
        Bound::Max => max.clone(),
    };
    let (measure, template) = match value? {
        Value::String(text) => (
            text.chars().count() as f64,
            pick(&messages.min_string, &messages.max_string),
        ),
        Value::Number(number) => (
            number.as_f64().unwrap_or(f64::NAN),
            pick(&messages.min_number, &messages.max_number),
        ),
        Value::Array(items) => (
            items.len() as f64,
            pick(&messages.min_array, &messages.max_array),
        ),
        Value::Null => return None,
        other => {
            warn!(answer = %other, "unknown answer type encountered");
            return Some((messages.generic.clone(), String::new()));
        }
    };
    let violated = match which {
        Bound::Min => measure < bound,
        Bound::Max => measure > bound,
    };
    violated.then(|| (template, format_bound(bound)))
}
