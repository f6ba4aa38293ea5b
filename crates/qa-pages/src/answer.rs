use serde_json::Value;

use crate::event::{Emits, Emitter};

/// Widget state of a single answer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerKind {
    /// Radio-style option; exclusive within its question.
    SingleChoice {
        label: String,
        value: String,
        checked: bool,
    },
    /// Checkbox-style option.
    MultipleChoice {
        label: String,
        value: String,
        checked: bool,
    },
    TextInput {
        placeholder: Option<String>,
        text: String,
    },
    /// Display-only text; never carries a value.
    Hint { text: String },
}

/// User input applied to an answer widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Pick a single-choice option.
    Select,
    /// Check or uncheck a multiple-choice option.
    Toggle(bool),
    /// Replace the text of a text input.
    Text(String),
}

impl Input {
    pub fn label(&self) -> &'static str {
        match self {
            Input::Select => "select",
            Input::Toggle(_) => "toggle",
            Input::Text(_) => "text",
        }
    }
}

/// One input mechanism attached to a question.
#[derive(Debug)]
pub struct Answer {
    kind: AnswerKind,
    emitter: Emitter,
}

impl Answer {
    fn from_kind(kind: AnswerKind) -> Self {
        Self {
            kind,
            emitter: Emitter::new(),
        }
    }

    /// `value` defaults to the label when omitted.
    pub fn single_choice(label: impl Into<String>, value: Option<&str>) -> Self {
        let label = label.into();
        let value = value.map(String::from).unwrap_or_else(|| label.clone());
        Self::from_kind(AnswerKind::SingleChoice {
            label,
            value,
            checked: false,
        })
    }

    /// `value` defaults to the label when omitted.
    pub fn multiple_choice(label: impl Into<String>, value: Option<&str>) -> Self {
        let label = label.into();
        let value = value.map(String::from).unwrap_or_else(|| label.clone());
        Self::from_kind(AnswerKind::MultipleChoice {
            label,
            value,
            checked: false,
        })
    }

    pub fn text_input(placeholder: Option<&str>) -> Self {
        Self::from_kind(AnswerKind::TextInput {
            placeholder: placeholder.map(String::from),
            text: String::new(),
        })
    }

    pub fn hint(text: impl Into<String>) -> Self {
        Self::from_kind(AnswerKind::Hint { text: text.into() })
    }

    pub fn kind(&self) -> &AnswerKind {
        &self.kind
    }

    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            AnswerKind::SingleChoice { .. } => "single_choice",
            AnswerKind::MultipleChoice { .. } => "multiple_choice",
            AnswerKind::TextInput { .. } => "text_input",
            AnswerKind::Hint { .. } => "hint",
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(
            self.kind,
            AnswerKind::SingleChoice { checked: true, .. }
                | AnswerKind::MultipleChoice { checked: true, .. }
        )
    }

    /// Current value of this answer, read against the other answers of its
    /// question (the widgets sharing the question's group identifier).
    ///
    /// `None` means the user has not interacted. Multiple choice always
    /// yields an array, empty when nothing is checked.
    pub fn value(&self, group: &[Answer]) -> Option<Value> {
        match &self.kind {
            AnswerKind::SingleChoice { .. } => group.iter().find_map(|answer| match &answer.kind {
                AnswerKind::SingleChoice {
                    value,
                    checked: true,
                    ..
                } => Some(Value::String(value.clone())),
                _ => None,
            }),
            AnswerKind::MultipleChoice { .. } => Some(Value::Array(
                group
                    .iter()
                    .filter_map(|answer| match &answer.kind {
                        AnswerKind::MultipleChoice {
                            value,
                            checked: true,
                            ..
                        } => Some(Value::String(value.clone())),
                        _ => None,
                    })
                    .collect(),
            )),
            AnswerKind::TextInput { text, .. } if !text.is_empty() => {
                Some(Value::String(text.clone()))
            }
            AnswerKind::TextInput { .. } | AnswerKind::Hint { .. } => None,
        }
    }

    /// Answers never veto on their own; rules live on the question.
    pub fn validate(&self) -> bool {
        true
    }

    pub fn accepts(&self, input: &Input) -> bool {
        matches!(
            (&self.kind, input),
            (AnswerKind::SingleChoice { .. }, Input::Select)
                | (AnswerKind::MultipleChoice { .. }, Input::Toggle(_))
                | (AnswerKind::TextInput { .. }, Input::Text(_))
        )
    }

    /// Re-populate the widget from a previously saved answer; `None` resets it.
    pub fn restore(&mut self, existing: Option<&Value>) {
        match &mut self.kind {
            AnswerKind::SingleChoice { value, checked, .. } => {
                *checked = existing.and_then(Value::as_str) == Some(value.as_str());
            }
            AnswerKind::MultipleChoice { value, checked, .. } => {
                *checked = existing.and_then(Value::as_array).is_some_and(|saved| {
                    saved
                        .iter()
                        .any(|item| item.as_str() == Some(value.as_str()))
                });
            }
            AnswerKind::TextInput { text, .. } => {
                *text = match existing {
                    Some(Value::String(saved)) => saved.clone(),
                    Some(other) => display_value(other),
                    None => String::new(),
                };
            }
            AnswerKind::Hint { .. } => {}
        }
    }

    pub(crate) fn set_checked(&mut self, on: bool) {
        if let AnswerKind::SingleChoice { checked, .. } | AnswerKind::MultipleChoice { checked, .. } =
            &mut self.kind
        {
            *checked = on;
        }
    }

    pub(crate) fn set_text(&mut self, value: String) {
        if let AnswerKind::TextInput { text, .. } = &mut self.kind {
            *text = value;
        }
    }
}

impl Emits for Answer {
    fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }
}

/// Human-readable form of an answer value.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
