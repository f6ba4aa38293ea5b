use std::fmt::Write;

use qa_pages::{AnswerKind, Blocked, Question, Questionnaire, ResultSet};

/// Controls which bits of state the session prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: pages and prompts only.
    Clean,
    /// Verbose output: page position, answer counts, input hints for every prompt.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints everything around the rendered pages: header, prompts, outcomes.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
    show_answers_json: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity, show_answers_json: bool) -> Self {
        Self {
            verbosity,
            header_printed: false,
            show_answers_json,
        }
    }

    pub fn show_header(&mut self, questionnaire: &Questionnaire, description: Option<&str>) {
        if self.header_printed {
            return;
        }
        println!(
            "Questionnaire: {}",
            questionnaire.title().unwrap_or(questionnaire.id())
        );
        if let Some(description) = description {
            println!("{}", description);
        }
        self.header_printed = true;
    }

    pub fn show_status(&self, questionnaire: &Questionnaire) {
        if !self.verbosity.is_verbose() {
            return;
        }
        let Some(page) = questionnaire.current_page() else {
            return;
        };
        let answered = page
            .questions()
            .iter()
            .filter(|question| question.answer().is_some())
            .count();
        println!(
            "Status: page {}/{} ({}/{} answered)",
            page.number().unwrap_or_default(),
            questionnaire.total_page_count(),
            answered,
            page.questions().len()
        );
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = format!("{}/{} {}", prompt.index, prompt.total, prompt.title);
        if prompt.required {
            line.push_str(" *");
        }
        if let Some(hint) = &prompt.hint {
            line.push(' ');
            line.push_str(hint);
        }
        println!("{}", line);
        if self.verbosity.is_verbose() && !prompt.current.is_empty() {
            println!("Current: {}", prompt.current);
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if let Some(debug) = &error.debug_message {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_blocked(&self, blocked: Blocked) {
        match blocked {
            Blocked::Invalid => println!("Please fix the answers above before continuing."),
            Blocked::Unavailable => println!("That action is not available on this page."),
            Blocked::Suppressed => println!("Navigation was cancelled."),
            Blocked::NotStarted | Blocked::Finished => {
                println!("The questionnaire is not accepting answers.")
            }
        }
    }

    pub fn show_completion(&self, results: &ResultSet) {
        println!("Done ✅");
        match results.to_cbor() {
            Ok(bytes) => {
                println!("Answers (CBOR hex): {}", encode_hex(&bytes));
            }
            Err(err) => {
                eprintln!("Failed to serialize answers to CBOR: {}", err);
            }
        }
        if self.show_answers_json {
            match results.to_json_pretty() {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => {
                    eprintln!("Failed to serialize answers to JSON: {}", err);
                }
            }
        }
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub index: usize,
    pub total: usize,
    pub title: String,
    pub required: bool,
    pub hint: Option<String>,
    pub current: String,
}

impl PromptContext {
    pub fn new(question: &Question, index: usize, total: usize) -> Self {
        Self {
            index: index + 1,
            total,
            title: question.text().to_string(),
            required: question.options().required,
            hint: InputKind::of(question).hint(question),
            current: question
                .answer()
                .as_ref()
                .map(qa_pages::display_value)
                .unwrap_or_default(),
        }
    }
}

/// How a question's answer is typed in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Option number of a single choice.
    Choice,
    /// Comma-separated option numbers.
    Choices,
    Text,
    /// Choice numbers or free text.
    Mixed,
    /// Nothing to enter (hints only).
    None,
}

impl InputKind {
    pub fn of(question: &Question) -> Self {
        let (mut single, mut multiple, mut text) = (false, false, false);
        for answer in question.answers() {
            match answer.kind() {
                AnswerKind::SingleChoice { .. } => single = true,
                AnswerKind::MultipleChoice { .. } => multiple = true,
                AnswerKind::TextInput { .. } => text = true,
                AnswerKind::Hint { .. } => {}
            }
        }
        match (single || multiple, text) {
            (true, true) => InputKind::Mixed,
            (true, false) if multiple => InputKind::Choices,
            (true, false) => InputKind::Choice,
            (false, true) => InputKind::Text,
            (false, false) => InputKind::None,
        }
    }

    fn hint(&self, question: &Question) -> Option<String> {
        let options = question.answers().len();
        match self {
            InputKind::Choice => Some(format!("(option 1-{})", options)),
            InputKind::Choices => Some(format!("(options 1-{}, comma separated)", options)),
            InputKind::Text => Some("(text)".to_string()),
            InputKind::Mixed => Some(format!("(option 1-{} or text)", options)),
            InputKind::None => None,
        }
    }
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut encoded, "{:02x}", byte).expect("writing to string cannot fail");
    }
    encoded
}
