use std::io::{self, Write};

use crate::answer::{AnswerKind, display_value};
use crate::page::Page;
use crate::question::Question;
use crate::results::SavedAnswer;

/// Forward control offered for the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardControl {
    Next(String),
    /// The current page is the last one.
    Finish(String),
}

/// Labels of the navigation controls for the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub back: Option<String>,
    pub forward: ForwardControl,
}

/// Sink that turns questionnaire entities into a visual representation.
///
/// User input is fed back through [`crate::Questionnaire::interact`] and the
/// navigation actions (`next`, `back`, `finish`).
pub trait Renderer {
    /// Drop whatever is currently displayed.
    fn clear(&mut self) -> io::Result<()>;

    fn page(&mut self, page: &Page) -> io::Result<()>;

    fn controls(&mut self, controls: &Controls) -> io::Result<()>;

    /// Show or hide the inline validation message of `question`.
    fn validation(&mut self, question: &Question) -> io::Result<()>;

    /// Default results view: every question with its final answer.
    fn result(&mut self, entries: &[SavedAnswer]) -> io::Result<()>;
}

/// Plain-text renderer writing to any [`Write`] sink.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_question(&mut self, position: usize, question: &Question) -> io::Result<()> {
        let mut line = format!("{}. {}", position + 1, question.text());
        if question.options().required {
            line.push_str(" *");
        }
        writeln!(self.out, "{}", line)?;
        if let Some(message) = question.validation_message() {
            writeln!(self.out, "   ! {}", message)?;
        }
        for (index, answer) in question.answers().iter().enumerate() {
            let number = index + 1;
            match answer.kind() {
                AnswerKind::SingleChoice { label, checked, .. } => {
                    let mark = if *checked { "(x)" } else { "( )" };
                    writeln!(self.out, "   {} {}) {}", mark, number, label)?;
                }
                AnswerKind::MultipleChoice { label, checked, .. } => {
                    let mark = if *checked { "[x]" } else { "[ ]" };
                    writeln!(self.out, "   {} {}) {}", mark, number, label)?;
                }
                AnswerKind::TextInput { placeholder, text } => {
                    if text.is_empty() {
                        let hint = placeholder.as_deref().unwrap_or("");
                        writeln!(self.out, "   {}) > <{}>", number, hint)?;
                    } else {
                        writeln!(self.out, "   {}) > {}", number, text)?;
                    }
                }
                AnswerKind::Hint { text } => writeln!(self.out, "   i {}", text)?,
            }
        }
        Ok(())
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn clear(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn page(&mut self, page: &Page) -> io::Result<()> {
        let number = page.number().unwrap_or_default();
        match page.title() {
            Some(title) => writeln!(self.out, "Page {}: {}", number, title)?,
            None => writeln!(self.out, "Page {}", number)?,
        }
        for (position, question) in page.questions().iter().enumerate() {
            self.write_question(position, question)?;
        }
        Ok(())
    }

    fn controls(&mut self, controls: &Controls) -> io::Result<()> {
        let mut actions = Vec::new();
        if let Some(back) = &controls.back {
            actions.push(format!("[b] {}", back));
        }
        match &controls.forward {
            ForwardControl::Next(label) => actions.push(format!("[n] {}", label)),
            ForwardControl::Finish(label) => actions.push(format!("[f] {}", label)),
        }
        writeln!(self.out, "{}", actions.join("   "))
    }

    fn validation(&mut self, question: &Question) -> io::Result<()> {
        if let Some(message) = question.validation_message() {
            writeln!(self.out, "! {}: {}", question.text(), message)?;
        }
        Ok(())
    }

    fn result(&mut self, entries: &[SavedAnswer]) -> io::Result<()> {
        writeln!(self.out, "Results")?;
        for entry in entries {
            let answer = entry
                .answer
                .as_ref()
                .map(display_value)
                .unwrap_or_else(|| "-".to_string());
            writeln!(self.out, " - {}: {}", entry.text, answer)?;
        }
        Ok(())
    }
}
