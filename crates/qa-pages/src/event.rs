//! Listener registries shared by every questionnaire entity.
//!
//! Each entity embeds an [`Emitter`]. Emission itself is local; upward
//! propagation (answer → question → page → questionnaire) is driven by
//! [`crate::Questionnaire::emit`], which walks [`EntityRef::parent`] links and
//! stops as soon as a level suppresses the event.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{QuestionnaireError, Result};

/// Address of a question: 1-based page number plus 0-based position on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId {
    pub page: usize,
    pub question: usize,
}

impl QuestionId {
    pub fn new(page: usize, question: usize) -> Self {
        Self { page, question }
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.page, self.question)
    }
}

/// Address of an answer widget inside a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnswerId {
    pub page: usize,
    pub question: usize,
    pub answer: usize,
}

impl AnswerId {
    pub fn new(page: usize, question: usize, answer: usize) -> Self {
        Self {
            page,
            question,
            answer,
        }
    }

    pub fn question_id(&self) -> QuestionId {
        QuestionId::new(self.page, self.question)
    }
}

impl fmt::Display for AnswerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.page, self.question, self.answer)
    }
}

/// Identifies the entity an event was emitted on (or targets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Questionnaire,
    Page(usize),
    Question(QuestionId),
    Answer(AnswerId),
}

impl EntityRef {
    /// The entity an event propagates to when it is not suppressed.
    pub fn parent(&self) -> Option<EntityRef> {
        match self {
            EntityRef::Questionnaire => None,
            EntityRef::Page(_) => Some(EntityRef::Questionnaire),
            EntityRef::Question(id) => Some(EntityRef::Page(id.page)),
            EntityRef::Answer(id) => Some(EntityRef::Question(id.question_id())),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Questionnaire => write!(f, "questionnaire"),
            EntityRef::Page(number) => write!(f, "page {}", number),
            EntityRef::Question(id) => write!(f, "question {}", id),
            EntityRef::Answer(id) => write!(f, "answer {}", id),
        }
    }
}

/// Outcome of a single listener invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Suppress,
}

impl From<()> for Flow {
    fn from(_: ()) -> Self {
        Flow::Continue
    }
}

impl From<bool> for Flow {
    fn from(proceed: bool) -> Self {
        if proceed {
            Flow::Continue
        } else {
            Flow::Suppress
        }
    }
}

/// Navigation a listener may request while an event is being dispatched.
///
/// Requests are queued and executed once the operation that emitted the
/// event has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Next,
    Back,
    Finish,
}

pub(crate) type ActionQueue = RefCell<VecDeque<Action>>;

/// Payload handed to every listener.
pub struct Event<'a> {
    name: &'a str,
    source: EntityRef,
    target: Option<EntityRef>,
    actions: Option<&'a ActionQueue>,
}

impl<'a> Event<'a> {
    pub fn new(name: &'a str, source: EntityRef) -> Self {
        Self {
            name,
            source,
            target: None,
            actions: None,
        }
    }

    pub fn with_target(mut self, target: Option<EntityRef>) -> Self {
        self.target = target;
        self
    }

    pub(crate) fn with_actions(mut self, actions: &'a ActionQueue) -> Self {
        self.actions = Some(actions);
        self
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// The entity whose listeners are currently running.
    pub fn source(&self) -> EntityRef {
        self.source
    }

    pub fn target(&self) -> Option<EntityRef> {
        self.target
    }

    /// Queue a navigation action to run after the current operation.
    pub fn request(&self, action: Action) {
        match self.actions {
            Some(queue) => queue.borrow_mut().push_back(action),
            None => warn!(
                event = self.name,
                ?action,
                "navigation requested outside of a questionnaire; ignoring"
            ),
        }
    }
}

type Listener = Box<dyn Fn(&Event<'_>) -> Flow>;

/// Per-entity listener registry.
#[derive(Default)]
pub struct Emitter {
    listeners: BTreeMap<String, Vec<Listener>>,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.listeners
                    .iter()
                    .map(|(name, callbacks)| (name, callbacks.len())),
            )
            .finish()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `name` (`"onNext"`, `"next"` and `"NEXT"` are equivalent).
    pub fn add_event_listener<F, R>(&mut self, name: &str, callback: F) -> Result<()>
    where
        F: Fn(&Event<'_>) -> R + 'static,
        R: Into<Flow>,
    {
        let name = normalize_event_name(name)?;
        let listener: Listener = Box::new(move |event: &Event<'_>| callback(event).into());
        self.listeners.entry(name).or_default().push(listener);
        Ok(())
    }

    /// Run every listener registered for the event's name.
    ///
    /// All listeners run even after one suppresses; the return value is
    /// `false` if any of them did.
    pub fn emit(&self, event: &Event<'_>) -> bool {
        let mut suppressed = false;
        if let Some(callbacks) = self.listeners.get(event.name()) {
            for callback in callbacks {
                if callback(event) == Flow::Suppress {
                    suppressed = true;
                }
            }
        }
        !suppressed
    }

    pub fn listener_count(&self, name: &str) -> usize {
        normalize_event_name(name)
            .ok()
            .and_then(|name| self.listeners.get(&name).map(Vec::len))
            .unwrap_or(0)
    }
}

/// Entities that carry an [`Emitter`].
pub trait Emits {
    fn emitter(&self) -> &Emitter;

    fn emitter_mut(&mut self) -> &mut Emitter;

    fn add_event_listener<F, R>(&mut self, name: &str, callback: F) -> Result<()>
    where
        F: Fn(&Event<'_>) -> R + 'static,
        R: Into<Flow>,
    {
        self.emitter_mut().add_event_listener(name, callback)
    }
}

/// Strip a leading, case-insensitive `on` and lower-case the rest.
pub fn normalize_event_name(name: &str) -> Result<String> {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let prefix = PREFIX.get_or_init(|| Regex::new("(?i)^on").expect("static pattern is valid"));
    let normalized = prefix.replace(name, "").to_lowercase();
    if normalized.is_empty() {
        return Err(QuestionnaireError::InvalidArgument(format!(
            "the event name '{}' is invalid",
            name
        )));
    }
    Ok(normalized)
}
