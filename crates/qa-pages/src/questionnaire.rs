//! Pagination and navigation state machine.
//!
//! The questionnaire owns its pages and drives which one is current. The
//! controller actions [`Questionnaire::next`], [`Questionnaire::back`] and
//! [`Questionnaire::finish`] are what a renderer's navigation controls call:
//! they validate, emit the `next`/`prev` events (which listeners may
//! suppress), snapshot answers and move the current page.

use serde_json::Value;
use tracing::{debug, warn};

use crate::answer::Input;
use crate::error::{QuestionnaireError, Result};
use crate::event::{
    Action, ActionQueue, AnswerId, Emits, Emitter, EntityRef, Event, QuestionId,
    normalize_event_name,
};
use crate::l10n::L10n;
use crate::page::Page;
use crate::question::Question;
use crate::render::{Controls, ForwardControl, Renderer};
use crate::results::{ResultSet, SavedAnswer, SavedResults};

/// Upper bound on listener-requested actions run after a single operation.
const MAX_QUEUED_ACTIONS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    NotStarted,
    Active,
    Finished,
}

/// Why a navigation action did not move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocked {
    NotStarted,
    Finished,
    /// No page in that direction (or finish requested before the last page).
    Unavailable,
    /// The current page failed validation.
    Invalid,
    /// A listener returned `false`.
    Suppressed,
}

/// Outcome of a navigation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved(usize),
    Finished,
    Blocked(Blocked),
}

impl Transition {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Transition::Blocked(_))
    }
}

/// Root entity: an ordered set of pages plus navigation state.
#[derive(Debug)]
pub struct Questionnaire {
    id: String,
    title: Option<String>,
    pages: Vec<Page>,
    saved: SavedResults,
    current: Option<usize>,
    started: bool,
    state: State,
    l10n: L10n,
    emitter: Emitter,
    actions: ActionQueue,
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self::new("questionnaire")
    }
}

impl Questionnaire {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            pages: Vec::new(),
            saved: SavedResults::default(),
            current: None,
            started: false,
            state: State::NotStarted,
            l10n: L10n::default(),
            emitter: Emitter::new(),
            actions: ActionQueue::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn l10n(&self) -> &L10n {
        &self.l10n
    }

    /// Replace the string table; takes effect on the next render.
    pub fn set_l10n(&mut self, l10n: L10n) {
        self.l10n = l10n;
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Attach `page`, numbering it after the pages already added.
    pub fn add_page(&mut self, mut page: Page) -> usize {
        let number = self.pages.len() + 1;
        page.attach(number);
        self.pages.push(page);
        number
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, number: usize) -> Option<&Page> {
        number.checked_sub(1).and_then(|index| self.pages.get(index))
    }

    pub fn page_mut(&mut self, number: usize) -> Option<&mut Page> {
        number
            .checked_sub(1)
            .and_then(|index| self.pages.get_mut(index))
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.page(id.page)?.question(id.question)
    }

    pub fn question_mut(&mut self, id: QuestionId) -> Option<&mut Question> {
        self.page_mut(id.page)?.question_mut(id.question)
    }

    pub fn total_page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page_number(&self) -> Option<usize> {
        self.current
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.current.and_then(|number| self.page(number))
    }

    /// The current page, or the first page before navigation started.
    pub fn recent_page_number(&self) -> Option<usize> {
        self.current
            .or_else(|| (!self.pages.is_empty()).then_some(1))
    }

    pub fn prev_page_number(&self) -> Option<usize> {
        self.current
            .map(|number| if number >= 2 { number - 1 } else { 1 })
    }

    pub fn next_page_number(&self) -> Option<usize> {
        let total = self.total_page_count();
        self.current
            .map(|number| if number < total { number + 1 } else { total })
    }

    pub fn prev_page(&self) -> Option<&Page> {
        self.prev_page_number().and_then(|number| self.page(number))
    }

    pub fn next_page(&self) -> Option<&Page> {
        self.next_page_number().and_then(|number| self.page(number))
    }

    pub fn can_go_back(&self) -> bool {
        self.current.is_some_and(|number| number >= 2)
    }

    pub fn can_go_forward(&self) -> bool {
        self.current
            .is_some_and(|number| number < self.total_page_count())
    }

    /// Saved answer of a question, `None` until its page has been left once.
    pub fn saved_result(&self, question: QuestionId) -> Option<&Value> {
        self.saved.get(question)
    }

    /// The value a question's widgets are restored from when its page is shown.
    pub fn existing_answer(&self, question: QuestionId) -> Option<&Value> {
        self.page(question.page)?
            .saved_result(&self.saved, question.question)
    }

    pub fn saved_results(&self) -> &SavedResults {
        &self.saved
    }

    pub fn result_set(&self) -> ResultSet {
        self.saved.to_result_set(&self.id)
    }

    /// Every question with its live answer, in page order.
    pub fn collect_results(&self) -> Vec<SavedAnswer> {
        self.pages.iter().flat_map(Page::answers).collect()
    }

    /// Snapshot the current page's answers, replacing any earlier snapshot.
    pub fn save_answers(&mut self) {
        if let Some(page) = self.current_page() {
            let number = page.number().unwrap_or_default();
            let answers = page.answers();
            self.saved.save(number, answers);
        }
    }

    /// Emit `name` on `source` and, unless suppressed there, on each ancestor.
    ///
    /// `target` is only passed to the listeners of `source`. Returns `false`
    /// if a listener of `source` suppressed the event; suppression further
    /// up only stops propagation. Navigation requested by the listeners runs
    /// before this returns.
    pub fn emit(
        &mut self,
        renderer: &mut dyn Renderer,
        source: EntityRef,
        name: &str,
        target: Option<EntityRef>,
    ) -> Result<bool> {
        let name = normalize_event_name(name)?;
        let delivered = self.dispatch(source, &name, target);
        self.settle(renderer)?;
        Ok(delivered)
    }

    /// Navigation actions requested by listeners and not yet run.
    pub fn pending_actions(&self) -> usize {
        self.actions.borrow().len()
    }

    fn dispatch(&self, source: EntityRef, name: &str, target: Option<EntityRef>) -> bool {
        let delivered = self.emit_local(source, name, target);
        if delivered {
            let mut parent = source.parent();
            while let Some(entity) = parent {
                if !self.emit_local(entity, name, None) {
                    break;
                }
                parent = entity.parent();
            }
        }
        delivered
    }

    fn emit_local(&self, entity: EntityRef, name: &str, target: Option<EntityRef>) -> bool {
        let Some(emitter) = self.emitter_of(entity) else {
            warn!(%entity, event = name, "event emitted on an unknown entity");
            return true;
        };
        let event = Event::new(name, entity)
            .with_target(target)
            .with_actions(&self.actions);
        let delivered = emitter.emit(&event);
        debug!(%entity, event = name, delivered, "event emitted");
        delivered
    }

    fn emitter_of(&self, entity: EntityRef) -> Option<&Emitter> {
        match entity {
            EntityRef::Questionnaire => Some(&self.emitter),
            EntityRef::Page(number) => self.page(number).map(Emits::emitter),
            EntityRef::Question(id) => self.question(id).map(Emits::emitter),
            EntityRef::Answer(id) => self
                .question(id.question_id())
                .and_then(|question| question.answer_at(id.answer))
                .map(Emits::emitter),
        }
    }

    /// Render `page` (or the recent page) with its controls.
    ///
    /// The first render emits `start`; if a listener suppresses it nothing is
    /// rendered, `Ok(false)` is returned and the questionnaire stays not started.
    pub fn render(&mut self, renderer: &mut dyn Renderer, page: Option<usize>) -> Result<bool> {
        let rendered = self.render_inner(renderer, page)?;
        self.settle(renderer)?;
        Ok(rendered)
    }

    fn render_inner(&mut self, renderer: &mut dyn Renderer, page: Option<usize>) -> Result<bool> {
        if !self.started && !self.dispatch(EntityRef::Questionnaire, "start", None) {
            debug!(questionnaire = %self.id, "start suppressed");
            return Ok(false);
        }
        self.started = true;

        let number = match page {
            Some(number) if self.page(number).is_none() => {
                return Err(QuestionnaireError::UnknownPage(number));
            }
            Some(number) => number,
            None => self.recent_page_number().ok_or(QuestionnaireError::NoPage)?,
        };
        self.current = Some(number);
        self.state = State::Active;

        renderer.clear()?;
        self.render_page_inner(renderer)?;
        self.render_controls_inner(renderer)?;
        Ok(true)
    }

    /// Render the current page: emits `pagechanged`, restores saved answers
    /// into the widgets, then emits `shown` on the page.
    pub fn render_page(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        self.render_page_inner(renderer)?;
        self.settle(renderer)
    }

    fn render_page_inner(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        let number = self.current.ok_or(QuestionnaireError::NoPage)?;
        self.dispatch(
            EntityRef::Questionnaire,
            "pagechanged",
            Some(EntityRef::Page(number)),
        );

        let page = number
            .checked_sub(1)
            .and_then(|index| self.pages.get_mut(index))
            .ok_or(QuestionnaireError::UnknownPage(number))?;
        page.restore(&self.saved);
        renderer.page(page)?;

        self.dispatch(EntityRef::Page(number), "shown", None);
        Ok(())
    }

    pub fn controls(&self) -> Controls {
        let buttons = &self.l10n.buttons;
        let back = self.can_go_back().then(|| buttons.back.clone());
        let forward = if self.can_go_forward() {
            ForwardControl::Next(buttons.next.clone())
        } else {
            ForwardControl::Finish(buttons.finish.clone())
        };
        Controls { back, forward }
    }

    pub fn render_controls(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        self.render_controls_inner(renderer)?;
        self.settle(renderer)
    }

    fn render_controls_inner(&self, renderer: &mut dyn Renderer) -> Result<()> {
        renderer.controls(&self.controls())?;
        Ok(())
    }

    /// Show the results view.
    ///
    /// Emits `finished`; a listener returning `false` takes over rendering
    /// and the default view is skipped.
    pub fn render_result(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        self.render_result_inner(renderer)?;
        self.settle(renderer)
    }

    fn render_result_inner(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        renderer.clear()?;
        self.state = State::Finished;
        if self.dispatch(EntityRef::Questionnaire, "finished", None) {
            renderer.result(&self.collect_results())?;
        } else {
            debug!(questionnaire = %self.id, "default result view suppressed");
        }
        Ok(())
    }

    /// Move to the previous page and re-render; no `prev` event, no snapshot.
    pub fn go_back(&mut self, renderer: &mut dyn Renderer) -> Result<bool> {
        let moved = self.go_back_inner(renderer)?;
        self.settle(renderer)?;
        Ok(moved)
    }

    fn go_back_inner(&mut self, renderer: &mut dyn Renderer) -> Result<bool> {
        if !self.can_go_back() {
            return Ok(false);
        }
        let target = self.prev_page_number();
        self.render_inner(renderer, target)
    }

    /// Move to the next page and re-render; no validation, no `next` event, no snapshot.
    pub fn go_forward(&mut self, renderer: &mut dyn Renderer) -> Result<bool> {
        let moved = self.go_forward_inner(renderer)?;
        self.settle(renderer)?;
        Ok(moved)
    }

    fn go_forward_inner(&mut self, renderer: &mut dyn Renderer) -> Result<bool> {
        if !self.can_go_forward() {
            return Ok(false);
        }
        let target = self.next_page_number();
        self.render_inner(renderer, target)
    }

    /// "Next" control: validate, emit `next`, save answers, advance.
    ///
    /// On the last page this behaves as [`Questionnaire::finish`].
    pub fn next(&mut self, renderer: &mut dyn Renderer) -> Result<Transition> {
        let transition = self.next_inner(renderer)?;
        self.settle(renderer)?;
        Ok(transition)
    }

    fn next_inner(&mut self, renderer: &mut dyn Renderer) -> Result<Transition> {
        let number = match self.active_page() {
            Ok(number) => number,
            Err(blocked) => return Ok(Transition::Blocked(blocked)),
        };
        if !self.can_go_forward() {
            return self.finish_inner(renderer);
        }

        let page = number
            .checked_sub(1)
            .and_then(|index| self.pages.get_mut(index))
            .ok_or(QuestionnaireError::UnknownPage(number))?;
        let valid = page.validate(&self.l10n);
        for question in self.pages[number - 1].questions() {
            renderer.validation(question)?;
        }
        if !valid {
            debug!(page = number, "page failed validation");
            return Ok(Transition::Blocked(Blocked::Invalid));
        }

        if !self.dispatch(EntityRef::Page(number), "next", None) {
            return Ok(Transition::Blocked(Blocked::Suppressed));
        }
        self.save_answers();
        self.go_forward_inner(renderer)?;
        Ok(self.moved())
    }

    /// "Back" control: emit `prev`, save answers, go back. No validation.
    pub fn back(&mut self, renderer: &mut dyn Renderer) -> Result<Transition> {
        let transition = self.back_inner(renderer)?;
        self.settle(renderer)?;
        Ok(transition)
    }

    fn back_inner(&mut self, renderer: &mut dyn Renderer) -> Result<Transition> {
        let number = match self.active_page() {
            Ok(number) => number,
            Err(blocked) => return Ok(Transition::Blocked(blocked)),
        };
        if !self.can_go_back() {
            return Ok(Transition::Blocked(Blocked::Unavailable));
        }
        if !self.dispatch(EntityRef::Page(number), "prev", None) {
            return Ok(Transition::Blocked(Blocked::Suppressed));
        }
        self.save_answers();
        self.go_back_inner(renderer)?;
        Ok(self.moved())
    }

    /// "Finish" control on the last page: emit `next`, save answers and show
    /// the results. The last page is not re-validated.
    pub fn finish(&mut self, renderer: &mut dyn Renderer) -> Result<Transition> {
        let transition = self.finish_inner(renderer)?;
        self.settle(renderer)?;
        Ok(transition)
    }

    fn finish_inner(&mut self, renderer: &mut dyn Renderer) -> Result<Transition> {
        let number = match self.active_page() {
            Ok(number) => number,
            Err(blocked) => return Ok(Transition::Blocked(blocked)),
        };
        if self.can_go_forward() {
            return Ok(Transition::Blocked(Blocked::Unavailable));
        }
        if !self.dispatch(EntityRef::Page(number), "next", None) {
            return Ok(Transition::Blocked(Blocked::Suppressed));
        }
        self.save_answers();
        self.render_result_inner(renderer)?;
        Ok(Transition::Finished)
    }

    /// Apply user input to an answer widget and emit `answered` on it.
    ///
    /// Returns whether the event went undisturbed by the answer's listeners.
    pub fn interact(
        &mut self,
        renderer: &mut dyn Renderer,
        id: AnswerId,
        input: Input,
    ) -> Result<bool> {
        let question = self
            .question_mut(id.question_id())
            .ok_or(QuestionnaireError::UnknownQuestion(id.question_id()))?;
        let answer = question
            .answer_at(id.answer)
            .ok_or(QuestionnaireError::UnknownAnswer(id))?;
        if !answer.accepts(&input) {
            return Err(QuestionnaireError::UnsupportedInput {
                answer: id,
                input: input.label(),
            });
        }
        question.apply_input(id.answer, input);

        let delivered = self.dispatch(EntityRef::Answer(id), "answered", None);
        self.settle(renderer)?;
        Ok(delivered)
    }

    fn active_page(&self) -> std::result::Result<usize, Blocked> {
        match (self.state, self.current) {
            (State::Finished, _) => Err(Blocked::Finished),
            (State::Active, Some(number)) => Ok(number),
            _ => Err(Blocked::NotStarted),
        }
    }

    fn moved(&self) -> Transition {
        match self.current {
            Some(number) => Transition::Moved(number),
            None => Transition::Blocked(Blocked::NotStarted),
        }
    }

    /// Run navigation queued by listeners, oldest first.
    fn settle(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        let mut processed = 0;
        loop {
            let Some(action) = self.actions.borrow_mut().pop_front() else {
                break;
            };
            if processed == MAX_QUEUED_ACTIONS {
                let dropped = self.actions.borrow_mut().drain(..).count() + 1;
                warn!(dropped, "too many queued navigation actions; dropping the rest");
                break;
            }
            processed += 1;
            let transition = match action {
                Action::Next => self.next_inner(renderer)?,
                Action::Back => self.back_inner(renderer)?,
                Action::Finish => self.finish_inner(renderer)?,
            };
            debug!(?action, ?transition, "queued navigation action ran");
        }
        Ok(())
    }
}

impl Emits for Questionnaire {
    fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }
}
