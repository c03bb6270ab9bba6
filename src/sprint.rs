use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::question::{Question, QuestionSource, RandomQuestions};
use crate::scoring::{self, SessionSummary};
use crate::session::{
    Feedback, Mistake, Phase, RoundState, Selection, TimerBand, TimerKind, Timers, Verdict,
};
use crate::store::KeyValueStore;
use crate::TICK_RATE_MS;

/// State changes the presentation layer reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    QuestionPresented { number: u32, question: Question },
    /// The countdown entered its final stretch with no answer given
    Urgency,
    Feedback(Feedback),
    ScoreChanged(u32),
    Finished(SessionSummary),
}

/// Round controller for one player.
///
/// All input arrives through the `on_*` methods and [`Sprint::advance`], which
/// the runner calls from a single ordered event queue. Calls that do not fit
/// the current phase are ignored.
pub struct Sprint {
    config: Config,
    state: RoundState,
    phase: Phase,
    timers: Timers,
    questions: Box<dyn QuestionSource>,
    store: Box<dyn KeyValueStore>,
    summary: Option<SessionSummary>,
    signals: Vec<Signal>,
}

impl Sprint {
    pub fn new(
        config: Config,
        questions: Box<dyn QuestionSource>,
        store: Box<dyn KeyValueStore>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: RoundState::new(config.time_per_question()),
            config,
            phase: Phase::Idle,
            timers: Timers::default(),
            questions,
            store,
            summary: None,
            signals: Vec::new(),
        })
    }

    /// Random questions drawn from the configured operand range
    pub fn with_random_questions(config: Config, store: Box<dyn KeyValueStore>) -> Result<Self> {
        let questions = Box::new(RandomQuestions::new(&config));
        Self::new(config, questions, store)
    }

    pub fn start(&mut self) {
        log::info!(
            "starting sprint: {} questions, {}ms each, {}ms budget",
            self.config.questions_total,
            self.config.time_per_question_ms,
            self.config.total_game_time_ms
        );
        self.timers.cancel_all();
        self.state = RoundState::new(self.config.time_per_question());
        self.summary = None;
        self.signals.clear();
        self.state.active = true;
        self.timers
            .arm(TimerKind::Session, self.config.total_game_time());
        self.present_question();
    }

    /// Abandons whatever is running and starts over
    pub fn reset(&mut self) {
        self.start();
    }

    pub fn on_select_option(&mut self, value: u32) {
        if !self.accepts_selection() {
            return;
        }
        let selection = match &self.state.question {
            Some(q) if q.has_choice(value) => Selection::Chosen(value),
            _ => {
                log::debug!("{} is not on offer, treating as no selection", value);
                Selection::None
            }
        };
        self.accept(selection);
    }

    /// Selects by position in the presented choices
    pub fn on_select_index(&mut self, index: usize) {
        if !self.accepts_selection() {
            return;
        }
        match self.state.choices().and_then(|c| c.get(index)).copied() {
            Some(value) => self.on_select_option(value),
            None => {
                log::debug!("choice index {} out of range", index);
                self.accept(Selection::None);
            }
        }
    }

    pub fn on_tick(&mut self) {
        self.advance(Duration::from_millis(TICK_RATE_MS));
    }

    /// Moves every live timer forward by `elapsed`, firing them in deadline
    /// order. On a tie the round timers fire before the session budget.
    pub fn advance(&mut self, mut elapsed: Duration) {
        while self.state.active && !elapsed.is_zero() {
            let step = self
                .timers
                .next_deadline()
                .map_or(elapsed, |d| d.min(elapsed));
            let fired = self.timers.consume(step);
            elapsed -= step;

            if self.phase == Phase::Presenting {
                if let Some(left) = self.timers.remaining(TimerKind::Countdown) {
                    self.state.time_remaining = left;
                    self.check_urgency();
                }
            }

            for kind in fired {
                match kind {
                    TimerKind::Countdown => self.on_countdown_expired(),
                    TimerKind::Feedback => self.on_feedback_elapsed(),
                    TimerKind::Session => self.on_session_timeout(),
                }
            }
        }
    }

    pub fn on_countdown_expired(&mut self) {
        if !self.accepts_selection() {
            return;
        }
        self.timers.cancel(TimerKind::Countdown);
        self.state.time_remaining = Duration::ZERO;
        log::debug!(
            "question {} timed out",
            self.state.current_question
        );
        self.evaluate(Selection::None);
    }

    pub fn on_feedback_elapsed(&mut self) {
        if !self.state.active || !matches!(self.phase, Phase::Evaluating(_)) {
            return;
        }
        self.timers.cancel(TimerKind::Feedback);
        if self.state.current_question >= self.config.questions_total {
            log::info!("question limit of {} reached", self.config.questions_total);
            self.finish();
        } else {
            self.state.current_question += 1;
            self.present_question();
        }
    }

    pub fn on_session_timeout(&mut self) {
        if !self.state.active {
            return;
        }
        log::info!("session time budget expired");
        self.finish();
    }

    pub fn take_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    fn accepts_selection(&self) -> bool {
        self.state.active && self.phase == Phase::Presenting && self.state.selected.is_none()
    }

    fn present_question(&mut self) {
        let question = self.questions.next_question();
        log::debug!(
            "question {}/{}: {}",
            self.state.current_question,
            self.config.questions_total,
            question.text()
        );
        self.state.question = Some(question.clone());
        self.state.selected = None;
        self.state.urgency_signalled = false;
        self.state.time_remaining = self.config.time_per_question();
        self.timers.cancel(TimerKind::Feedback);
        self.timers
            .arm(TimerKind::Countdown, self.config.time_per_question());
        self.phase = Phase::Presenting;
        self.signals.push(Signal::QuestionPresented {
            number: self.state.current_question,
            question,
        });
        self.check_urgency();
    }

    fn check_urgency(&mut self) {
        if !self.state.urgency_signalled
            && !self.state.time_remaining.is_zero()
            && self.state.time_remaining <= self.config.urgency_window()
        {
            self.state.urgency_signalled = true;
            self.signals.push(Signal::Urgency);
        }
    }

    fn accept(&mut self, selection: Selection) {
        log::debug!("selected {}", selection);
        self.state.selected = Some(selection);
        self.timers.cancel(TimerKind::Countdown);
        self.evaluate(selection);
    }

    fn evaluate(&mut self, selection: Selection) {
        let Some(question) = self.state.question.clone() else {
            return;
        };
        self.state.selected = Some(selection);
        self.state.evaluated += 1;

        let verdict = match selection {
            Selection::Chosen(v) if v == question.answer => Verdict::Correct,
            Selection::Chosen(_) => Verdict::Wrong,
            Selection::None => Verdict::TimedOut,
        };

        let message = match verdict {
            Verdict::Correct => {
                self.state.score += 1;
                self.signals.push(Signal::ScoreChanged(self.state.score));
                "Correct! Well done!".to_string()
            }
            Verdict::Wrong => format!("Wrong! {}", question),
            Verdict::TimedOut => format!("Time's up! {}", question),
        };

        if verdict != Verdict::Correct {
            self.state.mistakes.push(Mistake {
                question: question.text(),
                selected: selection,
                correct_answer: question.answer,
            });
        }

        let feedback = Feedback { verdict, message };
        self.signals.push(Signal::Feedback(feedback.clone()));
        self.phase = Phase::Evaluating(feedback);
        self.timers
            .arm(TimerKind::Feedback, self.config.feedback_pause());
    }

    fn finish(&mut self) {
        if self.phase == Phase::Finished {
            return;
        }
        self.state.active = false;
        self.timers.cancel_all();
        self.phase = Phase::Finished;

        let answered =
            scoring::questions_answered(self.state.evaluated, self.config.questions_total);
        let accuracy = scoring::accuracy(self.state.score, answered);
        let previous_best = scoring::load_best(self.store.as_ref());
        let new_best = scoring::record_best(self.store.as_mut(), self.state.score);

        log::info!(
            "sprint finished: score {} of {} answered, {}% accuracy{}",
            self.state.score,
            answered,
            accuracy,
            if new_best { ", new best" } else { "" }
        );

        let summary = SessionSummary {
            score: self.state.score,
            questions_answered: answered,
            questions_total: self.config.questions_total,
            accuracy,
            rating: scoring::rating_for(accuracy),
            previous_best,
            new_best,
            mistakes: self.state.mistakes.clone(),
        };
        self.signals.push(Signal::Finished(summary.clone()));
        self.summary = Some(summary);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn has_started(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn question(&self) -> Option<&Question> {
        self.state.question.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn mistakes(&self) -> &[Mistake] {
        &self.state.mistakes
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        match &self.phase {
            Phase::Evaluating(fb) => Some(fb),
            _ => None,
        }
    }

    pub fn time_remaining(&self) -> Duration {
        self.state.time_remaining
    }

    /// Share of the per-question budget still left, in percent
    pub fn time_percent(&self) -> f64 {
        let budget = self.config.time_per_question().as_secs_f64();
        if budget <= 0.0 {
            return 0.0;
        }
        (self.state.time_remaining.as_secs_f64() / budget * 100.0).clamp(0.0, 100.0)
    }

    pub fn timer_band(&self) -> TimerBand {
        TimerBand::from_percent(self.time_percent())
    }

    /// Session budget still left, zero once finished
    pub fn session_remaining(&self) -> Duration {
        self.timers
            .remaining(TimerKind::Session)
            .unwrap_or_default()
    }

    pub fn best_score(&self) -> u32 {
        scoring::load_best(self.store.as_ref())
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        self.store.as_mut()
    }
}
