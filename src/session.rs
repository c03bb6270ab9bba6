use std::fmt;
use std::time::Duration;

use crate::question::{Question, NUM_CHOICES};

/// What the player picked for a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    None,
    Chosen(u32),
}

impl Selection {
    pub fn value(&self) -> Option<u32> {
        match self {
            Selection::None => None,
            Selection::Chosen(v) => Some(*v),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::None => write!(f, "No selection"),
            Selection::Chosen(v) => write!(f, "{v}"),
        }
    }
}

/// An incorrectly resolved round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mistake {
    pub question: String,
    pub selected: Selection,
    pub correct_answer: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Wrong,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub verdict: Verdict,
    pub message: String,
}

impl Feedback {
    pub fn is_correct(&self) -> bool {
        self.verdict == Verdict::Correct
    }
}

#[derive(Debug, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Presenting,
    Evaluating(Feedback),
    Finished,
}

/// Colour band of the countdown bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerBand {
    Calm,
    Warning,
    Critical,
}

impl TimerBand {
    pub fn from_percent(percent: f64) -> Self {
        if percent < 30.0 {
            TimerBand::Critical
        } else if percent < 60.0 {
            TimerBand::Warning
        } else {
            TimerBand::Calm
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerKind {
    Countdown,
    Feedback,
    Session,
}

/// The three session timers as remaining durations.
///
/// Arming a timer replaces whatever instance was live, so a new round can
/// never inherit a stale countdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    countdown: Option<Duration>,
    feedback: Option<Duration>,
    session: Option<Duration>,
}

impl Timers {
    pub fn arm(&mut self, kind: TimerKind, after: Duration) {
        *self.slot(kind) = Some(after);
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        *self.slot(kind) = None;
    }

    pub fn cancel_all(&mut self) {
        self.countdown = None;
        self.feedback = None;
        self.session = None;
    }

    pub fn remaining(&self, kind: TimerKind) -> Option<Duration> {
        match kind {
            TimerKind::Countdown => self.countdown,
            TimerKind::Feedback => self.feedback,
            TimerKind::Session => self.session,
        }
    }

    pub fn live_count(&self) -> usize {
        [self.countdown, self.feedback, self.session]
            .iter()
            .filter(|t| t.is_some())
            .count()
    }

    /// Time until the earliest live timer fires
    pub fn next_deadline(&self) -> Option<Duration> {
        [self.countdown, self.feedback, self.session]
            .into_iter()
            .flatten()
            .min()
    }

    /// Runs every live timer forward by `step` and returns, in firing order,
    /// the ones that reached zero. Fired timers are disarmed.
    pub fn consume(&mut self, step: Duration) -> Vec<TimerKind> {
        let mut fired = Vec::new();
        for kind in [TimerKind::Countdown, TimerKind::Feedback, TimerKind::Session] {
            let slot = self.slot(kind);
            if let Some(left) = *slot {
                if left <= step {
                    *slot = None;
                    fired.push(kind);
                } else {
                    *slot = Some(left - step);
                }
            }
        }
        fired
    }

    fn slot(&mut self, kind: TimerKind) -> &mut Option<Duration> {
        match kind {
            TimerKind::Countdown => &mut self.countdown,
            TimerKind::Feedback => &mut self.feedback,
            TimerKind::Session => &mut self.session,
        }
    }
}

/// Mutable state of the live session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    /// 1-based, never above the configured total
    pub current_question: u32,
    pub score: u32,
    /// Rounds resolved by a selection or a timeout
    pub evaluated: u32,
    pub time_remaining: Duration,
    pub active: bool,
    pub question: Option<Question>,
    pub selected: Option<Selection>,
    pub urgency_signalled: bool,
    pub mistakes: Vec<Mistake>,
}

impl RoundState {
    pub fn new(time_per_question: Duration) -> Self {
        Self {
            current_question: 1,
            score: 0,
            evaluated: 0,
            time_remaining: time_per_question,
            active: false,
            question: None,
            selected: None,
            urgency_signalled: false,
            mistakes: Vec::new(),
        }
    }

    pub fn choices(&self) -> Option<&[u32; NUM_CHOICES]> {
        self.question.as_ref().map(|q| &q.choices)
    }
}
