use crate::session::Mistake;
use crate::store::{KeyValueStore, BEST_SCORE_KEY};

/// Performance tier shown on the results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating {
    pub min_accuracy: u32,
    pub message: &'static str,
    pub tone: Tone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Tone {
    Excellent,
    Great,
    Good,
    Practice,
}

/// Ordered by descending threshold; the last tier always matches.
pub const RATINGS: [Rating; 4] = [
    Rating {
        min_accuracy: 90,
        message: "Excellent! You're a math genius!",
        tone: Tone::Excellent,
    },
    Rating {
        min_accuracy: 75,
        message: "Great job! Keep it up!",
        tone: Tone::Great,
    },
    Rating {
        min_accuracy: 60,
        message: "Good work! Practice makes perfect!",
        tone: Tone::Good,
    },
    Rating {
        min_accuracy: 0,
        message: "Keep practicing! You'll get better!",
        tone: Tone::Practice,
    },
];

pub fn rating_for(accuracy: u32) -> Rating {
    RATINGS
        .iter()
        .find(|r| accuracy >= r.min_accuracy)
        .copied()
        .unwrap_or(RATINGS[RATINGS.len() - 1])
}

/// Rounds that count towards accuracy, never more than the configured total
pub fn questions_answered(evaluated: u32, total: u32) -> u32 {
    evaluated.min(total)
}

/// Whole-percent accuracy in `[0, 100]`; zero when nothing was answered.
pub fn accuracy(score: u32, answered: u32) -> u32 {
    if answered == 0 {
        return 0;
    }
    let pct = (f64::from(score) / f64::from(answered) * 100.0).round();
    pct.clamp(0.0, 100.0) as u32
}

/// Stored best, with absent or garbled values counting as zero
pub fn load_best(store: &dyn KeyValueStore) -> u32 {
    match store.get(BEST_SCORE_KEY) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparsable best score '{}'", raw);
            0
        }),
        None => 0,
    }
}

/// Persists `score` only when it beats the stored best. Returns whether it did.
pub fn record_best(store: &mut dyn KeyValueStore, score: u32) -> bool {
    if score <= load_best(store) {
        return false;
    }
    match store.set(BEST_SCORE_KEY, &score.to_string()) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("could not persist best score {}: {}", score, e);
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub score: u32,
    pub questions_answered: u32,
    pub questions_total: u32,
    pub accuracy: u32,
    pub rating: Rating,
    pub previous_best: u32,
    pub new_best: bool,
    pub mistakes: Vec<Mistake>,
}

impl SessionSummary {
    pub fn is_perfect(&self) -> bool {
        self.mistakes.is_empty() && self.questions_answered > 0
    }
}
