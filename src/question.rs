use std::collections::VecDeque;
use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::Config;

pub const NUM_CHOICES: usize = 4;
const DECOY_OFFSETS: [i64; 3] = [1, 2, 3];
const DECOY_ATTEMPTS: usize = 10;

/// One addition question with its four presented choices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub left: u32,
    pub right: u32,
    pub answer: u32,
    pub choices: [u32; NUM_CHOICES],
}

impl Question {
    pub fn text(&self) -> String {
        format!("{} + {}", self.left, self.right)
    }

    pub fn has_choice(&self, value: u32) -> bool {
        self.choices.contains(&value)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.text(), self.answer)
    }
}

/// Builds the four choices for `correct`: the answer itself plus three decoys
/// at distance 1, 2 and 3 with a random sign, all within `[0, max_answer]`,
/// then shuffled.
pub fn generate_options<R: Rng + ?Sized>(correct: u32, max_answer: u32, rng: &mut R) -> [u32; NUM_CHOICES] {
    let correct_i = i64::from(correct);
    let ceiling = i64::from(max_answer.max(correct));
    let clamp = |v: i64| v.clamp(0, ceiling);

    let mut options: Vec<i64> = Vec::with_capacity(NUM_CHOICES);
    options.push(correct_i);

    for (i, &offset) in DECOY_OFFSETS.iter().enumerate() {
        let mut decoy;
        let mut attempts = 0;
        loop {
            decoy = if rng.gen_bool(0.5) {
                correct_i + offset
            } else {
                correct_i - offset
            };
            attempts += 1;
            if decoy < 0 {
                decoy = correct_i + offset;
            }
            if decoy > ceiling {
                decoy = correct_i - offset;
            }
            if !options.contains(&decoy) || attempts >= DECOY_ATTEMPTS {
                break;
            }
        }

        if options.contains(&decoy) {
            let sign = if i % 2 == 0 { 1 } else { -1 };
            decoy = clamp(correct_i + sign * (i as i64 + 1));
        }

        // The alternating fallback can still land on a taken value in tight
        // ranges; take the nearest free one instead.
        if options.contains(&decoy) || decoy < 0 || decoy > ceiling {
            if let Some(free) = nearest_free(correct_i, ceiling, &options) {
                log::debug!("decoy {} collided, using {}", decoy, free);
                decoy = free;
            }
        }

        options.push(decoy);
    }

    options.shuffle(rng);

    let mut out = [0u32; NUM_CHOICES];
    for (slot, v) in out.iter_mut().zip(options) {
        *slot = v.max(0) as u32;
    }
    out
}

fn nearest_free(center: i64, ceiling: i64, taken: &[i64]) -> Option<i64> {
    (1..=ceiling.max(NUM_CHOICES as i64))
        .flat_map(|d| [center + d, center - d])
        .find(|v| (0..=ceiling).contains(v) && !taken.contains(v))
}

/// Supplies the questions of a session, one per round
pub trait QuestionSource {
    fn next_question(&mut self) -> Question;
}

/// Uniformly random operands within the configured bounds
pub struct RandomQuestions {
    min: u32,
    max: u32,
    max_answer: u32,
    rng: StdRng,
}

impl RandomQuestions {
    pub fn new(config: &Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn seeded(config: &Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &Config, rng: StdRng) -> Self {
        Self {
            min: config.min_number,
            max: config.max_number.max(config.min_number),
            max_answer: config.max_answer(),
            rng,
        }
    }
}

impl QuestionSource for RandomQuestions {
    fn next_question(&mut self) -> Question {
        let left = self.rng.gen_range(self.min..=self.max);
        let right = self.rng.gen_range(self.min..=self.max);
        let answer = left + right;
        let choices = generate_options(answer, self.max_answer, &mut self.rng);
        log::debug!("generated {} + {} = {} with {:?}", left, right, answer, choices);
        Question {
            left,
            right,
            answer,
            choices,
        }
    }
}

/// Replays a fixed list of questions, then falls back to random ones.
pub struct ScriptedQuestions {
    queue: VecDeque<Question>,
    fallback: RandomQuestions,
}

impl ScriptedQuestions {
    pub fn new(config: &Config, questions: impl IntoIterator<Item = Question>) -> Self {
        Self {
            queue: questions.into_iter().collect(),
            fallback: RandomQuestions::seeded(config, 0),
        }
    }
}

impl QuestionSource for ScriptedQuestions {
    fn next_question(&mut self) -> Question {
        self.queue
            .pop_front()
            .unwrap_or_else(|| self.fallback.next_question())
    }
}
