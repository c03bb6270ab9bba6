use std::time::Duration;

use mathsprint::config::Config;
use mathsprint::question::{Question, ScriptedQuestions};
use mathsprint::scoring::{self, Tone};
use mathsprint::session::{Mistake, Phase, Selection};
use mathsprint::store::{FileStore, KeyValueStore, MemoryStore, BEST_SCORE_KEY};
use mathsprint::{Signal, Sprint};
use tempfile::tempdir;

fn short_game() -> Config {
    Config {
        questions_total: 3,
        time_per_question_ms: 2000,
        feedback_ms: 500,
        total_game_time_ms: 4000,
        ..Config::default()
    }
}

fn sum_of_two_and_three() -> Question {
    Question {
        left: 2,
        right: 3,
        answer: 5,
        choices: [5, 6, 3, 8],
    }
}

fn sum_of_zeros() -> Question {
    Question {
        left: 0,
        right: 0,
        answer: 0,
        choices: [0, 1, 2, 3],
    }
}

fn tick_until_finished(sprint: &mut Sprint, max_ticks: u32) {
    for _ in 0..max_ticks {
        if sprint.has_finished() {
            return;
        }
        sprint.on_tick();
    }
}

#[test]
fn session_budget_cuts_the_game_short() {
    let config = short_game();
    let questions = ScriptedQuestions::new(&config, vec![sum_of_two_and_three(), sum_of_zeros()]);
    let mut sprint = Sprint::new(config, Box::new(questions), Box::new(MemoryStore::new())).unwrap();

    sprint.start();
    sprint.on_select_option(5);
    assert_eq!(sprint.score(), 1);
    assert!(sprint.mistakes().is_empty());

    // 0 + 0 is left to time out, the third question is cut off by the budget
    tick_until_finished(&mut sprint, 100);

    assert_eq!(*sprint.phase(), Phase::Finished);
    let summary = sprint.summary().unwrap();
    assert_eq!(summary.score, 1);
    assert_eq!(summary.questions_answered, 2);
    assert_eq!(summary.accuracy, 50);
    assert_eq!(summary.rating.tone, Tone::Practice);
    assert_eq!(
        summary.mistakes,
        vec![Mistake {
            question: "0 + 0".to_string(),
            selected: Selection::None,
            correct_answer: 0,
        }]
    );
    assert_eq!(summary.mistakes[0].selected.to_string(), "No selection");
    assert_eq!(sprint.timers().live_count(), 0);
}

#[test]
fn signals_follow_the_round_lifecycle() {
    let config = short_game();
    let questions = ScriptedQuestions::new(&config, vec![sum_of_two_and_three(), sum_of_zeros()]);
    let mut sprint = Sprint::new(config, Box::new(questions), Box::new(MemoryStore::new())).unwrap();

    sprint.start();
    sprint.on_select_option(6);
    sprint.advance(Duration::from_millis(500));
    sprint.on_select_option(0);
    sprint.advance(Duration::from_millis(500));

    let kinds: Vec<&'static str> = sprint
        .take_signals()
        .iter()
        .map(|s| match s {
            Signal::QuestionPresented { .. } => "question",
            Signal::Urgency => "urgency",
            Signal::Feedback(_) => "feedback",
            Signal::ScoreChanged(_) => "score",
            Signal::Finished(_) => "finished",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["question", "feedback", "question", "score", "feedback", "question"]
    );
    assert_eq!(sprint.state().current_question, 3);
    assert!(sprint.take_signals().is_empty());
}

#[test]
fn question_limit_ends_the_game_before_the_budget() {
    let config = Config {
        questions_total: 2,
        total_game_time_ms: 60_000,
        ..short_game()
    };
    let questions = ScriptedQuestions::new(&config, vec![sum_of_two_and_three(), sum_of_zeros()]);
    let mut sprint = Sprint::new(config, Box::new(questions), Box::new(MemoryStore::new())).unwrap();

    sprint.start();
    sprint.on_select_option(5);
    sprint.advance(Duration::from_millis(500));
    sprint.on_select_option(0);
    sprint.advance(Duration::from_millis(500));

    let summary = sprint.summary().unwrap();
    assert_eq!(summary.score, 2);
    assert_eq!(summary.questions_answered, 2);
    assert_eq!(summary.accuracy, 100);
    assert!(summary.is_perfect());
    assert!(sprint.state().current_question <= 2);
}

#[test]
fn best_score_survives_reopening_the_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let config = Config {
        questions_total: 1,
        ..short_game()
    };

    let questions = ScriptedQuestions::new(&config, vec![sum_of_two_and_three()]);
    let mut sprint =
        Sprint::new(config.clone(), Box::new(questions), Box::new(FileStore::open(&path))).unwrap();
    sprint.start();
    sprint.on_select_option(5);
    sprint.advance(Duration::from_millis(500));
    assert!(sprint.summary().unwrap().new_best);

    let reopened = FileStore::open(&path);
    assert_eq!(reopened.get(BEST_SCORE_KEY).as_deref(), Some("1"));
    assert_eq!(scoring::load_best(&reopened), 1);

    // equalling the record is not a new best
    let questions = ScriptedQuestions::new(&config, vec![sum_of_two_and_three()]);
    let mut again = Sprint::new(config, Box::new(questions), Box::new(reopened)).unwrap();
    assert_eq!(again.best_score(), 1);
    again.start();
    again.on_select_option(5);
    again.advance(Duration::from_millis(500));
    let summary = again.summary().unwrap();
    assert_eq!(summary.previous_best, 1);
    assert!(!summary.new_best);
}

#[test]
fn play_again_starts_from_a_clean_slate() {
    let config = short_game();
    let questions = ScriptedQuestions::new(&config, vec![sum_of_two_and_three()]);
    let mut sprint = Sprint::new(config, Box::new(questions), Box::new(MemoryStore::new())).unwrap();

    sprint.start();
    tick_until_finished(&mut sprint, 100);
    assert!(sprint.has_finished());
    assert!(!sprint.mistakes().is_empty());

    sprint.reset();
    assert!(sprint.is_active());
    assert_eq!(sprint.score(), 0);
    assert_eq!(sprint.state().current_question, 1);
    assert!(sprint.mistakes().is_empty());
    assert!(sprint.summary().is_none());
    assert_eq!(sprint.timers().live_count(), 2);
}
