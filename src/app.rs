use std::time::Duration;

use crate::celebration::Celebration;
use crate::runtime::Command;
use crate::session::Feedback;
use crate::sprint::{Signal, Sprint};
use crate::store::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Playing,
    Results,
}

/// Everything the terminal front end needs between frames
pub struct App {
    pub sprint: Sprint,
    pub screen: Screen,
    pub theme: Theme,
    pub celebration: Celebration,
    /// Unanswered options are flagged for the rest of the round
    pub urgent: bool,
    pub feedback: Option<Feedback>,
    pub mistakes_scroll: usize,
    viewport: (u16, u16),
}

impl App {
    pub fn new(sprint: Sprint) -> Self {
        let theme = Theme::load(sprint.store());
        Self {
            sprint,
            screen: Screen::Welcome,
            theme,
            celebration: Celebration::new(),
            urgent: false,
            feedback: None,
            mistakes_scroll: 0,
            viewport: (80, 24),
        }
    }

    pub fn set_viewport(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
    }

    /// Applies a player command. Returns true when the app should exit.
    pub fn handle(&mut self, command: Command) -> bool {
        match (self.screen, command) {
            (_, Command::Quit) => return true,
            (_, Command::ToggleTheme) => self.toggle_theme(),
            (Screen::Welcome, Command::Confirm) | (Screen::Results, Command::Confirm) => {
                self.start()
            }
            (_, Command::Restart) => self.start(),
            (Screen::Playing, Command::Select(idx)) => self.sprint.on_select_index(idx),
            (Screen::Results, Command::ScrollDown) => {
                let max = self.sprint.mistakes().len().saturating_sub(1);
                self.mistakes_scroll = (self.mistakes_scroll + 1).min(max);
            }
            (Screen::Results, Command::ScrollUp) => {
                self.mistakes_scroll = self.mistakes_scroll.saturating_sub(1);
            }
            _ => {}
        }
        self.drain_signals();
        false
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.sprint.advance(elapsed);
        self.celebration.advance(elapsed);
        self.drain_signals();
    }

    fn start(&mut self) {
        self.celebration.stop();
        self.urgent = false;
        self.feedback = None;
        self.mistakes_scroll = 0;
        self.screen = Screen::Playing;
        self.sprint.reset();
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(e) = self.theme.save(self.sprint.store_mut()) {
            log::warn!("could not persist theme: {}", e);
        }
    }

    fn drain_signals(&mut self) {
        for signal in self.sprint.take_signals() {
            match signal {
                Signal::QuestionPresented { .. } => {
                    self.urgent = false;
                    self.feedback = None;
                }
                Signal::Urgency => self.urgent = true,
                Signal::Feedback(fb) => {
                    self.urgent = false;
                    self.feedback = Some(fb);
                }
                Signal::ScoreChanged(_) => {}
                Signal::Finished(summary) => {
                    self.screen = Screen::Results;
                    self.feedback = None;
                    if summary.new_best {
                        let (w, h) = self.viewport;
                        self.celebration.start(w, h);
                    }
                }
            }
        }
    }
}
