use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum SprintEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait SprintEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<SprintEvent, RecvTimeoutError>;
}

/// Production event source; a reader thread forwards crossterm events
pub struct CrosstermEventSource {
    rx: Receiver<SprintEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    tx.send(SprintEvent::Key(key))
                }
                Ok(CtEvent::Resize(w, h)) => tx.send(SprintEvent::Resize(w, h)),
                Ok(_) => Ok(()),
                Err(e) => {
                    log::warn!("terminal event reader stopped: {}", e);
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SprintEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SprintEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<SprintEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<SprintEvent>) -> Self {
        Self { rx }
    }
}

impl SprintEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SprintEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that serializes input and ticks into one ordered stream
pub struct Runner<E: SprintEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: SprintEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> SprintEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                SprintEvent::Tick
            }
        }
    }
}

/// Player intent decoded from a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Pick the choice at this position (0-based)
    Select(usize),
    /// Start from the welcome screen, or play again from the results
    Confirm,
    Restart,
    ToggleTheme,
    ScrollUp,
    ScrollDown,
    Quit,
}

pub fn command_for_key(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    match key.code {
        KeyCode::Char(c @ '1'..='4') => Some(Command::Select(c as usize - '1' as usize)),
        KeyCode::Char(c @ 'a'..='d') => Some(Command::Select(c as usize - 'a' as usize)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Confirm),
        KeyCode::Char('r') => Some(Command::Restart),
        KeyCode::Char('t') => Some(Command::ToggleTheme),
        KeyCode::Up | KeyCode::Char('k') => Some(Command::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Command::ScrollDown),
        KeyCode::Esc | KeyCode::Char('q') => Some(Command::Quit),
        _ => None,
    }
}
