mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use mathsprint::{
    app::App,
    auth,
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{command_for_key, CrosstermEventSource, FixedTicker, Runner, SprintEvent},
    store::{FileStore, Theme},
    Sprint, SprintError, TICK_RATE_MS,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

/// timed addition drills in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Answer as many single-digit sums as you can before the clock runs out. Every question has its own countdown, and your best score is kept between runs."
)]
pub struct Cli {
    /// number of questions in a game
    #[clap(short = 'q', long = "questions")]
    questions: Option<u32>,

    /// milliseconds allowed per question
    #[clap(short = 't', long = "time-per-question")]
    time_per_question: Option<u64>,

    /// seconds for the whole game
    #[clap(short = 'g', long = "game-time")]
    game_time: Option<u64>,

    /// milliseconds the feedback stays up before the next question
    #[clap(long)]
    feedback: Option<u64>,

    /// smallest operand
    #[clap(long)]
    min: Option<u32>,

    /// largest operand
    #[clap(long)]
    max: Option<u32>,

    /// colour theme, remembered for next time
    #[clap(long, value_enum)]
    theme: Option<Theme>,

    /// write the effective settings to the config file and exit
    #[clap(long)]
    save_config: bool,

    /// open the hosted sign-in page in a browser and exit
    #[clap(long)]
    login: bool,
}

impl Cli {
    /// Overlays any flags given on the command line onto `config`
    fn apply(&self, mut config: Config) -> Config {
        if let Some(q) = self.questions {
            config.questions_total = q;
        }
        if let Some(ms) = self.time_per_question {
            config.time_per_question_ms = ms;
        }
        if let Some(secs) = self.game_time {
            config.total_game_time_ms = secs.saturating_mul(1000);
        }
        if let Some(ms) = self.feedback {
            config.feedback_ms = ms;
        }
        if let Some(min) = self.min {
            config.min_number = min;
        }
        if let Some(max) = self.max {
            config.max_number = max;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if let Err(e) = config.validate() {
        Cli::command().error(ErrorKind::ValueValidation, e).exit();
    }

    if cli.save_config {
        config_store.save(&config)?;
        println!("saved settings to {}", config_store.path().display());
        return Ok(());
    }

    if cli.login {
        return login(&config);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut store = FileStore::open_default();
    if let Some(theme) = cli.theme {
        if let Err(e) = theme.save(&mut store) {
            log::warn!("could not persist theme: {}", e);
        }
    }
    let mut app = App::new(Sprint::with_random_questions(config, Box::new(store))?);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn login(config: &Config) -> Result<(), Box<dyn Error>> {
    let (Some(project), Some(site)) = (&config.auth_project_url, &config.auth_site_url) else {
        return Err(SprintError::Auth(format!(
            "set auth_project_url and auth_site_url in {}",
            FileConfigStore::new().path().display()
        ))
        .into());
    };
    auth::login(project, site, auth::DEFAULT_PROVIDER)?;
    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    let size = terminal.size()?;
    app.set_viewport(size.width, size.height);
    let mut last = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let event = runner.step();
        let now = Instant::now();
        app.advance(now.duration_since(last));
        last = now;

        match event {
            SprintEvent::Tick => {}
            SprintEvent::Resize(width, height) => app.set_viewport(width, height),
            SprintEvent::Key(key) => {
                if let Some(command) = command_for_key(key) {
                    if app.handle(command) {
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
