use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use mathsprint::app::{App, Screen};
use mathsprint::scoring::Tone;
use mathsprint::session::{Phase, Selection, TimerBand};
use mathsprint::store::Theme;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const OPTION_KEYS: [&str; 4] = ["1/a", "2/b", "3/c", "4/d"];
const SPARK_COLORS: [Color; 6] = [
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::Green,
    Color::LightRed,
    Color::LightBlue,
];

struct Palette {
    text: Color,
    dim: Color,
    accent: Color,
    correct: Color,
    wrong: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                text: Color::Black,
                dim: Color::DarkGray,
                accent: Color::Blue,
                correct: Color::Green,
                wrong: Color::Red,
            },
            Theme::Dark => Self {
                text: Color::White,
                dim: Color::Gray,
                accent: Color::Cyan,
                correct: Color::LightGreen,
                wrong: Color::LightRed,
            },
        }
    }

    fn band(&self, band: TimerBand) -> Color {
        match band {
            TimerBand::Calm => self.correct,
            TimerBand::Warning => Color::Yellow,
            TimerBand::Critical => self.wrong,
        }
    }

    fn tone(&self, tone: Tone) -> Color {
        match tone {
            Tone::Excellent => self.correct,
            Tone::Great => Color::Yellow,
            Tone::Good => self.accent,
            Tone::Practice => self.wrong,
        }
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let palette = Palette::for_theme(app.theme);
    let area = f.area();
    match app.screen {
        Screen::Welcome => render_welcome(f, area, app, &palette),
        Screen::Playing => render_playing(f, area, app, &palette),
        Screen::Results => render_results(f, area, app, &palette),
    }
    if app.celebration.is_active() {
        render_celebration(f, area, app);
    }
}

fn render_welcome(f: &mut Frame, area: Rect, app: &App, p: &Palette) {
    let config = app.sprint.config();
    let lines = vec![
        Line::from(Span::styled(
            "MATH SPRINT",
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} sums, {:.1}s each, {}s on the clock",
                config.questions_total,
                config.time_per_question_ms as f64 / 1000.0,
                config.total_game_time_ms / 1000
            ),
            Style::default().fg(p.text),
        )),
        Line::from(Span::styled(
            format!("Best score: {}", app.sprint.best_score()),
            Style::default().fg(p.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "(enter) start   (t)heme   (q)uit",
            Style::default().fg(p.dim).add_modifier(Modifier::ITALIC),
        )),
    ];
    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let centered = Rect::new(area.x, area.y + top, area.width, height.min(area.height));
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered,
    );
}

fn render_playing(f: &mut Frame, area: Rect, app: &App, p: &Palette) {
    let sprint = &app.sprint;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(1),    // padding
            Constraint::Length(3), // question
            Constraint::Length(3), // timer
            Constraint::Length(3), // options
            Constraint::Length(2), // feedback
            Constraint::Min(1),    // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let header = Line::from(vec![
        Span::styled(
            format!(
                "Question {} / {}",
                sprint.state().current_question,
                sprint.config().questions_total
            ),
            Style::default().fg(p.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "   Score {}   {:.0}s left",
                sprint.score(),
                sprint.session_remaining().as_secs_f64().ceil()
            ),
            Style::default().fg(p.dim),
        ),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    let Some(question) = sprint.question() else {
        log::debug!("playing screen drawn without a question");
        return;
    };

    let spaced = format!("{}  +  {}  =  ?", question.left, question.right);
    let text = if spaced.width() + 4 <= chunks[2].width as usize {
        spaced
    } else {
        format!("{}+{}=?", question.left, question.right)
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            text,
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::NONE)),
        chunks[2],
    );

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(p.band(sprint.timer_band())))
        .percent(sprint.time_percent().round() as u16)
        .label(format!("{:.1}s", sprint.time_remaining().as_secs_f64()));
    f.render_widget(gauge, chunks[3]);

    render_options(f, chunks[4], app, p);

    if let Some(feedback) = &app.feedback {
        let color = if feedback.is_correct() { p.correct } else { p.wrong };
        f.render_widget(
            Paragraph::new(Span::styled(
                feedback.message.as_str(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            chunks[5],
        );
    }

    f.render_widget(
        Paragraph::new("(1-4 / a-d) answer   (r)estart   (t)heme   (q)uit")
            .style(Style::default().fg(p.dim).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center),
        chunks[7],
    );
}

fn render_options(f: &mut Frame, area: Rect, app: &App, p: &Palette) {
    let sprint = &app.sprint;
    let Some(question) = sprint.question() else {
        return;
    };
    let evaluating = matches!(sprint.phase(), Phase::Evaluating(_));
    let selected = sprint.state().selected.and_then(|s| s.value());

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (idx, (&value, cell)) in question.choices.iter().zip(cells.iter()).enumerate() {
        let mut border = Style::default().fg(p.dim);
        let mut label = Style::default().fg(p.text).add_modifier(Modifier::BOLD);

        if evaluating {
            if value == question.answer {
                border = border.fg(p.correct);
                label = label.fg(p.correct);
            } else if Some(value) == selected {
                border = border.fg(p.wrong);
                label = label.fg(p.wrong);
            } else {
                label = label.add_modifier(Modifier::DIM);
            }
        } else if app.urgent {
            border = border.fg(p.wrong);
        }

        let widget = Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", OPTION_KEYS[idx]), Style::default().fg(p.dim)),
            Span::styled(value.to_string(), label),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border));
        f.render_widget(widget, *cell);
    }
}

fn render_results(f: &mut Frame, area: Rect, app: &App, p: &Palette) {
    let Some(summary) = app.sprint.summary() else {
        log::debug!("results screen drawn before the sprint finished");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(6), // stats
            Constraint::Min(3),    // mistakes
            Constraint::Length(1), // legend
        ])
        .split(area);

    let bold = Style::default().fg(p.text).add_modifier(Modifier::BOLD);
    let mut stats = vec![
        Line::from(vec![
            Span::styled("Final score ", Style::default().fg(p.dim)),
            Span::styled(
                format!("{} / {}", summary.score, summary.questions_answered),
                bold,
            ),
            Span::styled("   Accuracy ", Style::default().fg(p.dim)),
            Span::styled(format!("{}%", summary.accuracy), bold),
        ]),
        Line::from(vec![
            Span::styled("Previous best ", Style::default().fg(p.dim)),
            Span::styled(summary.previous_best.to_string(), bold),
            Span::styled("   This game ", Style::default().fg(p.dim)),
            Span::styled(summary.score.to_string(), bold),
        ]),
        Line::from(Span::styled(
            summary.rating.message,
            Style::default()
                .fg(p.tone(summary.rating.tone))
                .add_modifier(Modifier::BOLD),
        )),
    ];
    if summary.new_best {
        stats.push(Line::from(Span::styled(
            "New best score!",
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
        )));
    }
    f.render_widget(
        Paragraph::new(stats)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Results")),
        chunks[0],
    );

    let mistakes = if summary.mistakes.is_empty() {
        vec![Line::from(Span::styled(
            "Perfect! No mistakes made!",
            Style::default().fg(p.correct),
        ))]
    } else {
        summary
            .mistakes
            .iter()
            .enumerate()
            .skip(app.mistakes_scroll)
            .map(|(i, m)| {
                let answer_color = match m.selected {
                    Selection::None => p.dim,
                    Selection::Chosen(_) => p.wrong,
                };
                Line::from(vec![
                    Span::styled(format!("{:>2}. {:<8}", i + 1, m.question), bold),
                    Span::styled(
                        format!("  Your answer: {:<12}", m.selected.to_string()),
                        Style::default().fg(answer_color),
                    ),
                    Span::styled(
                        format!("Correct: {}", m.correct_answer),
                        Style::default().fg(p.correct),
                    ),
                ])
            })
            .collect_vec()
    };
    f.render_widget(
        Paragraph::new(mistakes)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Mistakes ({})", summary.mistakes.len())),
            ),
        chunks[1],
    );

    f.render_widget(
        Paragraph::new("(enter) play again   (j/k) scroll   (t)heme   (q)uit")
            .style(Style::default().fg(p.dim).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center),
        chunks[2],
    );
}

fn render_celebration(f: &mut Frame, area: Rect, app: &App) {
    let buf = f.buffer_mut();
    for particle in &app.celebration.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let (x, y) = (particle.x.round() as u16, particle.y.round() as u16);
        if x >= area.width || y >= area.height {
            continue;
        }
        let color = SPARK_COLORS[particle.color_index % SPARK_COLORS.len()];
        let mut style = Style::default().fg(color);
        if particle.is_letter() {
            style = style.add_modifier(Modifier::BOLD);
        }
        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_char(particle.symbol).set_style(style);
        }
    }
}
